//! Task interface for evaluating extracted networks.
//!
//! A problem supplies labelled batches and a fitness measure; the
//! default measure is mean cross-entropy over the network's raw outputs
//! treated as logits.

use nalgebra::DMatrix;

/// A supervised classification task an extracted network is scored on.
///
/// `training_set` and `validation_set` return a batch matrix (one row
/// per example) paired with the expected class index per row.
pub trait Problem {
    fn num_inputs(&self) -> usize;
    fn num_outputs(&self) -> usize;
    fn training_set(&self) -> (DMatrix<f64>, Vec<usize>);
    fn validation_set(&self) -> (DMatrix<f64>, Vec<usize>);

    /// Score raw network outputs against expected classes. Lower is
    /// better; the default is mean cross-entropy.
    fn measure_fitness(&self, expected: &[usize], outputs: &DMatrix<f64>) -> f64 {
        mean_cross_entropy(expected, outputs)
    }
}

/// Mean cross-entropy of softmaxed logits against expected class
/// indexes. Rows are shifted by their maximum before exponentiation so
/// large logits cannot overflow.
pub fn mean_cross_entropy(expected: &[usize], logits: &DMatrix<f64>) -> f64 {
    let mut total = 0.0;
    for (row, &class) in logits.row_iter().zip(expected) {
        let max = row.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
        let log_sum: f64 = row.iter().map(|v| (v - max).exp()).sum::<f64>().ln();
        total += log_sum - (row[class] - max);
    }
    total / expected.len() as f64
}
