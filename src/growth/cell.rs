//! Developmental agents: neurons and their dendrites.
//!
//! Both are immutable value objects; only the growth simulation produces
//! new ones. Every neuron keeps at least one dendrite at all times.

use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::growth::point::Point2d;

/// A dendrite: one prospective connection of its neuron.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dendrite {
    /// In [-1, 1]; dropped when it falls below the phase's death threshold.
    pub health: f64,
    /// Connection weight in [-1, 1], carried into the extracted network.
    pub weight: f64,
    pub position: Point2d,
}

impl Dendrite {
    /// Seeding distribution: health and weight uniform in [-1, 1],
    /// position uniform in [0, 1)².
    pub fn random(rng: &mut impl Rng) -> Self {
        Self {
            health: rng.gen::<f64>() * 2.0 - 1.0,
            weight: rng.gen::<f64>() * 2.0 - 1.0,
            position: Point2d::new(rng.gen::<f64>(), rng.gen::<f64>()),
        }
    }

    /// Feature row fed to the dendrite program:
    /// [neuron health, neuron x, neuron y, neuron bias,
    ///  dendrite health, dendrite weight, dendrite x, dendrite y].
    pub fn program_inputs(&self, neuron: &Neuron) -> DMatrix<f64> {
        DMatrix::from_row_slice(
            1,
            8,
            &[
                neuron.health,
                neuron.position.x,
                neuron.position.y,
                neuron.bias,
                self.health,
                self.weight,
                self.position.x,
                self.position.y,
            ],
        )
    }
}

/// A neuron agent. `tag` is 0 for hidden neurons and `problem + 1` for
/// the output neurons of sub-problem `problem`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub health: f64,
    pub position: Point2d,
    pub bias: f64,
    pub dendrites: Vec<Dendrite>,
    pub tag: usize,
}

impl Neuron {
    /// Seeding distribution: health, bias, and position components
    /// uniform in [-1, 1], with `num_dendrites` random dendrites.
    pub fn random(rng: &mut impl Rng, num_dendrites: usize, tag: usize) -> Self {
        let dendrites = (0..num_dendrites).map(|_| Dendrite::random(rng)).collect();
        Self {
            health: rng.gen::<f64>() * 2.0 - 1.0,
            position: Point2d::new(rng.gen::<f64>() * 2.0 - 1.0, rng.gen::<f64>() * 2.0 - 1.0),
            bias: rng.gen::<f64>() * 2.0 - 1.0,
            dendrites,
            tag,
        }
    }

    /// Feature row fed to the soma program:
    /// [health, x, y, bias, mean dendrite x, mean dendrite y,
    ///  mean dendrite weight, mean dendrite health].
    pub fn program_inputs(&self) -> DMatrix<f64> {
        let n = self.dendrites.len() as f64;
        let (sx, sy, sw, sh) = self.dendrites.iter().fold((0.0, 0.0, 0.0, 0.0), |acc, d| {
            (
                acc.0 + d.position.x,
                acc.1 + d.position.y,
                acc.2 + d.weight,
                acc.3 + d.health,
            )
        });
        DMatrix::from_row_slice(
            1,
            8,
            &[
                self.health,
                self.position.x,
                self.position.y,
                self.bias,
                sx / n,
                sy / n,
                sw / n,
                sh / n,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_soma_features() {
        let neuron = Neuron {
            health: 0.5,
            position: Point2d::new(0.1, -0.2),
            bias: 0.3,
            dendrites: vec![
                Dendrite { health: 1.0, weight: 0.4, position: Point2d::new(0.2, 0.6) },
                Dendrite { health: 0.0, weight: -0.4, position: Point2d::new(0.4, 0.2) },
            ],
            tag: 0,
        };
        let features = neuron.program_inputs();
        assert_eq!(features.ncols(), 8);
        let row: Vec<f64> = features.row(0).iter().copied().collect();
        assert_eq!(row[0], 0.5);
        assert_eq!(row[3], 0.3);
        assert!((row[4] - 0.3).abs() < 1e-12); // mean dendrite x
        assert!((row[5] - 0.4).abs() < 1e-12); // mean dendrite y
        assert!((row[6] - 0.0).abs() < 1e-12); // mean weight
        assert!((row[7] - 0.5).abs() < 1e-12); // mean health
    }

    #[test]
    fn test_random_ranges() {
        let mut rng = StdRng::seed_from_u64(11);
        for _ in 0..50 {
            let n = Neuron::random(&mut rng, 4, 0);
            assert!(n.health >= -1.0 && n.health < 1.0);
            assert!(n.bias >= -1.0 && n.bias < 1.0);
            assert_eq!(n.dendrites.len(), 4);
            for d in &n.dendrites {
                assert!(d.health >= -1.0 && d.health < 1.0);
                assert!(d.position.x >= 0.0 && d.position.x < 1.0);
            }
        }
    }
}
