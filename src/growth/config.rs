//! Growth simulation configuration.
//!
//! Defaults carry the reference constants: populations capped at 30
//! neurons / 60 dendrites, death threshold -0.6, birth threshold 0.2,
//! and 0.1 increments for every updated field.

use serde::{Deserialize, Serialize};

/// Which of the two threshold/increment tables a growth step uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthPhase {
    /// Developmental steps run before an epoch's task exposure.
    Pre,
    /// Developmental steps run during an epoch.
    During,
}

/// Thresholds and per-field increments for one phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhaseParams {
    pub neuron_death_threshold: f64,
    pub neuron_birth_threshold: f64,
    pub dendrite_death_threshold: f64,
    pub dendrite_birth_threshold: f64,
    pub soma_health_increment: f64,
    pub soma_position_increment: f64,
    pub soma_bias_increment: f64,
    pub dendrite_health_increment: f64,
    pub dendrite_weight_increment: f64,
    pub dendrite_position_increment: f64,
}

impl Default for PhaseParams {
    fn default() -> Self {
        Self {
            neuron_death_threshold: -0.6,
            neuron_birth_threshold: 0.2,
            dendrite_death_threshold: -0.6,
            dendrite_birth_threshold: 0.2,
            soma_health_increment: 0.1,
            soma_position_increment: 0.1,
            soma_bias_increment: 0.1,
            dendrite_health_increment: 0.1,
            dendrite_weight_increment: 0.1,
            dendrite_position_increment: 0.1,
        }
    }
}

/// Policy for a dendrite whose nearest-neighbor search finds no
/// candidate with a strictly lesser x-coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WiringFallback {
    /// Wire to address 0, the first global input slot (reference
    /// behavior). For sub-problems other than the first this becomes a
    /// zero source, since the slot belongs to a foreign input block.
    FirstInput,
    /// Leave the dendrite unwired: it contributes nothing.
    ZeroSource,
}

/// Full configuration for building and stepping a growth simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthConfig {
    /// Total population cap, output neurons included.
    pub max_num_neurons: usize,
    /// Per-neuron dendrite cap.
    pub max_num_dendrites: usize,
    pub initial_non_output_neurons: usize,
    pub initial_num_dendrites: usize,
    pub pre: PhaseParams,
    pub during: PhaseParams,
    pub num_steps_pre_epoch: usize,
    pub num_steps_during_epoch: usize,
    pub num_epochs: usize,
    /// Declared input count of each sub-problem, in address-block order.
    pub problem_inputs: Vec<usize>,
    /// Declared output-neuron count of each sub-problem.
    pub problem_outputs: Vec<usize>,
    pub wiring_fallback: WiringFallback,
}

impl Default for GrowthConfig {
    fn default() -> Self {
        Self {
            max_num_neurons: 30,
            max_num_dendrites: 60,
            initial_non_output_neurons: 6,
            initial_num_dendrites: 5,
            pre: PhaseParams::default(),
            during: PhaseParams::default(),
            num_steps_pre_epoch: 8,
            num_steps_during_epoch: 2,
            num_epochs: 10,
            problem_inputs: vec![4],
            problem_outputs: vec![3],
            wiring_fallback: WiringFallback::FirstInput,
        }
    }
}

impl GrowthConfig {
    pub fn params(&self, phase: GrowthPhase) -> &PhaseParams {
        match phase {
            GrowthPhase::Pre => &self.pre,
            GrowthPhase::During => &self.during,
        }
    }

    /// Total number of global input slots across all sub-problems.
    pub fn num_global_inputs(&self) -> usize {
        self.problem_inputs.iter().sum()
    }

    /// Total number of output neurons across all sub-problems.
    pub fn num_output_neurons(&self) -> usize {
        self.problem_outputs.iter().sum()
    }
}
