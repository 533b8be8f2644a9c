//! The cellular growth simulation.
//!
//! Two genomes act as local update rules: the soma program proposes
//! per-neuron field changes, the dendrite program proposes per-dendrite
//! changes. Proposals are applied as fixed-size signed increments and
//! clamped to [-1, 1]; birth and death are threshold crossings on the
//! resulting health values.

use log::debug;
use nalgebra::DMatrix;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{MorphogenError, Result};
use crate::gene::Genome;
use crate::growth::cell::{Dendrite, Neuron};
use crate::growth::config::{GrowthConfig, GrowthPhase, PhaseParams};
use crate::growth::point::Point2d;

/// Strict sign: 1 for positive, -1 for negative, 0 at zero. Not
/// `f64::signum`, which maps ±0.0 to ±1.0.
fn sign(v: f64) -> f64 {
    if v > 0.0 {
        1.0
    } else if v < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// One field update: move by a signed increment, clamped to [-1, 1].
fn step_field(old: f64, proposed: f64, increment: f64) -> f64 {
    (old + sign(proposed) * increment).clamp(-1.0, 1.0)
}

/// Both update programs propose exactly this many fields.
const PROGRAM_FIELDS: usize = 4;

/// Evaluate an update program and check it proposes all four fields.
/// The constructor accepts any genome, so a too-narrow program must
/// surface as an error rather than an out-of-bounds index.
fn propose(program: &Genome, features: &DMatrix<f64>) -> Result<DMatrix<f64>> {
    let proposed = program.evaluate(features)?;
    if proposed.ncols() < PROGRAM_FIELDS {
        return Err(MorphogenError::ShapeMismatch {
            expected: PROGRAM_FIELDS,
            found: proposed.ncols(),
        });
    }
    Ok(proposed)
}

/// A developing neuron population driven by two genome programs.
/// `update` produces a new simulation value; the old one is untouched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthSimulation {
    pub soma_program: Genome,
    pub dendrite_program: Genome,
    pub neurons: Vec<Neuron>,
    /// One 2D location per global input slot, used only for wiring.
    pub input_locations: Vec<Point2d>,
    pub config: GrowthConfig,
}

impl GrowthSimulation {
    pub fn new(
        soma_program: Genome,
        dendrite_program: Genome,
        neurons: Vec<Neuron>,
        input_locations: Vec<Point2d>,
        config: GrowthConfig,
    ) -> Self {
        Self { soma_program, dendrite_program, neurons, input_locations, config }
    }

    /// Run one developmental step under the given phase's thresholds and
    /// increments.
    ///
    /// Hidden neurons are processed in population order: each survives
    /// iff its updated health exceeds the death threshold, and
    /// independently replicates iff it exceeds the birth threshold.
    /// Acceptance stops once `max_num_neurons - outputs` hidden neurons
    /// have been taken; the remainder are dropped this step. Output
    /// neurons develop the same way but are always retained.
    pub fn update(&self, phase: GrowthPhase, rng: &mut impl Rng) -> Result<GrowthSimulation> {
        let params = self.config.params(phase);
        let (hidden, outputs): (Vec<&Neuron>, Vec<&Neuron>) =
            self.neurons.iter().partition(|n| n.tag == 0);
        let hidden_cap = self.config.max_num_neurons.saturating_sub(outputs.len());

        let mut next = Vec::with_capacity(self.neurons.len());
        for neuron in hidden {
            if next.len() >= hidden_cap {
                break;
            }
            let updated = self.develop(neuron, params)?;
            let survives = updated.health > params.neuron_death_threshold;
            let replicates = updated.health > params.neuron_birth_threshold;
            if survives {
                next.push(updated.clone());
                if next.len() >= hidden_cap {
                    break;
                }
            }
            if replicates {
                next.push(self.spawn_child(&updated, rng));
            }
        }
        let hidden_count = next.len();
        for neuron in outputs {
            next.push(self.develop(neuron, params)?);
        }
        debug!(
            "growth step ({:?}): {} hidden + {} output neurons",
            phase,
            hidden_count,
            next.len() - hidden_count
        );

        Ok(GrowthSimulation {
            soma_program: self.soma_program.clone(),
            dendrite_program: self.dendrite_program.clone(),
            neurons: next,
            input_locations: self.input_locations.clone(),
            config: self.config.clone(),
        })
    }

    /// Run the configured epoch schedule: for each epoch, the pre-phase
    /// steps followed by the during-phase steps.
    pub fn grow(&self, rng: &mut impl Rng) -> Result<GrowthSimulation> {
        let mut sim = self.clone();
        for epoch in 0..self.config.num_epochs {
            for _ in 0..self.config.num_steps_pre_epoch {
                sim = sim.update(GrowthPhase::Pre, rng)?;
            }
            for _ in 0..self.config.num_steps_during_epoch {
                sim = sim.update(GrowthPhase::During, rng)?;
            }
            debug!("epoch {}: {} neurons", epoch, sim.neurons.len());
        }
        Ok(sim)
    }

    /// Soma pass followed by the dendrite pass for one neuron.
    fn develop(&self, neuron: &Neuron, params: &PhaseParams) -> Result<Neuron> {
        let proposed = propose(&self.soma_program, &neuron.program_inputs())?;
        let health = step_field(neuron.health, proposed[(0, 0)], params.soma_health_increment);
        let x = step_field(neuron.position.x, proposed[(0, 1)], params.soma_position_increment);
        let y = step_field(neuron.position.y, proposed[(0, 2)], params.soma_position_increment);
        let bias = step_field(neuron.bias, proposed[(0, 3)], params.soma_bias_increment);
        let dendrites = self.develop_dendrites(neuron, params)?;
        Ok(Neuron { health, position: Point2d::new(x, y), bias, dendrites, tag: neuron.tag })
    }

    /// Update every dendrite of `neuron` (plus a freshly sprouted one if
    /// the pre-update neuron health crosses the birth threshold), drop
    /// the ones whose updated health falls to the death threshold, and
    /// stop once the dendrite cap is reached. A neuron that would lose
    /// all dendrites retains its original first one.
    fn develop_dendrites(&self, neuron: &Neuron, params: &PhaseParams) -> Result<Vec<Dendrite>> {
        let mut candidates = neuron.dendrites.clone();
        if neuron.health > params.dendrite_birth_threshold {
            candidates.push(Dendrite {
                health: 1.0,
                weight: 1.0,
                position: Point2d::new(neuron.position.x * 0.8, neuron.position.y * 0.8),
            });
        }
        let mut kept = Vec::with_capacity(candidates.len());
        for dendrite in &candidates {
            let proposed = propose(&self.dendrite_program, &dendrite.program_inputs(neuron))?;
            let updated = Dendrite {
                health: step_field(
                    dendrite.health,
                    proposed[(0, 0)],
                    params.dendrite_health_increment,
                ),
                weight: step_field(
                    dendrite.weight,
                    proposed[(0, 1)],
                    params.dendrite_weight_increment,
                ),
                position: Point2d::new(
                    step_field(
                        dendrite.position.x,
                        proposed[(0, 2)],
                        params.dendrite_position_increment,
                    ),
                    step_field(
                        dendrite.position.y,
                        proposed[(0, 3)],
                        params.dendrite_position_increment,
                    ),
                ),
            };
            if updated.health > params.dendrite_death_threshold {
                kept.push(updated);
                if kept.len() >= self.config.max_num_dendrites {
                    break;
                }
            }
        }
        if kept.is_empty() {
            // Every neuron keeps at least one dendrite.
            kept.push(neuron.dendrites[0]);
        }
        Ok(kept)
    }

    /// A child neuron: full health, zero bias, the parent's position,
    /// freshly random dendrites, inherited tag.
    fn spawn_child(&self, parent: &Neuron, rng: &mut impl Rng) -> Neuron {
        let dendrites = (0..self.config.initial_num_dendrites)
            .map(|_| Dendrite::random(rng))
            .collect();
        Neuron { health: 1.0, position: parent.position, bias: 0.0, dendrites, tag: parent.tag }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::growth::seed::SimulationBuilder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn small_sim(seed: u64) -> GrowthSimulation {
        let config = GrowthConfig {
            max_num_neurons: 12,
            max_num_dendrites: 8,
            initial_non_output_neurons: 4,
            initial_num_dendrites: 3,
            problem_inputs: vec![2],
            problem_outputs: vec![2],
            ..GrowthConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(seed);
        SimulationBuilder::new(config).with_middle_nodes(20).build(&mut rng)
    }

    #[test]
    fn test_sign() {
        assert_eq!(sign(10.0), 1.0);
        assert_eq!(sign(-10.0), -1.0);
        assert_eq!(sign(0.0), 0.0);
        assert_eq!(sign(-0.0), 0.0);
    }

    #[test]
    fn test_step_field_clamps() {
        assert!((step_field(0.5, 2.0, 0.1) - 0.6).abs() < 1e-12);
        assert!((step_field(0.5, -2.0, 0.1) - 0.4).abs() < 1e-12);
        assert_eq!(step_field(1.0, 3.0, 0.1), 1.0);
        assert_eq!(step_field(-1.0, -3.0, 0.1), -1.0);
        assert_eq!(step_field(0.5, 0.0, 0.1), 0.5);
    }

    #[test]
    fn test_update_respects_population_invariants() {
        let mut sim = small_sim(17);
        let mut rng = StdRng::seed_from_u64(99);
        let output_count = sim.config.num_output_neurons();
        for _ in 0..25 {
            sim = sim.update(GrowthPhase::Pre, &mut rng).unwrap();
            let hidden = sim.neurons.iter().filter(|n| n.tag == 0).count();
            let outputs = sim.neurons.iter().filter(|n| n.tag != 0).count();
            assert!(hidden <= sim.config.max_num_neurons - output_count);
            assert_eq!(outputs, output_count, "output neurons are always retained");
            for neuron in &sim.neurons {
                assert!(!neuron.dendrites.is_empty());
                assert!(neuron.dendrites.len() <= sim.config.max_num_dendrites);
                assert!(neuron.health >= -1.0 && neuron.health <= 1.0);
                assert!(neuron.bias >= -1.0 && neuron.bias <= 1.0);
            }
        }
    }

    #[test]
    fn test_narrow_program_is_rejected() {
        // A soma program proposing fewer than four fields cannot drive
        // an update; it must error instead of indexing past its output.
        let mut sim = small_sim(13);
        sim.soma_program.output_addrs.truncate(2);
        let mut rng = StdRng::seed_from_u64(13);
        let err = sim.update(GrowthPhase::Pre, &mut rng).unwrap_err();
        assert_eq!(err, MorphogenError::ShapeMismatch { expected: 4, found: 2 });
    }

    #[test]
    fn test_update_is_pure() {
        let sim = small_sim(5);
        let snapshot = sim.neurons.clone();
        let mut rng = StdRng::seed_from_u64(5);
        let _ = sim.update(GrowthPhase::During, &mut rng).unwrap();
        assert_eq!(sim.neurons, snapshot);
    }

    #[test]
    fn test_deterministic_replay() {
        let sim = small_sim(23);
        let mut rng_a = StdRng::seed_from_u64(7);
        let mut rng_b = StdRng::seed_from_u64(7);
        let a = sim.grow(&mut rng_a).unwrap();
        let b = sim.grow(&mut rng_b).unwrap();
        assert_eq!(a.neurons, b.neurons);
    }

    #[test]
    fn test_grow_runs_schedule() {
        let mut sim = small_sim(31);
        sim.config.num_epochs = 2;
        sim.config.num_steps_pre_epoch = 3;
        sim.config.num_steps_during_epoch = 1;
        let mut rng = StdRng::seed_from_u64(1);
        let grown = sim.grow(&mut rng).unwrap();
        assert_eq!(
            grown.neurons.iter().filter(|n| n.tag != 0).count(),
            sim.config.num_output_neurons()
        );
    }
}
