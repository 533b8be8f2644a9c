//! Building and mutating whole simulations.
//!
//! A simulation is seeded from two randomly built genome programs plus a
//! random initial population; the mutator point-mutates both programs
//! and reseeds the population, yielding an independent developmental
//! trial for the same lineage.

use log::info;
use rand::Rng;

use crate::error::Result;
use crate::gene::{CatalogKey, GeneBuilder, GeneBuilderConfig, GeneMutator, PointMutator};
use crate::growth::cell::Neuron;
use crate::growth::config::GrowthConfig;
use crate::growth::point::Point2d;
use crate::growth::simulation::GrowthSimulation;

/// Feature count of the soma program (per-neuron update rule).
pub const SOMA_FEATURES: usize = 8;
/// Feature count of the dendrite program (per-dendrite update rule).
pub const DENDRITE_FEATURES: usize = 8;
/// Both programs propose (health, x, y, bias) / (health, weight, x, y).
const PROGRAM_OUTPUTS: usize = 4;
const DEFAULT_MIDDLE_NODES: usize = 200;

/// Reference per-locus rate for whole-simulation mutation.
pub const DEFAULT_MUTATION_RATE: f64 = 0.08;

/// Builds a ready-to-develop simulation from a growth config.
#[derive(Debug, Clone)]
pub struct SimulationBuilder {
    config: GrowthConfig,
    middle_nodes: usize,
}

impl SimulationBuilder {
    pub fn new(config: GrowthConfig) -> Self {
        Self { config, middle_nodes: DEFAULT_MIDDLE_NODES }
    }

    /// Override the middle-node count of both programs (tests use small
    /// genomes; the reference programs carry 200 middle nodes).
    pub fn with_middle_nodes(mut self, middle_nodes: usize) -> Self {
        self.middle_nodes = middle_nodes;
        self
    }

    pub fn build(&self, rng: &mut impl Rng) -> GrowthSimulation {
        let soma_program = self.program_builder(SOMA_FEATURES).make_gene(rng);
        let dendrite_program = self.program_builder(DENDRITE_FEATURES).make_gene(rng);
        let neurons = seed_population(&self.config, rng);
        let input_locations = seed_input_locations(&self.config, rng);
        info!(
            "seeded simulation: {} neurons ({} output), {} input slots",
            neurons.len(),
            self.config.num_output_neurons(),
            input_locations.len()
        );
        GrowthSimulation::new(
            soma_program,
            dendrite_program,
            neurons,
            input_locations,
            self.config.clone(),
        )
    }

    fn program_builder(&self, num_inputs: usize) -> GeneBuilder {
        GeneBuilder::new(GeneBuilderConfig {
            num_inputs,
            num_middle_nodes: self.middle_nodes,
            num_outputs: PROGRAM_OUTPUTS,
            catalog: CatalogKey::Developmental,
        })
    }
}

/// Initial population: random hidden neurons, then the per-problem
/// output neurons tagged `problem + 1`.
fn seed_population(config: &GrowthConfig, rng: &mut impl Rng) -> Vec<Neuron> {
    let mut neurons = Vec::new();
    for _ in 0..config.initial_non_output_neurons {
        neurons.push(Neuron::random(rng, config.initial_num_dendrites, 0));
    }
    for (problem, &count) in config.problem_outputs.iter().enumerate() {
        for _ in 0..count {
            neurons.push(Neuron::random(rng, config.initial_num_dendrites, problem + 1));
        }
    }
    neurons
}

/// Input slots sit in the left half-plane (x in (-1, 0]) so hidden
/// neurons can wire back to them; y is uniform in [-1, 1].
fn seed_input_locations(config: &GrowthConfig, rng: &mut impl Rng) -> Vec<Point2d> {
    let mut locations = Vec::with_capacity(config.num_global_inputs());
    for &count in &config.problem_inputs {
        for _ in 0..count {
            locations.push(Point2d::new(-rng.gen::<f64>(), rng.gen::<f64>() * 2.0 - 1.0));
        }
    }
    locations
}

/// Mutates a whole simulation: point mutation on both programs and a
/// fresh random population, keeping the config.
#[derive(Debug, Clone)]
pub struct SimulationMutator {
    program_mutator: PointMutator,
}

impl SimulationMutator {
    pub fn new(rate: f64) -> Self {
        Self { program_mutator: PointMutator::new(rate) }
    }

    pub fn mutate(&self, sim: &GrowthSimulation, rng: &mut impl Rng) -> Result<GrowthSimulation> {
        let soma_program = self.program_mutator.mutate_gene(&sim.soma_program, rng)?;
        let dendrite_program = self.program_mutator.mutate_gene(&sim.dendrite_program, rng)?;
        let neurons = seed_population(&sim.config, rng);
        let input_locations = seed_input_locations(&sim.config, rng);
        info!("mutated simulation: reseeded {} neurons", neurons.len());
        Ok(GrowthSimulation::new(
            soma_program,
            dendrite_program,
            neurons,
            input_locations,
            sim.config.clone(),
        ))
    }
}

impl Default for SimulationMutator {
    fn default() -> Self {
        Self::new(DEFAULT_MUTATION_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn config() -> GrowthConfig {
        GrowthConfig {
            initial_non_output_neurons: 5,
            initial_num_dendrites: 3,
            problem_inputs: vec![4, 2],
            problem_outputs: vec![3, 1],
            ..GrowthConfig::default()
        }
    }

    #[test]
    fn test_build_population_layout() {
        let mut rng = StdRng::seed_from_u64(8);
        let sim = SimulationBuilder::new(config()).with_middle_nodes(10).build(&mut rng);
        assert_eq!(sim.neurons.len(), 5 + 3 + 1);
        assert_eq!(sim.neurons.iter().filter(|n| n.tag == 0).count(), 5);
        assert_eq!(sim.neurons.iter().filter(|n| n.tag == 1).count(), 3);
        assert_eq!(sim.neurons.iter().filter(|n| n.tag == 2).count(), 1);
        assert_eq!(sim.input_locations.len(), 6);
        assert_eq!(sim.soma_program.num_inputs, SOMA_FEATURES);
        assert_eq!(sim.dendrite_program.num_inputs, DENDRITE_FEATURES);
        assert_eq!(sim.soma_program.output_addrs.len(), 4);
    }

    #[test]
    fn test_input_locations_left_half_plane() {
        let mut rng = StdRng::seed_from_u64(9);
        let sim = SimulationBuilder::new(config()).with_middle_nodes(10).build(&mut rng);
        for p in &sim.input_locations {
            assert!(p.x <= 0.0);
            assert!(p.y >= -1.0 && p.y < 1.0);
        }
    }

    #[test]
    fn test_mutate_reseeds_and_changes_programs() {
        let mut rng = StdRng::seed_from_u64(10);
        let sim = SimulationBuilder::new(config()).with_middle_nodes(40).build(&mut rng);
        let mutated = SimulationMutator::default().mutate(&sim, &mut rng).unwrap();
        assert_eq!(mutated.neurons.len(), sim.neurons.len());
        // At rate 0.08 over a 40-node program, this seed flips loci in
        // both programs.
        assert_ne!(mutated.soma_program, sim.soma_program);
        assert_ne!(mutated.dendrite_program, sim.dendrite_program);
        assert_eq!(mutated.config.max_num_neurons, sim.config.max_num_neurons);
    }
}
