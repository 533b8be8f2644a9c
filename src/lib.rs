//! Morphogen — developmental genetic programming
//!
//! Evolves pairs of graph-encoded programs that act as local growth
//! rules for a population of neurons and dendrites; the developed
//! population is crystallized into a feed-forward network and scored
//! on supervised tasks.

pub mod error;
pub mod gene;
pub mod growth;
pub mod phenotype;
pub mod problem;

pub use error::{MorphogenError, Result};
pub use gene::{GeneBuilder, GeneBuilderConfig, GeneMutator, Genome};
pub use growth::{GrowthConfig, GrowthSimulation, SimulationBuilder, SimulationMutator};
pub use phenotype::Ann;
pub use problem::Problem;
