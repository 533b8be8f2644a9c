//! Cellular growth — neuron/dendrite agents developed over discrete
//! steps by two genome programs acting as local update rules.

mod cell;
mod config;
mod point;
mod seed;
mod simulation;

pub use cell::{Dendrite, Neuron};
pub use config::{GrowthConfig, GrowthPhase, PhaseParams, WiringFallback};
pub use point::Point2d;
pub use seed::{SimulationBuilder, SimulationMutator, DEFAULT_MUTATION_RATE};
pub use simulation::GrowthSimulation;
