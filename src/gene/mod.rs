//! Genome language — DAG programs over a fixed operation catalog,
//! with a recursive interpreter, random construction, and mutation.

mod builder;
mod genome;
mod mutator;
pub mod ops;

pub use builder::{GeneBuilder, GeneBuilderConfig};
pub use genome::{Genome, MiddleNode};
pub use mutator::{GeneMutator, NeutralSkippingMutator, PointMutator};
pub use ops::{CatalogKey, NamedOp};
