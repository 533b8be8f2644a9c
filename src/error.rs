//! Error types for the developmental CGP core.
//!
//! NaN results are not an error: the interpreter zeroes them locally
//! before they escape. Everything else propagates to the caller.

/// Result type for morphogen operations.
pub type Result<T> = std::result::Result<T, MorphogenError>;

/// Errors that can occur while interpreting genomes or wiring phenotypes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MorphogenError {
    /// The input batch does not match the genome's declared input count.
    #[error("expected input of shape (N, {expected}), received (N, {found})")]
    ShapeMismatch { expected: usize, found: usize },

    /// An opcode indexes past the end of the operation catalog. This is
    /// genome corruption and is never clamped or recovered.
    #[error("unknown opcode {opcode} for a catalog of {catalog_len} operations")]
    UnknownOpcode { opcode: usize, catalog_len: usize },

    /// Phenotype wiring resolved a dendrite to its own neuron.
    #[error("dendrite wiring resolved to its own neuron at address {address}")]
    SelfConnection { address: usize },
}
