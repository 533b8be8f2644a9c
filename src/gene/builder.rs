//! Random genome construction.
//!
//! Middle nodes are built left to right; node `i` samples its operands
//! from `[0, num_inputs + i)`, which enforces the levels-back invariant
//! by construction.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::gene::genome::{Genome, MiddleNode};
use crate::gene::ops::CatalogKey;

/// Dimensions and catalog for randomly built genomes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneBuilderConfig {
    pub num_inputs: usize,
    pub num_middle_nodes: usize,
    pub num_outputs: usize,
    pub catalog: CatalogKey,
}

/// Builds uniformly random genomes for a fixed configuration.
#[derive(Debug, Clone)]
pub struct GeneBuilder {
    config: GeneBuilderConfig,
}

impl GeneBuilder {
    pub fn new(config: GeneBuilderConfig) -> Self {
        Self { config }
    }

    /// Build one random genome. Output addresses are sampled uniformly
    /// over the whole address space and may duplicate or select raw
    /// inputs directly.
    pub fn make_gene(&self, rng: &mut impl Rng) -> Genome {
        let middle_nodes = (0..self.config.num_middle_nodes)
            .map(|i| self.make_middle_node(i, rng))
            .collect();
        let addr_space = self.config.num_inputs + self.config.num_middle_nodes;
        let output_addrs = (0..self.config.num_outputs)
            .map(|_| rng.gen_range(0..addr_space))
            .collect();
        Genome {
            num_inputs: self.config.num_inputs,
            middle_nodes,
            output_addrs,
            catalog: self.config.catalog,
        }
    }

    fn make_middle_node(&self, index: usize, rng: &mut impl Rng) -> MiddleNode {
        let max_addr = self.config.num_inputs + index;
        MiddleNode {
            in1: rng.gen_range(0..max_addr),
            in2: rng.gen_range(0..max_addr),
            in3: rng.gen_range(0..max_addr),
            op: rng.gen_range(0..self.config.catalog.ops().len()),
        }
    }
}
