//! Genome mutation operators.
//!
//! Mutation is pure: the input genome is never modified, a new genome is
//! returned. Resampling ranges follow the levels-back invariant, so a
//! mutated genome is always structurally valid.

use rand::Rng;

use crate::error::Result;
use crate::gene::genome::Genome;

/// Common contract for genome mutation operators.
pub trait GeneMutator {
    fn mutate_gene(&self, g: &Genome, rng: &mut impl Rng) -> Result<Genome>;
}

/// Uniform point mutation: every middle-node field and every output
/// address is independently resampled with probability `rate`.
#[derive(Debug, Clone)]
pub struct PointMutator {
    rate: f64,
}

impl PointMutator {
    pub fn new(rate: f64) -> Self {
        Self { rate }
    }
}

impl GeneMutator for PointMutator {
    fn mutate_gene(&self, g: &Genome, rng: &mut impl Rng) -> Result<Genome> {
        let num_ops = g.catalog.ops().len();
        let mut middle_nodes = Vec::with_capacity(g.middle_nodes.len());
        for (i, node) in g.middle_nodes.iter().enumerate() {
            let max_addr = g.num_inputs + i;
            let mut node = *node;
            if rng.gen::<f64>() < self.rate {
                node.in1 = rng.gen_range(0..max_addr);
            }
            if rng.gen::<f64>() < self.rate {
                node.in2 = rng.gen_range(0..max_addr);
            }
            if rng.gen::<f64>() < self.rate {
                node.in3 = rng.gen_range(0..max_addr);
            }
            if rng.gen::<f64>() < self.rate {
                node.op = rng.gen_range(0..num_ops);
            }
            middle_nodes.push(node);
        }
        let addr_space = g.num_nodes();
        let output_addrs = g
            .output_addrs
            .iter()
            .map(|&addr| {
                if rng.gen::<f64>() < self.rate {
                    rng.gen_range(0..addr_space)
                } else {
                    addr
                }
            })
            .collect();
        Ok(Genome {
            num_inputs: g.num_inputs,
            middle_nodes,
            output_addrs,
            catalog: g.catalog,
        })
    }
}

/// Single-locus mutation that rejects neutral candidates: each attempt
/// perturbs one field of a fresh copy of the input, and the first
/// candidate whose rendered formula differs from the input's is
/// accepted. The equivalence oracle is structural (string equality on
/// formulas), not semantic.
///
/// With probability 0.8 the target is a random middle node (one of its
/// four fields, chosen uniformly), otherwise a random output address.
/// Genomes without middle nodes always target an output address.
#[derive(Debug, Clone, Default)]
pub struct NeutralSkippingMutator;

impl NeutralSkippingMutator {
    pub fn new() -> Self {
        Self
    }
}

impl GeneMutator for NeutralSkippingMutator {
    fn mutate_gene(&self, g: &Genome, rng: &mut impl Rng) -> Result<Genome> {
        let original = g.formula()?;
        let num_ops = g.catalog.ops().len();
        loop {
            let mut candidate = g.clone();
            let target_middle = !candidate.middle_nodes.is_empty() && rng.gen::<f64>() < 0.8;
            if target_middle {
                let idx = rng.gen_range(0..candidate.middle_nodes.len());
                let max_addr = candidate.num_inputs + idx;
                let node = &mut candidate.middle_nodes[idx];
                match rng.gen_range(0..4) {
                    0 => node.in1 = rng.gen_range(0..max_addr),
                    1 => node.in2 = rng.gen_range(0..max_addr),
                    2 => node.in3 = rng.gen_range(0..max_addr),
                    _ => node.op = rng.gen_range(0..num_ops),
                }
            } else {
                let idx = rng.gen_range(0..candidate.output_addrs.len());
                candidate.output_addrs[idx] = rng.gen_range(0..candidate.num_nodes());
            }
            if candidate.formula()? != original {
                return Ok(candidate);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gene::builder::{GeneBuilder, GeneBuilderConfig};
    use crate::gene::ops::CatalogKey;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_genome(rng: &mut impl Rng) -> Genome {
        GeneBuilder::new(GeneBuilderConfig {
            num_inputs: 3,
            num_middle_nodes: 15,
            num_outputs: 2,
            catalog: CatalogKey::Developmental,
        })
        .make_gene(rng)
    }

    #[test]
    fn test_zero_rate_is_identity() {
        let mut rng = StdRng::seed_from_u64(1);
        let g = sample_genome(&mut rng);
        let mutated = PointMutator::new(0.0).mutate_gene(&g, &mut rng).unwrap();
        assert_eq!(mutated.formula().unwrap(), g.formula().unwrap());
        assert_eq!(mutated, g);
    }

    #[test]
    fn test_full_rate_resamples_every_locus() {
        let mut rng = StdRng::seed_from_u64(2);
        let g = sample_genome(&mut rng);
        let mutated = PointMutator::new(1.0).mutate_gene(&g, &mut rng).unwrap();
        // Uniform resampling can redraw an identical value for a single
        // locus, but a 15-node genome mutated everywhere cannot keep its
        // expressed formula.
        assert_ne!(mutated.formula().unwrap(), g.formula().unwrap());
        for (i, node) in mutated.middle_nodes.iter().enumerate() {
            let max_addr = mutated.num_inputs + i;
            assert!(node.in1 < max_addr && node.in2 < max_addr && node.in3 < max_addr);
            assert!(node.op < mutated.catalog.ops().len());
        }
        for &addr in &mutated.output_addrs {
            assert!(addr < mutated.num_nodes());
        }
    }

    #[test]
    fn test_point_mutation_is_pure() {
        let mut rng = StdRng::seed_from_u64(3);
        let g = sample_genome(&mut rng);
        let snapshot = g.clone();
        let _ = PointMutator::new(0.5).mutate_gene(&g, &mut rng).unwrap();
        assert_eq!(g, snapshot);
    }

    #[test]
    fn test_neutral_skipping_always_changes_formula() {
        let mut rng = StdRng::seed_from_u64(4);
        let g = sample_genome(&mut rng);
        let original = g.formula().unwrap();
        let mutator = NeutralSkippingMutator::new();
        for _ in 0..1000 {
            let mutated = mutator.mutate_gene(&g, &mut rng).unwrap();
            assert_ne!(mutated.formula().unwrap(), original);
        }
    }

    #[test]
    fn test_neutral_skipping_without_middle_nodes() {
        // Only output addresses can change; the accepted candidate must
        // still express a different formula.
        let g = Genome {
            num_inputs: 3,
            middle_nodes: vec![],
            output_addrs: vec![0, 1],
            catalog: CatalogKey::Arithmetic,
        };
        let mut rng = StdRng::seed_from_u64(5);
        let mutated = NeutralSkippingMutator::new().mutate_gene(&g, &mut rng).unwrap();
        assert_ne!(mutated.formula().unwrap(), g.formula().unwrap());
        assert!(mutated.middle_nodes.is_empty());
    }
}
