//! Genome — an immutable DAG program and its recursive interpreter.
//!
//! Addresses below `num_inputs` select raw input columns; address `a >=
//! num_inputs` selects middle node `a - num_inputs`. Middle node `i` may
//! only reference addresses `< num_inputs + i` (the levels-back
//! invariant), so the program is acyclic by construction.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{MorphogenError, Result};
use crate::gene::ops::CatalogKey;

/// One computed node: three operand addresses and an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MiddleNode {
    pub in1: usize,
    pub in2: usize,
    pub in3: usize,
    pub op: usize,
}

/// A DAG-structured numeric program. Genomes are immutable values;
/// mutation always produces a new genome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Genome {
    pub num_inputs: usize,
    pub middle_nodes: Vec<MiddleNode>,
    pub output_addrs: Vec<usize>,
    pub catalog: CatalogKey,
}

impl Genome {
    /// Size of the address space: raw inputs plus middle nodes.
    pub fn num_nodes(&self) -> usize {
        self.num_inputs + self.middle_nodes.len()
    }

    /// Evaluate the genome over a batch. `input` is N×num_inputs; the
    /// result is N×num_outputs, one column per output address.
    ///
    /// Shared sub-addresses are recomputed rather than memoized, which
    /// keeps the evaluator free of side effects. Any NaN produced by an
    /// operation is zeroed before it escapes.
    pub fn evaluate(&self, input: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if input.ncols() != self.num_inputs {
            return Err(MorphogenError::ShapeMismatch {
                expected: self.num_inputs,
                found: input.ncols(),
            });
        }
        let columns: Vec<DVector<f64>> = self
            .output_addrs
            .iter()
            .map(|&addr| self.evaluate_node(addr, input))
            .collect::<Result<_>>()?;
        if columns.is_empty() {
            return Ok(DMatrix::zeros(input.nrows(), 0));
        }
        Ok(DMatrix::from_columns(&columns))
    }

    fn evaluate_node(&self, addr: usize, input: &DMatrix<f64>) -> Result<DVector<f64>> {
        if addr < self.num_inputs {
            return Ok(input.column(addr).into_owned());
        }
        let node = &self.middle_nodes[addr - self.num_inputs];
        let ops = self.catalog.ops();
        if node.op >= ops.len() {
            return Err(MorphogenError::UnknownOpcode {
                opcode: node.op,
                catalog_len: ops.len(),
            });
        }
        let in1 = self.evaluate_node(node.in1, input)?;
        let in2 = self.evaluate_node(node.in2, input)?;
        let in3 = self.evaluate_node(node.in3, input)?;
        let mut out = (ops[node.op].eval)(&in1, &in2, &in3);
        for v in out.iter_mut() {
            if v.is_nan() {
                *v = 0.0;
            }
        }
        Ok(out)
    }

    /// Render one human-readable expression per output address, using
    /// the catalog's symbolic formatters. The mutators compare these
    /// strings to detect neutral mutations.
    pub fn formula(&self) -> Result<Vec<String>> {
        self.output_addrs
            .iter()
            .map(|&addr| self.node_formula(addr))
            .collect()
    }

    fn node_formula(&self, addr: usize) -> Result<String> {
        if addr < self.num_inputs {
            return Ok(format!("in{}", addr));
        }
        let node = &self.middle_nodes[addr - self.num_inputs];
        let ops = self.catalog.ops();
        if node.op >= ops.len() {
            return Err(MorphogenError::UnknownOpcode {
                opcode: node.op,
                catalog_len: ops.len(),
            });
        }
        let in1 = self.node_formula(node.in1)?;
        let in2 = self.node_formula(node.in2)?;
        let in3 = self.node_formula(node.in3)?;
        Ok((ops[node.op].format)(&in1, &in2, &in3))
    }
}
