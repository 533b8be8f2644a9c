//! Phenotype extraction — crystallizing a developed population into a
//! fixed feed-forward network via geometric wiring.
//!
//! The address space lays out the global input slots first (one
//! contiguous block per sub-problem), then the hidden neurons in
//! encounter order, then the output neurons. Each dendrite wires to its
//! nearest source with a strictly lesser x-coordinate, which keeps the
//! network feed-forward.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{MorphogenError, Result};
use crate::growth::{GrowthSimulation, Neuron, Point2d, WiringFallback};

/// Where one wired dendrite reads its value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireTarget {
    /// A column of the sub-problem's input batch.
    Input(usize),
    /// Another node of the network, by node index.
    Node(usize),
    /// A masked source that always contributes zero (input slots of
    /// foreign sub-problems, or the `ZeroSource` wiring fallback).
    Zero,
}

/// One incoming connection of a network node.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WiredInput {
    pub target: WireTarget,
    pub weight: f64,
}

/// One crystallized neuron.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnNode {
    pub bias: f64,
    pub tag: usize,
    pub inputs: Vec<WiredInput>,
}

/// A deployable feed-forward network for one sub-problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ann {
    /// Declared input count of the sub-problem this network serves.
    pub num_inputs: usize,
    /// Hidden nodes in encounter order, then output nodes.
    pub nodes: Vec<AnnNode>,
    /// Indexes into `nodes` of the sub-problem's declared outputs.
    pub outputs: Vec<usize>,
}

impl Ann {
    /// Evaluate the network over a batch (N×num_inputs in,
    /// N×num_outputs out). Every node applies the fixed op
    /// `tanh(Σ target·weight + bias)`; recursion terminates at input
    /// slots and zero sources.
    pub fn forward(&self, input: &DMatrix<f64>) -> Result<DMatrix<f64>> {
        if input.ncols() != self.num_inputs {
            return Err(MorphogenError::ShapeMismatch {
                expected: self.num_inputs,
                found: input.ncols(),
            });
        }
        let columns: Vec<DVector<f64>> = self
            .outputs
            .iter()
            .map(|&idx| self.node_value(idx, input))
            .collect::<Result<_>>()?;
        if columns.is_empty() {
            return Ok(DMatrix::zeros(input.nrows(), 0));
        }
        Ok(DMatrix::from_columns(&columns))
    }

    fn node_value(&self, idx: usize, input: &DMatrix<f64>) -> Result<DVector<f64>> {
        let node = &self.nodes[idx];
        let mut acc = DVector::from_element(input.nrows(), node.bias);
        for wired in &node.inputs {
            match wired.target {
                WireTarget::Input(col) => acc += input.column(col).into_owned() * wired.weight,
                WireTarget::Node(j) => acc += self.node_value(j, input)? * wired.weight,
                WireTarget::Zero => {}
            }
        }
        Ok(acc.map(f64::tanh))
    }
}

/// Reflect a dendrite position across its neuron's x-coordinate when it
/// lies to the right, so the wiring probe always looks backwards.
fn reflect(p: Point2d, axis_x: f64) -> Point2d {
    if p.x > axis_x {
        Point2d::new(axis_x - (p.x - axis_x), p.y)
    } else {
        p
    }
}

impl GrowthSimulation {
    /// Convert the current population into a wired feed-forward network
    /// for sub-problem `problem_index`.
    ///
    /// Fails with `SelfConnection` if any dendrite resolves to its own
    /// neuron's address; that is corruption, never silently accepted.
    pub fn extract_ann(&self, problem_index: usize) -> Result<Ann> {
        let num_global_inputs = self.config.num_global_inputs();
        let block_offset: usize = self.config.problem_inputs[..problem_index].iter().sum();
        let block_width = self.config.problem_inputs[problem_index];

        let hidden: Vec<&Neuron> = self.neurons.iter().filter(|n| n.tag == 0).collect();
        let outputs: Vec<&Neuron> = self.neurons.iter().filter(|n| n.tag != 0).collect();

        let mut nodes = Vec::with_capacity(hidden.len() + outputs.len());
        for (i, neuron) in hidden.iter().chain(outputs.iter()).enumerate() {
            let own_address = num_global_inputs + i;
            let mut inputs = Vec::with_capacity(neuron.dendrites.len());
            for dendrite in &neuron.dendrites {
                let probe = reflect(dendrite.position, neuron.position.x);
                let resolved = self.nearest_source(
                    probe,
                    neuron.position.x,
                    block_offset,
                    block_width,
                    num_global_inputs,
                    &hidden,
                );
                let address = match resolved {
                    Some(address) => address,
                    None => match self.config.wiring_fallback {
                        WiringFallback::FirstInput => 0,
                        WiringFallback::ZeroSource => {
                            inputs.push(WiredInput { target: WireTarget::Zero, weight: dendrite.weight });
                            continue;
                        }
                    },
                };
                if address == own_address {
                    return Err(MorphogenError::SelfConnection { address });
                }
                let target = if address < num_global_inputs {
                    if address >= block_offset && address < block_offset + block_width {
                        WireTarget::Input(address - block_offset)
                    } else {
                        // Foreign sub-problem's input slot: masked.
                        WireTarget::Zero
                    }
                } else {
                    WireTarget::Node(address - num_global_inputs)
                };
                inputs.push(WiredInput { target, weight: dendrite.weight });
            }
            nodes.push(AnnNode { bias: neuron.bias, tag: neuron.tag, inputs });
        }

        let outputs = nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.tag == problem_index + 1)
            .map(|(idx, _)| idx)
            .collect();
        Ok(Ann { num_inputs: block_width, nodes, outputs })
    }

    /// Nearest candidate by Euclidean distance from `probe`, among the
    /// sub-problem's own input slots and the hidden neurons, restricted
    /// to strictly lesser x than the owning neuron.
    fn nearest_source(
        &self,
        probe: Point2d,
        neuron_x: f64,
        block_offset: usize,
        block_width: usize,
        num_global_inputs: usize,
        hidden: &[&Neuron],
    ) -> Option<usize> {
        let mut best: Option<(usize, f64)> = None;
        let mut consider = |address: usize, position: Point2d| {
            if position.x >= neuron_x {
                return;
            }
            let distance = probe.squared_distance_to(&position);
            if best.map_or(true, |(_, b)| distance < b) {
                best = Some((address, distance));
            }
        };
        for slot in 0..block_width {
            let address = block_offset + slot;
            consider(address, self.input_locations[address]);
        }
        for (i, candidate) in hidden.iter().enumerate() {
            consider(num_global_inputs + i, candidate.position);
        }
        best.map(|(address, _)| address)
    }
}
