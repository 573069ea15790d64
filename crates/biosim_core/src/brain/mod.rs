pub mod forward;
pub mod topology;

pub use biosim_data::{ActionOutputs, Brain, Edge, Neuron, NeuronKind, NeuronRole};
pub use topology::build_brain;

use crate::error::Result;
use crate::genome::{GenomeLayout, GenomeLogic};
use biosim_data::{Genome, SensorRole};
use std::collections::VecDeque;

/// Trait defining the core logic for organism brains.
pub trait BrainLogic: Sized {
    /// Decodes `genome` and builds the reachable graph.
    fn from_genome(genome: &Genome, layout: &GenomeLayout) -> Result<Self>;

    #[must_use]
    fn action_outputs(&self) -> ActionOutputs;

    fn compute_outputs<F: FnMut(SensorRole) -> f32>(&mut self, sense: F);
    fn distribute(&mut self);
    fn step<F: FnMut(SensorRole) -> f32>(&mut self, sense: F) -> ActionOutputs;

    /// Arena indices of neurons from which no action neuron can be reached.
    /// Always empty for a brain produced by [`build_brain`].
    fn unreachable_neurons(&self) -> Vec<usize>;
}

impl BrainLogic for Brain {
    fn from_genome(genome: &Genome, layout: &GenomeLayout) -> Result<Self> {
        build_brain(&genome.decode(layout), layout.internal_count)
    }

    fn action_outputs(&self) -> ActionOutputs {
        forward::action_outputs(self)
    }

    fn compute_outputs<F: FnMut(SensorRole) -> f32>(&mut self, sense: F) {
        forward::compute_outputs(self, sense);
    }

    fn distribute(&mut self) {
        forward::distribute(self);
    }

    fn step<F: FnMut(SensorRole) -> f32>(&mut self, sense: F) -> ActionOutputs {
        forward::step(self, sense)
    }

    fn unreachable_neurons(&self) -> Vec<usize> {
        let mut reached = vec![false; self.neurons.len()];
        let mut queue: VecDeque<usize> = self
            .neurons
            .iter()
            .enumerate()
            .filter(|(_, n)| n.role.kind() == NeuronKind::Action)
            .map(|(i, _)| i)
            .collect();
        for &i in &queue {
            reached[i] = true;
        }
        while let Some(i) = queue.pop_front() {
            for &src in &self.neurons[i].input_sources {
                if !reached[src] {
                    reached[src] = true;
                    queue.push_back(src);
                }
            }
        }
        reached
            .iter()
            .enumerate()
            .filter(|(_, &r)| !r)
            .map(|(i, _)| i)
            .collect()
    }
}
