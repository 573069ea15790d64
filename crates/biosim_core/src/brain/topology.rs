use crate::error::{Result, SimError};
use biosim_data::{Brain, Edge, GeneRecord, Neuron, NeuronKind, NeuronRole};
use std::collections::{HashMap, VecDeque};

fn resolve(endpoint: biosim_data::Endpoint, internal_count: usize) -> Result<NeuronRole> {
    endpoint
        .role(internal_count)
        .ok_or(SimError::UnknownRole {
            kind: match endpoint.kind {
                NeuronKind::Sensory => "sensory",
                NeuronKind::Internal => "internal",
                NeuronKind::Action => "action",
            },
            index: endpoint.index,
        })
}

struct BrainBuilder {
    brain: Brain,
    index_of: HashMap<NeuronRole, usize>,
}

impl BrainBuilder {
    fn new() -> Self {
        Self {
            brain: Brain::default(),
            index_of: HashMap::new(),
        }
    }

    /// Returns the arena index of `role`, creating the neuron if needed.
    /// The flag is true when the neuron was created by this call.
    fn materialize(&mut self, role: NeuronRole) -> (usize, bool) {
        if let Some(&idx) = self.index_of.get(&role) {
            return (idx, false);
        }
        let idx = self.brain.neurons.len();
        self.brain.neurons.push(Neuron::new(role));
        self.index_of.insert(role, idx);
        (idx, true)
    }

    /// Connects `source` into `target`. A second gene for the same pair
    /// replaces the earlier weight and keeps the existing input slot.
    fn connect(&mut self, source: usize, target: usize, weight: f32) {
        if let Some(edge) = self.brain.neurons[source]
            .edges
            .iter_mut()
            .find(|e| e.target == target)
        {
            edge.weight = weight;
            return;
        }
        let downstream = &mut self.brain.neurons[target];
        let slot = downstream.inputs.len();
        downstream.inputs.push(0.0);
        downstream.input_sources.push(source);
        self.brain.neurons[source].edges.push(Edge {
            target,
            slot,
            weight,
        });
    }
}

/// Builds the reachable neuron graph for a decoded genome.
///
/// The search runs backwards from the action neurons. Every gene is consumed
/// by at most one frontier node (the first to be processed whose role equals
/// the gene's sink), so construction terminates even with internal cycles.
/// Genes whose sink is never reached contribute nothing.
pub fn build_brain(records: &[GeneRecord], internal_count: usize) -> Result<Brain> {
    let mut builder = BrainBuilder::new();
    let mut frontier = VecDeque::new();

    for record in records.iter().filter(|r| r.sink.kind == NeuronKind::Action) {
        let role = resolve(record.sink, internal_count)?;
        let (idx, created) = builder.materialize(role);
        if created {
            frontier.push_back(idx);
        }
    }

    let mut remaining: Vec<&GeneRecord> = records.iter().collect();
    while let Some(node) = frontier.pop_front() {
        let node_role = builder.brain.neurons[node].role;

        let mut matched = Vec::new();
        let mut rest = Vec::with_capacity(remaining.len());
        for record in remaining {
            if resolve(record.sink, internal_count)? == node_role {
                matched.push(record);
            } else {
                rest.push(record);
            }
        }
        remaining = rest;

        for record in matched {
            let source_role = resolve(record.source, internal_count)?;
            let (source, created) = builder.materialize(source_role);
            if created && source_role.kind() == NeuronKind::Internal {
                frontier.push_back(source);
            }
            builder.connect(source, node, record.weight);
        }
    }

    Ok(builder.brain)
}
