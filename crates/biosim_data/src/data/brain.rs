use super::neuron::{ActionRole, NeuronRole};
use serde::{Deserialize, Serialize};

/// Outgoing connection owned by the upstream neuron.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge {
    /// Index of the downstream neuron in [`Brain::neurons`].
    pub target: usize,
    /// Input slot of the downstream neuron that this edge writes.
    pub slot: usize,
    /// Fixed weight decoded from the genome.
    pub weight: f32,
}

/// A materialized neuron.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Neuron {
    pub role: NeuronRole,
    /// Output from the most recent compute phase. Persists across ticks.
    pub output: f32,
    /// Input buffer: one slot per upstream neuron, holding the last value
    /// that neuron delivered. Slots are overwritten, never cleared.
    pub inputs: Vec<f32>,
    /// Upstream neuron index for each input slot.
    pub input_sources: Vec<usize>,
    /// Outgoing connections.
    pub edges: Vec<Edge>,
}

impl Neuron {
    #[must_use]
    pub fn new(role: NeuronRole) -> Self {
        Self {
            role,
            output: 0.0,
            inputs: Vec::new(),
            input_sources: Vec::new(),
            edges: Vec::new(),
        }
    }

    #[must_use]
    pub fn input_sum(&self) -> f32 {
        self.inputs.iter().sum()
    }
}

/// Neural graph of a single organism, stored as a flat arena.
///
/// Only neurons reachable from an action neuron are present. Edges refer to
/// their targets by arena index, so the brain can be cloned or moved freely.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Brain {
    pub neurons: Vec<Neuron>,
}

impl Brain {
    #[must_use]
    pub fn neuron_count(&self) -> usize {
        self.neurons.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.neurons.iter().map(|n| n.edges.len()).sum()
    }

    #[must_use]
    pub fn find(&self, role: NeuronRole) -> Option<usize> {
        self.neurons.iter().position(|n| n.role == role)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.neurons.is_empty()
    }
}

/// Outputs of the action neurons after a compute phase. A role without a
/// materialized neuron is `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionOutputs(pub [Option<f32>; ActionRole::COUNT]);

impl ActionOutputs {
    #[must_use]
    pub fn get(&self, role: ActionRole) -> Option<f32> {
        self.0[role.index()]
    }

    /// Output of `role`, or 0.0 if the organism has no such neuron.
    #[must_use]
    pub fn value(&self, role: ActionRole) -> f32 {
        self.get(role).unwrap_or(0.0)
    }

    pub fn set(&mut self, role: ActionRole, value: f32) {
        self.0[role.index()] = Some(value);
    }

    pub fn iter(&self) -> impl Iterator<Item = (ActionRole, f32)> + '_ {
        ActionRole::ALL
            .iter()
            .filter_map(move |&role| self.get(role).map(|v| (role, v)))
    }
}
