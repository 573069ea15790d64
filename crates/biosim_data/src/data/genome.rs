use super::neuron::{ActionRole, NeuronKind, NeuronRole, SensorRole};
use serde::{Deserialize, Serialize};

/// Fixed-length genome: one raw token per gene, each `gene_bits` wide and
/// stored right-aligned in a `u32`, most significant bit first.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Genome {
    /// Raw gene tokens.
    pub tokens: Vec<u32>,
    /// Width of every gene in bits (8..=32, multiple of 8).
    pub gene_bits: u8,
}

impl Genome {
    #[must_use]
    pub fn new(tokens: Vec<u32>, gene_bits: u8) -> Self {
        Self { tokens, gene_bits }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// One end of a decoded connection, with its index already reduced modulo
/// the catalog size of `kind`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub kind: NeuronKind,
    pub index: usize,
}

impl Endpoint {
    /// Resolves the endpoint to a concrete neuron role, or `None` if the
    /// index is outside the catalog for its kind.
    #[must_use]
    pub fn role(self, internal_count: usize) -> Option<NeuronRole> {
        match self.kind {
            NeuronKind::Sensory => SensorRole::from_index(self.index).map(NeuronRole::Sensory),
            NeuronKind::Internal => (self.index < internal_count)
                .then(|| u8::try_from(self.index).ok())
                .flatten()
                .map(NeuronRole::Internal),
            NeuronKind::Action => ActionRole::from_index(self.index).map(NeuronRole::Action),
        }
    }
}

/// Wiring record decoded from a single gene.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeneRecord {
    pub source: Endpoint,
    pub sink: Endpoint,
    /// Scaled connection weight.
    pub weight: f32,
    /// Source id bits before modulo reduction.
    pub raw_source_id: u32,
    /// Sink id bits before modulo reduction.
    pub raw_sink_id: u32,
    /// Signed weight field before scaling.
    pub raw_weight: i32,
}
