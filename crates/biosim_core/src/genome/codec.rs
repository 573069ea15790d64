//! Bit-level gene layout.
//!
//! A gene is read most significant bit first:
//!
//! ```text
//! | src kind | src id (N) | sink kind | sink id (N) | weight (rest, signed) |
//! ```
//!
//! Source kind 1 selects an internal neuron, 0 a sensor. Sink kind 1 selects
//! an action, 0 an internal neuron. Ids are reduced modulo the catalog size of
//! their kind, so every token decodes to a usable record.

use crate::config::GenomeConfig;
use crate::error::GenomeError;
use biosim_data::{ActionRole, Endpoint, GeneRecord, NeuronKind, NeuronRole, SensorRole};

/// Derived constants for decoding and encoding genes of one configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenomeLayout {
    pub genes: usize,
    pub gene_bits: u8,
    pub id_bits: u8,
    pub weight_bits: u8,
    /// Divisor applied to the signed weight field.
    pub weight_scale: f32,
    pub internal_count: usize,
}

impl GenomeLayout {
    /// Builds the layout for a validated genome configuration.
    #[must_use]
    pub fn from_config(config: &GenomeConfig) -> Self {
        let weight_bits = config
            .gene_bits
            .saturating_sub(config.id_bits.saturating_mul(2).saturating_add(2));
        let weight_scale = if weight_bits == 0 {
            1.0
        } else {
            let half_range = 2f64.powi(i32::from(weight_bits) - 1);
            (half_range / f64::from(config.max_weight)).ceil().max(1.0) as f32
        };
        Self {
            genes: config.genes,
            gene_bits: config.gene_bits,
            id_bits: config.id_bits,
            weight_bits,
            weight_scale,
            internal_count: usize::from(config.internal_neurons),
        }
    }

    #[must_use]
    pub fn total_bits(&self) -> usize {
        self.genes * usize::from(self.gene_bits)
    }

    /// Number of hex digits in the text form of one gene.
    #[must_use]
    pub fn token_digits(&self) -> usize {
        usize::from(self.gene_bits) / 4
    }

    #[must_use]
    pub fn gene_mask(&self) -> u32 {
        mask(self.gene_bits)
    }

    #[must_use]
    pub fn catalog_size(&self, kind: NeuronKind) -> usize {
        match kind {
            NeuronKind::Sensory => SensorRole::COUNT,
            // Never zero so the modulo stays defined; an unknown index is
            // reported when the endpoint is resolved.
            NeuronKind::Internal => self.internal_count.max(1),
            NeuronKind::Action => ActionRole::COUNT,
        }
    }

    /// Builds a record that wires `source` into `sink` with (approximately)
    /// `weight`, quantized to the layout's resolution.
    ///
    /// Returns `None` when the pair cannot be expressed by a gene: sources
    /// must be sensory or internal, sinks internal or action, and ids must fit
    /// in `id_bits`.
    #[must_use]
    pub fn wire(&self, source: NeuronRole, sink: NeuronRole, weight: f32) -> Option<GeneRecord> {
        let (source_kind, source_index) = match source {
            NeuronRole::Sensory(role) => (NeuronKind::Sensory, role.index()),
            NeuronRole::Internal(i) => (NeuronKind::Internal, usize::from(i)),
            NeuronRole::Action(_) => return None,
        };
        let (sink_kind, sink_index) = match sink {
            NeuronRole::Sensory(_) => return None,
            NeuronRole::Internal(i) => (NeuronKind::Internal, usize::from(i)),
            NeuronRole::Action(role) => (NeuronKind::Action, role.index()),
        };
        let id_limit = 1usize << self.id_bits;
        if source_index >= id_limit
            || sink_index >= id_limit
            || source_index >= self.catalog_size(source_kind)
            || sink_index >= self.catalog_size(sink_kind)
        {
            return None;
        }

        let raw_weight = if self.weight_bits == 0 {
            0
        } else {
            let max = (1i64 << (self.weight_bits - 1)) - 1;
            let min = -(1i64 << (self.weight_bits - 1));
            ((f64::from(weight) * f64::from(self.weight_scale)).round() as i64).clamp(min, max)
                as i32
        };

        Some(GeneRecord {
            source: Endpoint {
                kind: source_kind,
                index: source_index,
            },
            sink: Endpoint {
                kind: sink_kind,
                index: sink_index,
            },
            weight: raw_weight as f32 / self.weight_scale,
            raw_source_id: source_index as u32,
            raw_sink_id: sink_index as u32,
            raw_weight,
        })
    }
}

#[inline]
fn mask(bits: u8) -> u32 {
    if bits >= 32 {
        u32::MAX
    } else {
        (1u32 << bits) - 1
    }
}

/// Decodes one gene token. Total: bits above `gene_bits` are ignored.
#[must_use]
pub fn decode_gene(layout: &GenomeLayout, token: u32) -> GeneRecord {
    let gb = u32::from(layout.gene_bits);
    let id = u32::from(layout.id_bits);
    let wb = u32::from(layout.weight_bits);
    let token = token & layout.gene_mask();

    let source_flag = (token >> (gb - 1)) & 1;
    let raw_source_id = (token >> (gb - 1 - id)) & mask(layout.id_bits);
    let sink_flag = (token >> (gb - 2 - id)) & 1;
    let raw_sink_id = (token >> (gb - 2 - 2 * id)) & mask(layout.id_bits);

    let raw_weight = if wb == 0 {
        0
    } else {
        let field = i64::from(token & mask(layout.weight_bits));
        if field >> (wb - 1) & 1 == 1 {
            (field - (1i64 << wb)) as i32
        } else {
            field as i32
        }
    };

    let source_kind = if source_flag == 1 {
        NeuronKind::Internal
    } else {
        NeuronKind::Sensory
    };
    let sink_kind = if sink_flag == 1 {
        NeuronKind::Action
    } else {
        NeuronKind::Internal
    };

    GeneRecord {
        source: Endpoint {
            kind: source_kind,
            index: raw_source_id as usize % layout.catalog_size(source_kind),
        },
        sink: Endpoint {
            kind: sink_kind,
            index: raw_sink_id as usize % layout.catalog_size(sink_kind),
        },
        weight: raw_weight as f32 / layout.weight_scale,
        raw_source_id,
        raw_sink_id,
        raw_weight,
    }
}

/// Packs a record back into a token from its raw fields.
#[must_use]
pub fn encode_gene(layout: &GenomeLayout, record: &GeneRecord) -> u32 {
    let gb = u32::from(layout.gene_bits);
    let id = u32::from(layout.id_bits);
    let source_flag = u32::from(record.source.kind == NeuronKind::Internal);
    let sink_flag = u32::from(record.sink.kind == NeuronKind::Action);
    let id_mask = mask(layout.id_bits);

    let mut token = source_flag << (gb - 1);
    token |= (record.raw_source_id & id_mask) << (gb - 1 - id);
    token |= sink_flag << (gb - 2 - id);
    token |= (record.raw_sink_id & id_mask) << (gb - 2 - 2 * id);
    if layout.weight_bits > 0 {
        token |= (record.raw_weight as u32) & mask(layout.weight_bits);
    }
    token & layout.gene_mask()
}

/// Parses one fixed-width hex token.
pub fn parse_token(layout: &GenomeLayout, token: &str) -> Result<u32, GenomeError> {
    if layout.gene_bits % 8 != 0 || layout.gene_bits > 32 || layout.gene_bits == 0 {
        return Err(GenomeError::GeneWidth(layout.gene_bits));
    }
    let expected = layout.token_digits();
    if token.len() != expected {
        return Err(GenomeError::TokenLength {
            token: token.to_string(),
            expected,
        });
    }
    let bytes = hex::decode(token).map_err(|e| GenomeError::TokenEncoding {
        token: token.to_string(),
        reason: e.to_string(),
    })?;
    Ok(bytes
        .iter()
        .fold(0u32, |acc, &b| (acc << 8) | u32::from(b)))
}

/// Formats a token as fixed-width lowercase hex.
#[must_use]
pub fn format_token(gene_bits: u8, token: u32) -> String {
    let byte_count = (usize::from(gene_bits) / 8).clamp(1, 4);
    let bytes = token.to_be_bytes();
    hex::encode(&bytes[4 - byte_count..])
}
