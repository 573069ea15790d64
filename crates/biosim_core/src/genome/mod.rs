pub mod codec;
pub mod crossover;

pub use biosim_data::{GeneRecord, Genome};
pub use codec::{decode_gene, encode_gene, format_token, parse_token, GenomeLayout};

use crate::error::GenomeError;
use biosim_data::Color;
use rand::Rng;

/// Trait defining the genetic interface for organism genomes.
pub trait GenomeLogic: Sized {
    /// Uniformly random genome: every bit of every gene drawn independently.
    fn random_with_rng<R: Rng>(layout: &GenomeLayout, rng: &mut R) -> Self;
    /// Parses the space-separated hex form.
    fn from_text(text: &str, layout: &GenomeLayout) -> Result<Self, GenomeError>;
    fn to_text(&self) -> String;
    fn decode(&self, layout: &GenomeLayout) -> Vec<GeneRecord>;
    fn total_bits(&self) -> usize;
    /// Bit `index` of the concatenated genome, most significant bit first.
    fn bit(&self, index: usize) -> bool;
    fn hamming_distance(&self, other: &Self) -> u32;
    /// `1 - min(1, 2 * hamming / total_bits)`: 1 for identical genomes, 0 at
    /// half the bits differing or beyond.
    fn similarity(&self, other: &Self) -> f32;
    /// Display color from the first three and last three hex digits.
    fn color(&self) -> Color;
    fn crossover_with_rng<R: Rng>(&self, other: &Self, rng: &mut R) -> Self;
    fn mutate_with_rng<R: Rng>(&mut self, rate: f64, rng: &mut R) -> usize;
}

impl GenomeLogic for Genome {
    fn random_with_rng<R: Rng>(layout: &GenomeLayout, rng: &mut R) -> Self {
        let mask = layout.gene_mask();
        let tokens = (0..layout.genes).map(|_| rng.gen::<u32>() & mask).collect();
        Genome::new(tokens, layout.gene_bits)
    }

    fn from_text(text: &str, layout: &GenomeLayout) -> Result<Self, GenomeError> {
        let tokens = text
            .split_whitespace()
            .map(|t| parse_token(layout, t))
            .collect::<Result<Vec<_>, _>>()?;
        if tokens.len() != layout.genes {
            return Err(GenomeError::GeneCount {
                found: tokens.len(),
                expected: layout.genes,
            });
        }
        Ok(Genome::new(tokens, layout.gene_bits))
    }

    fn to_text(&self) -> String {
        self.tokens
            .iter()
            .map(|&t| format_token(self.gene_bits, t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn decode(&self, layout: &GenomeLayout) -> Vec<GeneRecord> {
        self.tokens.iter().map(|&t| decode_gene(layout, t)).collect()
    }

    fn total_bits(&self) -> usize {
        self.len() * usize::from(self.gene_bits)
    }

    fn bit(&self, index: usize) -> bool {
        let gb = usize::from(self.gene_bits);
        let token = self.tokens[index / gb];
        let shift = gb - 1 - index % gb;
        (token >> shift) & 1 == 1
    }

    fn hamming_distance(&self, other: &Self) -> u32 {
        self.tokens
            .iter()
            .zip(&other.tokens)
            .map(|(a, b)| (a ^ b).count_ones())
            .sum()
    }

    fn similarity(&self, other: &Self) -> f32 {
        let total = self.total_bits();
        if total == 0 {
            return 1.0;
        }
        let distance = self.hamming_distance(other) as f32;
        1.0 - (2.0 * distance / total as f32).min(1.0)
    }

    fn color(&self) -> Color {
        let digits: String = self
            .tokens
            .iter()
            .map(|&t| format_token(self.gene_bits, t))
            .collect();
        let head: String = digits.chars().take(3).collect();
        let tail: String = digits
            .chars()
            .skip(digits.len().saturating_sub(3))
            .collect();
        let code = format!("{:0<6}", format!("{head}{tail}"));
        match hex::decode(&code[..6]) {
            Ok(rgb) if rgb.len() == 3 => Color {
                r: rgb[0],
                g: rgb[1],
                b: rgb[2],
            },
            _ => Color::default(),
        }
    }

    fn crossover_with_rng<R: Rng>(&self, other: &Self, rng: &mut R) -> Self {
        crossover::crossover_with_rng(self, other, rng)
    }

    fn mutate_with_rng<R: Rng>(&mut self, rate: f64, rng: &mut R) -> usize {
        crossover::mutate_with_rng(self, rate, rng)
    }
}
