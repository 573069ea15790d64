//! Error types for biosim_core.
//!
//! Every variant here is fatal for the run: it signals either bad external
//! input (a hand-written genome) or a bug in the engine itself. The only
//! recoverable condition, breeding with fewer than two survivors, is handled
//! in place and never surfaces as an error.

use biosim_data::{OrganismId, Position};
use thiserror::Error;

/// Errors produced while reading genomes from their text form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenomeError {
    /// Token has the wrong number of hex digits.
    #[error("Malformed gene token {token:?}: expected {expected} hex digits")]
    TokenLength { token: String, expected: usize },

    /// Token is not valid hexadecimal.
    #[error("Malformed gene token {token:?}: {reason}")]
    TokenEncoding { token: String, reason: String },

    /// Genome does not have the configured number of genes.
    #[error("Genome has {found} genes, expected {expected}")]
    GeneCount { found: usize, expected: usize },

    /// Gene width cannot be represented as whole hex bytes in a `u32`.
    #[error("Unsupported gene width: {0} bits")]
    GeneWidth(u8),
}

/// Internal-consistency and input errors raised by the simulation engine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    /// Genome parsing failed.
    #[error("Genome error: {0}")]
    Genome(#[from] GenomeError),

    /// A decoded index has no role in its catalog.
    #[error("Unknown {kind} role index {index}")]
    UnknownRole { kind: &'static str, index: usize },

    /// The grid does not reference the organism at its stored position.
    #[error("Grid desync: organism {id:?} records position {position:?} but the cell does not reference it")]
    GridDesync { id: OrganismId, position: Position },

    /// Placement onto a cell that is not empty or not in bounds.
    #[error("Cannot place organism {id:?} at {position:?}")]
    Placement { id: OrganismId, position: Position },

    /// No empty cell is left for placement.
    #[error("No empty cell available for placement")]
    GridFull,
}

/// Result type alias for biosim_core operations.
pub type Result<T> = std::result::Result<T, SimError>;
