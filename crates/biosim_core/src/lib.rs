//! # Biosim Core
//!
//! The simulation engine for biosim: organisms on a 2D grid whose behaviour
//! comes from a small neural graph wired by their genome, evolving under a
//! pluggable survival rule.
//!
//! This crate contains the deterministic simulation logic, including:
//! - Genome codec (fixed-width hex genes to wiring records and back)
//! - Brain construction by backward search from action neurons
//! - Two-phase neural execution and the sensor catalog
//! - Grid movement, survivor selection and breeding
//! - Metrics collection and structured logging
//!
//! ## Architecture
//!
//! Plain data lives in `biosim_data`; behaviour is attached here through
//! extension traits ([`GenomeLogic`], [`BrainLogic`]). The run is driven by
//! [`evolution::SimulationState`], which owns the grid, the organism arena
//! and the seeded RNG. The per-organism think pass runs in parallel with
//! rayon; moves are applied sequentially.
//!
//! ## Example
//!
//! ```
//! use biosim_core::brain::BrainLogic;
//! use biosim_core::config::GenomeConfig;
//! use biosim_core::genome::{GenomeLayout, GenomeLogic};
//! use biosim_data::{Brain, Genome};
//! use rand::SeedableRng;
//! use rand_chacha::ChaCha8Rng;
//!
//! let mut rng = ChaCha8Rng::seed_from_u64(42);
//! let layout = GenomeLayout::from_config(&GenomeConfig::default());
//! let genome = Genome::random_with_rng(&layout, &mut rng);
//! let mut brain = Brain::from_genome(&genome, &layout).unwrap();
//!
//! // Every sensor reads 0.5 for this tick.
//! let outputs = brain.step(|_| 0.5);
//! assert!(outputs.iter().count() <= 6);
//! ```

/// Neural graph construction and execution
pub mod brain;
/// Configuration management for simulation parameters
pub mod config;
/// Error types for genome parsing and engine consistency checks
pub mod error;
/// Generation state machine and the tick loop
pub mod evolution;
/// Genome codec, text form and genetic operators
pub mod genome;
/// Dense world grid with barrier and organism cells
pub mod grid;
/// Performance metrics collection and logging
pub mod metrics;
/// Organisms: brain, heading and action interpretation
pub mod organism;
/// Survival predicates
pub mod selection;
/// Sensory neuron formulas
pub mod sensors;
/// World snapshots for renderers
pub mod snapshot;

pub use brain::BrainLogic;
pub use error::{GenomeError, SimError};
pub use evolution::{GenerationPhase, SimulationObserver, SimulationState};
pub use genome::{GenomeLayout, GenomeLogic};
pub use metrics::{init_logging, GenerationReport, Metrics};
pub use selection::{CornerSurvival, SurvivalPredicate};
