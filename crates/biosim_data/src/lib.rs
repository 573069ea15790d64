//! Core data structures for the biosim simulation.
//!
//! Everything here is plain data. Behaviour (decoding, brain construction,
//! signal propagation, movement) lives in `biosim_core`, implemented through
//! extension traits on these types.

pub mod data;

pub use data::brain::{ActionOutputs, Brain, Edge, Neuron};
pub use data::genome::{Endpoint, GeneRecord, Genome};
pub use data::neuron::{ActionRole, NeuronKind, NeuronRole, SensorRole};
pub use data::world::{Cell, Color, Direction, OrganismId, Position};
