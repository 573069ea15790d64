//! Core data structures for the biosim simulation.

pub mod brain;
pub mod genome;
pub mod neuron;
pub mod world;
