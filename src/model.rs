//! Re-exports of the simulation model for the binary and integration tests.

pub use biosim_core::brain::{self, BrainLogic};
pub use biosim_core::config::{self, AppConfig, BarrierRect};
pub use biosim_core::error::{GenomeError, SimError};
pub use biosim_core::evolution::{self, GenerationPhase, SimulationObserver, SimulationState};
pub use biosim_core::genome::{self, GenomeLayout, GenomeLogic};
pub use biosim_core::grid::WorldGrid;
pub use biosim_core::metrics::{GenerationReport, Metrics};
pub use biosim_core::organism::Organism;
pub use biosim_core::selection::{CornerSurvival, SurvivalPredicate};
pub use biosim_core::sensors;
pub use biosim_core::snapshot::WorldSnapshot;
pub use biosim_data::{
    ActionOutputs, ActionRole, Brain, Cell, Color, Direction, GeneRecord, Genome, NeuronKind,
    NeuronRole, OrganismId, Position, SensorRole,
};
