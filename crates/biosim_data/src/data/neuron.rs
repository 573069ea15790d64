use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of neural node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronKind {
    /// Reads organism or world state (graph leaf).
    Sensory,
    /// Hidden node, `tanh` activation.
    Internal,
    /// Drives behaviour, unsquashed sum.
    Action,
}

/// Sensory role catalog. Order is significant: gene indices select roles by
/// position in [`SensorRole::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensorRole {
    PosX,
    PosY,
    ClosestBoundX,
    ClosestBoundY,
    ClosestBound,
    GeneticSimilarityFwd,
    PrevMoveDirX,
    PrevMoveDirY,
    LongRangePopulationFwd,
    LongRangeBarrierFwd,
    PopDensity,
    PopDensityFwd,
    PopDensityLr,
    Oscillator,
    Age,
    BarrierFwd,
    BarrierLr,
    Random,
}

impl SensorRole {
    pub const ALL: [SensorRole; 18] = [
        SensorRole::PosX,
        SensorRole::PosY,
        SensorRole::ClosestBoundX,
        SensorRole::ClosestBoundY,
        SensorRole::ClosestBound,
        SensorRole::GeneticSimilarityFwd,
        SensorRole::PrevMoveDirX,
        SensorRole::PrevMoveDirY,
        SensorRole::LongRangePopulationFwd,
        SensorRole::LongRangeBarrierFwd,
        SensorRole::PopDensity,
        SensorRole::PopDensityFwd,
        SensorRole::PopDensityLr,
        SensorRole::Oscillator,
        SensorRole::Age,
        SensorRole::BarrierFwd,
        SensorRole::BarrierLr,
        SensorRole::Random,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            SensorRole::PosX => "POS_X",
            SensorRole::PosY => "POS_Y",
            SensorRole::ClosestBoundX => "CLOSEST_BOUND_X",
            SensorRole::ClosestBoundY => "CLOSEST_BOUND_Y",
            SensorRole::ClosestBound => "CLOSEST_BOUND",
            SensorRole::GeneticSimilarityFwd => "GENETIC_SIMILARITY_FWD",
            SensorRole::PrevMoveDirX => "PREV_MOVE_DIR_X",
            SensorRole::PrevMoveDirY => "PREV_MOVE_DIR_Y",
            SensorRole::LongRangePopulationFwd => "LONG_RANGE_POPULATION_FWD",
            SensorRole::LongRangeBarrierFwd => "LONG_RANGE_BARRIER_FWD",
            SensorRole::PopDensity => "POP_DENSITY",
            SensorRole::PopDensityFwd => "POP_DENSITY_FWD",
            SensorRole::PopDensityLr => "POP_DENSITY_LR",
            SensorRole::Oscillator => "OSCILLATOR",
            SensorRole::Age => "AGE",
            SensorRole::BarrierFwd => "BARRIER_FWD",
            SensorRole::BarrierLr => "BARRIER_LR",
            SensorRole::Random => "RANDOM",
        }
    }
}

/// Action role catalog, indexed the same way as [`SensorRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionRole {
    MoveDirX,
    MoveDirY,
    MoveFwd,
    MoveLr,
    MoveRand,
    SetOscPeriod,
}

impl ActionRole {
    pub const ALL: [ActionRole; 6] = [
        ActionRole::MoveDirX,
        ActionRole::MoveDirY,
        ActionRole::MoveFwd,
        ActionRole::MoveLr,
        ActionRole::MoveRand,
        ActionRole::SetOscPeriod,
    ];

    pub const COUNT: usize = Self::ALL.len();

    #[must_use]
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            ActionRole::MoveDirX => "MOVE_DIR_X",
            ActionRole::MoveDirY => "MOVE_DIR_Y",
            ActionRole::MoveFwd => "MOVE_FWD",
            ActionRole::MoveLr => "MOVE_LR",
            ActionRole::MoveRand => "MOVE_RAND",
            ActionRole::SetOscPeriod => "SET_OSC_PERIOD",
        }
    }
}

/// Identity of a neuron within one organism: its kind plus its role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NeuronRole {
    Sensory(SensorRole),
    Internal(u8),
    Action(ActionRole),
}

impl NeuronRole {
    #[must_use]
    pub fn kind(self) -> NeuronKind {
        match self {
            NeuronRole::Sensory(_) => NeuronKind::Sensory,
            NeuronRole::Internal(_) => NeuronKind::Internal,
            NeuronRole::Action(_) => NeuronKind::Action,
        }
    }
}

impl fmt::Display for NeuronRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NeuronRole::Sensory(role) => f.write_str(role.label()),
            NeuronRole::Internal(i) => write!(f, "NEURON{i}"),
            NeuronRole::Action(role) => f.write_str(role.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_indices_match_positions() {
        for (i, role) in SensorRole::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
            assert_eq!(SensorRole::from_index(i), Some(*role));
        }
        for (i, role) in ActionRole::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
        assert_eq!(SensorRole::from_index(SensorRole::COUNT), None);
        assert_eq!(ActionRole::from_index(ActionRole::COUNT), None);
    }

    #[test]
    fn test_sensor_labels_are_unique() {
        let labels: std::collections::HashSet<_> =
            SensorRole::ALL.iter().map(|r| r.label()).collect();
        assert_eq!(labels.len(), SensorRole::COUNT);
    }

    #[test]
    fn test_role_display() {
        assert_eq!(NeuronRole::Internal(2).to_string(), "NEURON2");
        assert_eq!(
            NeuronRole::Action(ActionRole::MoveFwd).to_string(),
            "MOVE_FWD"
        );
        assert_eq!(NeuronRole::Sensory(SensorRole::Random).kind(), NeuronKind::Sensory);
    }
}
