//! Survival predicates applied at the end of every generation.

use crate::config::SelectionConfig;

/// Decides whether the organism standing on `(x, y)` survives.
pub trait SurvivalPredicate: Sync {
    fn survives(&self, x: i32, y: i32) -> bool;
}

impl<F> SurvivalPredicate for F
where
    F: Fn(i32, i32) -> bool + Sync,
{
    fn survives(&self, x: i32, y: i32) -> bool {
        self(x, y)
    }
}

/// Survive inside the square `[0, size) x [0, size)` at the origin corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CornerSurvival {
    pub size: i32,
}

impl CornerSurvival {
    #[must_use]
    pub const fn new(size: i32) -> Self {
        Self { size }
    }
}

impl From<&SelectionConfig> for CornerSurvival {
    fn from(config: &SelectionConfig) -> Self {
        Self::new(config.corner_size)
    }
}

impl SurvivalPredicate for CornerSurvival {
    fn survives(&self, x: i32, y: i32) -> bool {
        x < self.size && y < self.size
    }
}
