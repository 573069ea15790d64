use crate::evolution::SimulationState;
use biosim_data::{Color, Direction, OrganismId, Position};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct OrganismSnapshot {
    pub id: OrganismId,
    pub x: i32,
    pub y: i32,
    pub color: Color,
    pub direction: Direction,
    pub neurons: usize,
}

/// Read-only picture of the world for renderers and loggers.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub generation: u32,
    pub generation_tick: u32,
    pub width: i32,
    pub height: i32,
    pub organisms: Vec<OrganismSnapshot>,
    pub barriers: Vec<Position>,
}

impl WorldSnapshot {
    #[must_use]
    pub fn capture(state: &SimulationState) -> Self {
        let organisms = state
            .organisms
            .iter()
            .map(|o| OrganismSnapshot {
                id: o.id,
                x: o.position.x,
                y: o.position.y,
                color: o.color,
                direction: o.direction,
                neurons: o.brain.neuron_count(),
            })
            .collect();
        Self {
            tick: state.tick,
            generation: state.generation,
            generation_tick: state.generation_tick,
            width: state.grid.width(),
            height: state.grid.height(),
            organisms,
            barriers: state.grid.barrier_cells().collect(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, BarrierRect};

    #[test]
    fn test_capture_after_populate() {
        let mut config = AppConfig::default();
        config.world.width = 20;
        config.world.height = 20;
        config.world.seed = Some(5);
        config.world.barriers = vec![BarrierRect {
            x0: 0,
            y0: 10,
            x1: 4,
            y1: 10,
        }];
        config.evolution.population = 15;
        let mut state = SimulationState::new(config).expect("valid config");
        state.populate(Vec::new()).expect("room for everyone");

        let snap = WorldSnapshot::capture(&state);
        assert_eq!(snap.organisms.len(), 15);
        assert_eq!(snap.barriers.len(), 5);
        for o in &snap.organisms {
            assert_eq!(
                state.grid.organism_at(Position::new(o.x, o.y)),
                Some(o.id)
            );
        }
        let json = snap.to_json().expect("snapshot serializes");
        assert!(json.contains("\"generation\":0"));
        let parsed: WorldSnapshot = serde_json::from_str(&json).expect("snapshot parses");
        assert_eq!(parsed, snap);
    }
}
