use crate::brain::BrainLogic;
use crate::error::Result;
use crate::genome::{GenomeLayout, GenomeLogic};
use crate::grid::WorldGrid;
use crate::sensors::{self, SensorContext, Subject};
use biosim_data::{ActionOutputs, ActionRole, Brain, Color, Direction, Genome, OrganismId, Position};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A simulated organism: genome, the brain built from it, and its place in
/// the world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organism {
    pub id: OrganismId,
    pub genome: Arc<Genome>,
    pub brain: Brain,
    pub position: Position,
    /// Heading used by the forward/lateral sensors and actions. Becomes
    /// `(0, 0)` after a tick in which no step was drawn.
    pub direction: Direction,
    pub oscillator_period: f32,
    pub color: Color,
}

/// Oscillator period selected by a `SET_OSC_PERIOD` output.
#[must_use]
pub fn oscillator_period_for(output: f32) -> f32 {
    2.5 + (3.0 * (output.tanh() + 1.0)).exp()
}

impl Organism {
    /// Builds the brain from `genome` and draws a random non-zero heading.
    /// The organism has no position until it is placed on a grid.
    pub fn new<R: Rng>(
        id: OrganismId,
        genome: Arc<Genome>,
        layout: &GenomeLayout,
        oscillator_period: f32,
        rng: &mut R,
    ) -> Result<Self> {
        let mut direction = Direction::ZERO;
        while direction.is_zero() {
            direction = Direction::new(rng.gen_range(-1..=1), rng.gen_range(-1..=1));
        }
        Self::with_direction(id, genome, layout, oscillator_period, direction)
    }

    pub fn with_direction(
        id: OrganismId,
        genome: Arc<Genome>,
        layout: &GenomeLayout,
        oscillator_period: f32,
        direction: Direction,
    ) -> Result<Self> {
        let brain = Brain::from_genome(&genome, layout)?;
        let color = genome.color();
        Ok(Self {
            id,
            genome,
            brain,
            position: Position::default(),
            direction,
            oscillator_period,
            color,
        })
    }

    /// Senses, computes and distributes one tick of neural activity.
    pub fn think<R: Rng>(&mut self, ctx: &SensorContext<'_>, rng: &mut R) -> ActionOutputs {
        let subject = Subject {
            position: self.position,
            direction: self.direction,
            oscillator_period: self.oscillator_period,
            genome: &self.genome,
        };
        self.brain
            .step(|role| sensors::sense(ctx, &subject, role, rng))
    }

    /// Turns action outputs into a step in `{-1, 0, 1}^2`.
    ///
    /// Updates the oscillator period when `SET_OSC_PERIOD` is present, and
    /// zeroes the heading when the drawn step is `(0, 0)`.
    pub fn interpret_actions<R: Rng>(&mut self, outputs: &ActionOutputs, rng: &mut R) -> (i32, i32) {
        let (mut dx, mut dy) = (0.0f32, 0.0f32);
        for (role, output) in outputs.iter() {
            match role {
                ActionRole::MoveDirX => dx += output,
                ActionRole::MoveDirY => dy += output,
                ActionRole::MoveFwd => {
                    dx += self.direction.dx as f32;
                    dy += self.direction.dy as f32;
                }
                ActionRole::MoveLr => {
                    let lateral = self.direction.rotated();
                    dx += lateral.dx as f32;
                    dy += lateral.dy as f32;
                }
                ActionRole::MoveRand => {
                    if output > 0.0 {
                        dx += rng.gen::<f32>() * 2.0 - 1.0;
                        dy += rng.gen::<f32>() * 2.0 - 1.0;
                    }
                }
                ActionRole::SetOscPeriod => {
                    self.oscillator_period = oscillator_period_for(output);
                }
            }
        }

        let step = (draw_axis(dx.tanh(), rng), draw_axis(dy.tanh(), rng));
        if step == (0, 0) {
            self.direction = Direction::ZERO;
        }
        step
    }

    /// Think and interpret in one call; the returned step still has to be
    /// applied with [`Organism::apply_move`].
    pub fn plan<R: Rng>(&mut self, ctx: &SensorContext<'_>, rng: &mut R) -> (i32, i32) {
        let outputs = self.think(ctx, rng);
        self.interpret_actions(&outputs, rng)
    }

    pub fn apply_move(&mut self, grid: &mut WorldGrid, (dx, dy): (i32, i32)) -> Result<bool> {
        grid.move_organism(self.id, &mut self.position, dx, dy)
    }
}

/// Bernoulli draw with probability `|p|`; negative `p` steps backwards.
fn draw_axis<R: Rng>(p: f32, rng: &mut R) -> i32 {
    if rng.gen::<f32>() < p.abs() {
        if p < 0.0 {
            -1
        } else {
            1
        }
    } else {
        0
    }
}
