//! Sensory neuron formulas.
//!
//! Every sensor reads the world as of the end of the previous tick through a
//! shared [`SensorContext`] and returns a value clamped to `[0, 1]`.

use crate::config::SensorConfig;
use crate::genome::GenomeLogic;
use crate::grid::WorldGrid;
use biosim_data::{Cell, Direction, Genome, Position, SensorRole};
use rand::Rng;
use std::f64::consts::TAU;
use std::sync::Arc;

/// Read-only view of the world shared by every organism during one tick.
#[derive(Clone, Copy)]
pub struct SensorContext<'a> {
    pub grid: &'a WorldGrid,
    /// Genomes indexed by `OrganismId`.
    pub genomes: &'a [Arc<Genome>],
    pub config: &'a SensorConfig,
    /// Global tick counter.
    pub tick: u64,
    /// Ticks elapsed in the current generation.
    pub generation_tick: u32,
    pub ticks_per_generation: u32,
}

/// The organism-side inputs to a sensor reading.
#[derive(Clone, Copy)]
pub struct Subject<'a> {
    pub position: Position,
    pub direction: Direction,
    pub oscillator_period: f32,
    pub genome: &'a Genome,
}

/// Evaluates one sensor for `subject`.
pub fn sense<R: Rng>(
    ctx: &SensorContext<'_>,
    subject: &Subject<'_>,
    role: SensorRole,
    rng: &mut R,
) -> f32 {
    let grid = ctx.grid;
    let Position { x, y } = subject.position;
    let (w, h) = (grid.width(), grid.height());
    let dir = subject.direction;

    let value = match role {
        SensorRole::PosX => x as f32 / w as f32,
        SensorRole::PosY => y as f32 / h as f32,
        SensorRole::ClosestBoundX => {
            x.min(w - x - 1) as f32 / ((w / 2 - 1).max(1)) as f32
        }
        SensorRole::ClosestBoundY => {
            y.min(h - y - 1) as f32 / ((h / 2 - 1).max(1)) as f32
        }
        SensorRole::ClosestBound => {
            let nearest = x.min(w - x - 1).min(y).min(h - y - 1);
            let half = (w / 2 - 1).max(h / 2 - 1).max(1);
            2.0 * nearest as f32 / half as f32
        }
        SensorRole::GeneticSimilarityFwd => genetic_similarity_fwd(ctx, subject),
        SensorRole::PrevMoveDirX => (dir.dx + 1) as f32 / 2.0,
        SensorRole::PrevMoveDirY => (dir.dy + 1) as f32 / 2.0,
        SensorRole::LongRangePopulationFwd => {
            long_probe(ctx, subject, |cell| matches!(cell, Cell::Organism(_)))
        }
        SensorRole::LongRangeBarrierFwd => long_probe(ctx, subject, |cell| cell == Cell::Barrier),
        SensorRole::PopDensity => pop_density(ctx, subject.position),
        SensorRole::PopDensityFwd => directional_density(ctx, subject.position, dir),
        SensorRole::PopDensityLr => directional_density(ctx, subject.position, dir.rotated()),
        SensorRole::Oscillator => oscillator(ctx.tick, subject.oscillator_period),
        SensorRole::Age => {
            ctx.generation_tick as f32 / ctx.ticks_per_generation.max(1) as f32
        }
        SensorRole::BarrierFwd => short_probe(ctx, subject.position, dir),
        SensorRole::BarrierLr => short_probe(ctx, subject.position, dir.rotated()),
        SensorRole::Random => rng.gen::<f32>(),
    };

    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Similarity to the organism one step ahead. A zero heading looks at the
/// subject's own cell and so reads the subject itself.
fn genetic_similarity_fwd(ctx: &SensorContext<'_>, subject: &Subject<'_>) -> f32 {
    let ahead = subject.position.step(subject.direction, 1);
    ctx.grid
        .organism_at(ahead)
        .and_then(|id| ctx.genomes.get(id.0))
        .map_or(0.0, |other| subject.genome.similarity(other))
}

/// First cell matching `hit` at distance `d` in `[1, L)`: `(L - d + 1) / L`.
fn long_probe<F: Fn(Cell) -> bool>(ctx: &SensorContext<'_>, subject: &Subject<'_>, hit: F) -> f32 {
    let reach = ctx.config.long_probe_distance;
    if subject.direction.is_zero() || reach <= 0 {
        return 0.0;
    }
    (1..reach)
        .find(|&d| {
            ctx.grid
                .get(subject.position.step(subject.direction, d))
                .is_some_and(&hit)
        })
        .map_or(0.0, |d| (reach - d + 1) as f32 / reach as f32)
}

fn neighbourhood(radius: i32) -> impl Iterator<Item = (i32, i32)> {
    (-radius..=radius)
        .flat_map(move |dx| (-radius..=radius).map(move |dy| (dx, dy)))
        .filter(|&(dx, dy)| dx != 0 || dy != 0)
}

fn pop_density(ctx: &SensorContext<'_>, pos: Position) -> f32 {
    let r = ctx.config.population_radius;
    let cells = (2 * r + 1) * (2 * r + 1) - 1;
    if cells <= 0 {
        return 0.0;
    }
    let count = neighbourhood(r)
        .filter(|&(dx, dy)| ctx.grid.is_occupied(pos.offset(dx, dy)))
        .count();
    count as f32 / cells as f32
}

/// Occupied neighbours weighted by their projection onto `axis` over the
/// squared distance, mapped from `[-max, max]` to `[0, 1]`.
fn directional_density(ctx: &SensorContext<'_>, pos: Position, axis: Direction) -> f32 {
    let r = ctx.config.population_radius;
    let max_sum = (3 * (2 * r + 1)) as f32;
    if max_sum <= 0.0 {
        return 0.5;
    }
    let sum: f32 = neighbourhood(r)
        .filter(|&(dx, dy)| ctx.grid.is_occupied(pos.offset(dx, dy)))
        .map(|(dx, dy)| (axis.dx * dx + axis.dy * dy) as f32 / (dx * dx + dy * dy) as f32)
        .sum();
    (sum.clamp(-max_sum, max_sum) / max_sum + 1.0) / 2.0
}

fn oscillator(tick: u64, period: f32) -> f32 {
    let period = f64::from(period);
    if period <= 0.0 {
        return 0.5;
    }
    let phase = (tick as f64 % period) / period;
    (((phase * TAU).cos() + 1.0) / 2.0) as f32
}

/// Open cells before a barrier, forwards minus backwards, over `2P`.
fn short_probe(ctx: &SensorContext<'_>, pos: Position, axis: Direction) -> f32 {
    let reach = ctx.config.short_probe_distance;
    if reach <= 0 {
        return 0.5;
    }
    let forward = open_run(ctx.grid, pos, axis, reach);
    let backward = open_run(ctx.grid, pos, Direction::new(-axis.dx, -axis.dy), reach);
    (forward - backward + reach) as f32 / (2 * reach) as f32
}

/// Number of non-barrier cells walked along `axis`, up to `reach`. Walking off
/// the grid counts as fully open.
fn open_run(grid: &WorldGrid, pos: Position, axis: Direction, reach: i32) -> i32 {
    for d in 1..=reach {
        match grid.get(pos.step(axis, d)) {
            None => return reach,
            Some(Cell::Barrier) => return d - 1,
            Some(_) => {}
        }
    }
    reach
}
