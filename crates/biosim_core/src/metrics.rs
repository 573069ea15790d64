//! Run statistics and structured logging.
//!
//! [`Metrics`] keeps cheap atomic counters that the tick loop updates and
//! logs progress through `tracing`. [`GenerationReport`] is the per-generation
//! summary produced by survivor filtering and breeding.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

/// Summary of one finished generation.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct GenerationReport {
    pub generation: u32,
    /// Global tick at which the generation ended.
    pub tick: u64,
    pub population: usize,
    pub survivors: usize,
    pub survival_rate: f32,
    /// Mean normalized Hamming distance between successive survivors.
    pub diversity: f32,
    /// Set once breeding had to fall back to a random population.
    pub reseeded: bool,
}

/// Counters for the running simulation.
pub struct Metrics {
    tick_count: AtomicU64,
    organism_count: AtomicU64,
    moves: AtomicU64,
    generation_count: AtomicU64,
    progress_interval: u64,
    start_time: Instant,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new(1000)
    }
}

impl Metrics {
    /// Creates a collector that logs progress every `progress_interval` ticks
    /// (0 disables progress lines).
    #[must_use]
    pub fn new(progress_interval: u64) -> Self {
        Self {
            tick_count: AtomicU64::new(0),
            organism_count: AtomicU64::new(0),
            moves: AtomicU64::new(0),
            generation_count: AtomicU64::new(0),
            progress_interval,
            start_time: Instant::now(),
        }
    }

    /// Records a completed tick.
    pub fn record_tick(&self, duration: Duration, organisms: usize, moves: usize) {
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;
        self.organism_count.store(organisms as u64, Ordering::Relaxed);
        self.moves.fetch_add(moves as u64, Ordering::Relaxed);

        if self.progress_interval > 0 && tick % self.progress_interval == 0 {
            tracing::info!(
                tick = tick,
                organisms = organisms,
                moves = moves,
                duration_us = duration.as_micros() as u64,
                "Simulation tick"
            );
        }
    }

    pub fn record_generation(&self, report: &GenerationReport, duration: Duration) {
        self.generation_count.fetch_add(1, Ordering::Relaxed);
        tracing::info!(
            generation = report.generation,
            tick = report.tick,
            survivors = report.survivors,
            population = report.population,
            survival_rate = report.survival_rate,
            diversity = report.diversity,
            reseeded = report.reseeded,
            duration_ms = duration.as_millis() as u64,
            "Generation complete"
        );
    }

    #[must_use]
    pub fn tick_count(&self) -> u64 {
        self.tick_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn organism_count(&self) -> u64 {
        self.organism_count.load(Ordering::Relaxed)
    }

    /// Total accepted moves since creation.
    #[must_use]
    pub fn move_count(&self) -> u64 {
        self.moves.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn generation_count(&self) -> u64 {
        self.generation_count.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Initialize tracing subscriber for logging. `RUST_LOG` takes precedence
/// over `level`.
pub fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_env_filter(filter)
            .finish(),
    )
    .ok();
}
