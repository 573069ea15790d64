//! Headless run driver: loads the configuration, runs every generation and
//! writes the run log.

use crate::history::{timestamp, HistoryLogger, RunEvent};
use anyhow::Result;
use biosim_core::config::AppConfig;
use biosim_core::snapshot::WorldSnapshot;
use biosim_core::{CornerSurvival, GenerationReport, SimulationObserver, SimulationState};
use std::path::Path;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub seed: Option<u64>,
    pub generations: Option<u32>,
    pub population: Option<usize>,
    pub ticks_per_generation: Option<u32>,
}

impl Overrides {
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(seed) = self.seed {
            config.world.seed = Some(seed);
        }
        if let Some(generations) = self.generations {
            config.evolution.generations = generations;
        }
        if let Some(population) = self.population {
            config.evolution.population = population;
        }
        if let Some(ticks) = self.ticks_per_generation {
            config.evolution.ticks_per_generation = ticks;
        }
    }
}

/// Loads `path`, or writes the defaults there when it does not exist yet.
pub fn load_config(path: &Path) -> Result<AppConfig> {
    if path.exists() {
        let content = std::fs::read_to_string(path)?;
        return AppConfig::from_toml(&content);
    }
    let config = AppConfig::default();
    match toml::to_string_pretty(&config) {
        Ok(text) => {
            if let Err(e) = std::fs::write(path, text) {
                tracing::warn!(path = %path.display(), error = %e, "Could not write default config");
            }
        }
        Err(e) => tracing::warn!(error = %e, "Could not serialize default config"),
    }
    tracing::info!(path = %path.display(), "Config not found, using defaults");
    Ok(config)
}

/// Forwards generation reports, and snapshots every `snapshot_every`
/// generations, to the run log. The first write error is kept and returned
/// once the run ends.
struct HistoryObserver<'a> {
    history: &'a mut HistoryLogger,
    snapshot_every: Option<u32>,
    error: Option<anyhow::Error>,
}

impl HistoryObserver<'_> {
    fn record(&mut self, event: RunEvent) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = self.history.log_event(&event) {
            tracing::error!(error = %e, "Failed to write run log");
            self.error = Some(e);
        }
    }
}

impl SimulationObserver for HistoryObserver<'_> {
    fn on_generation(&mut self, report: &GenerationReport, state: &SimulationState) {
        self.record(RunEvent::Generation {
            report: report.clone(),
            timestamp: timestamp(),
        });
        if let Some(every) = self.snapshot_every.filter(|n| *n > 0) {
            if report.generation % every == 0 {
                self.record(RunEvent::Snapshot {
                    snapshot: WorldSnapshot::capture(state),
                    timestamp: timestamp(),
                });
            }
        }
    }
}

pub struct App {
    pub state: SimulationState,
    pub predicate: CornerSurvival,
    pub history: HistoryLogger,
    pub snapshot_every: Option<u32>,
    pub fingerprint: String,
}

impl App {
    pub fn new(config: AppConfig, history: HistoryLogger) -> Result<Self> {
        let fingerprint = config.fingerprint();
        let predicate = CornerSurvival::from(&config.selection);
        let state = SimulationState::new(config)?;
        Ok(Self {
            state,
            predicate,
            history,
            snapshot_every: None,
            fingerprint,
        })
    }

    pub fn from_config_file(
        path: impl AsRef<Path>,
        overrides: &Overrides,
        history: HistoryLogger,
    ) -> Result<Self> {
        let mut config = load_config(path.as_ref())?;
        overrides.apply(&mut config);
        Self::new(config, history)
    }

    #[must_use]
    pub fn with_snapshots(mut self, every: Option<u32>) -> Self {
        self.snapshot_every = every;
        self
    }

    /// Runs every generation and returns their reports.
    pub fn run(&mut self) -> Result<Vec<GenerationReport>> {
        let config = &self.state.config;
        tracing::info!(
            seed = self.state.seed(),
            fingerprint = %self.fingerprint,
            width = config.world.width,
            height = config.world.height,
            population = config.evolution.population,
            generations = config.evolution.generations,
            "Starting run"
        );
        self.history.log_event(&RunEvent::RunStarted {
            seed: self.state.seed(),
            config_fingerprint: self.fingerprint.clone(),
            population: config.evolution.population,
            generations: config.evolution.generations,
            timestamp: timestamp(),
        })?;

        let mut observer = HistoryObserver {
            history: &mut self.history,
            snapshot_every: self.snapshot_every,
            error: None,
        };
        let reports = self.state.run(&self.predicate, &mut observer)?;
        if let Some(e) = observer.error.take() {
            return Err(e);
        }

        self.history.log_event(&RunEvent::RunFinished {
            generations: reports.len(),
            ticks: self.state.tick,
            elapsed_ms: self.state.metrics.elapsed().as_millis() as u64,
            timestamp: timestamp(),
        })?;
        Ok(reports)
    }
}
