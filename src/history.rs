//! JSON-lines run log.
//!
//! Each line is one [`RunEvent`], tagged by its `event` field, so a run can
//! be followed with `tail -f` and replayed with any JSON tooling.

use biosim_core::snapshot::WorldSnapshot;
use biosim_core::GenerationReport;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "event")]
pub enum RunEvent {
    RunStarted {
        seed: u64,
        config_fingerprint: String,
        population: usize,
        generations: u32,
        timestamp: String,
    },
    Generation {
        report: GenerationReport,
        timestamp: String,
    },
    Snapshot {
        snapshot: WorldSnapshot,
        timestamp: String,
    },
    RunFinished {
        generations: usize,
        ticks: u64,
        elapsed_ms: u64,
        timestamp: String,
    },
}

pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub struct HistoryLogger {
    live_file: Option<BufWriter<File>>,
    path: PathBuf,
}

impl HistoryLogger {
    /// Appends to `<dir>/run.jsonl`, creating the directory if needed.
    pub fn new_at(dir: impl AsRef<Path>) -> anyhow::Result<Self> {
        let dir = dir.as_ref();
        if !dir.exists() {
            std::fs::create_dir_all(dir)?;
        }
        let path = dir.join("run.jsonl");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        Ok(Self {
            live_file: Some(BufWriter::new(file)),
            path,
        })
    }

    /// A logger that drops every event.
    pub fn new_dummy() -> Self {
        Self {
            live_file: None,
            path: PathBuf::new(),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.live_file.is_some()
    }

    pub fn log_event(&mut self, event: &RunEvent) -> anyhow::Result<()> {
        if let Some(ref mut file) = self.live_file {
            let json = serde_json::to_string(event)?;
            writeln!(file, "{}", json)?;
            file.flush()?;
        }
        Ok(())
    }

    /// Reads back every event in a log file.
    pub fn read_events(path: impl AsRef<Path>) -> anyhow::Result<Vec<RunEvent>> {
        let file = File::open(path)?;
        let mut events = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            events.push(serde_json::from_str(&line)?);
        }
        Ok(events)
    }
}
