// src/history/mod.rs

use anyhow::{Context, Result};
use chrono::Local;
use std::{
    fs::OpenOptions,
    io::Write,
    path::{Path, PathBuf},
};
use tracing::info;

pub mod state;

pub use state::Stage;

/// `2026-Oct-16-09:30:01`
pub const TIMESTAMP_FORMAT: &str = "%Y-%b-%d-%H:%M:%S";

/// Append-only progress log: one `<timestamp> : <message>` line per stage
/// transition, mirrored as a structured tracing event.
pub struct ProgressLog {
    path: PathBuf,
}

impl ProgressLog {
    /// The file is created lazily on the first entry.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Record that `stage` reached `message`.
    pub fn log(&self, stage: Stage, message: &str) -> Result<()> {
        info!(stage = stage.as_str(), "{}", message);

        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .with_context(|| format!("opening progress log {:?}", &self.path))?;
        writeln!(file, "{} : {}", timestamp, message)
            .with_context(|| format!("appending to progress log {:?}", &self.path))?;
        Ok(())
    }
}
