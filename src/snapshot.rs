use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::canopy::{Canopy, CanopySnapshot};

/// One snapshot file: the canopy state plus the wall-clock capture time.
#[derive(Debug, Serialize, Deserialize)]
pub struct SnapshotEnvelope {
    pub captured_at: String,
    pub canopy: CanopySnapshot,
}

/// Writes periodic JSON state dumps, one file per snapshot tick. An
/// interval of zero disables writing entirely.
pub struct SnapshotWriter {
    output_dir: PathBuf,
    interval_ticks: u64,
}

impl SnapshotWriter {
    pub fn new(output_dir: &Path, interval_ticks: u64) -> Self {
        Self {
            output_dir: output_dir.to_path_buf(),
            interval_ticks,
        }
    }

    pub fn maybe_write(&self, canopy: &Canopy, scenario_name: &str) -> Result<Option<PathBuf>> {
        let tick = canopy.tick();
        if self.interval_ticks == 0 || tick == 0 || tick % self.interval_ticks != 0 {
            return Ok(None);
        }
        let dir = self.output_dir.join(scenario_name);
        fs::create_dir_all(&dir)
            .with_context(|| format!("creating snapshot directory {}", dir.display()))?;
        let envelope = SnapshotEnvelope {
            captured_at: chrono::Utc::now().to_rfc3339(),
            canopy: canopy.snapshot(scenario_name),
        };
        let json = serde_json::to_string_pretty(&envelope).context("serializing snapshot")?;
        let file_path = dir.join(format!("tick_{tick:06}.json"));
        fs::write(&file_path, json)
            .with_context(|| format!("writing snapshot {}", file_path.display()))?;
        Ok(Some(file_path))
    }
}
