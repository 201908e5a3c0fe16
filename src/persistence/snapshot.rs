use anyhow::{Context, Result};
use atomic_write_file::AtomicWriteFile;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;

use crate::model::{Comparable, Metric, Rating};
use crate::store::Comparison;

pub const SNAPSHOT_VERSION: u32 = 1;

/// Whole comparison in one portable JSON document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SnapshotFile {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub comparables: Vec<Comparable>,
    pub metrics: Vec<Metric>,
    pub rating_matrix: Vec<Vec<Rating>>,
}

impl SnapshotFile {
    pub fn capture(state: &Comparison) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: Utc::now(),
            comparables: state.comparables().to_vec(),
            metrics: state.metrics().to_vec(),
            rating_matrix: state.rating_matrix().to_vec(),
        }
    }

    /// Rebuild the comparison, rejecting snapshots that break its invariants.
    pub fn into_comparison(self) -> Result<Comparison> {
        Comparison::from_parts(self.comparables, self.metrics, self.rating_matrix).map_err(
            |errors| anyhow::anyhow!("Snapshot is inconsistent:\n  - {}", errors.join("\n  - ")),
        )
    }
}

/// Write a snapshot atomically; the target is either fully replaced or untouched.
pub fn save_snapshot(path: &Path, state: &Comparison) -> Result<()> {
    let mut file = AtomicWriteFile::open(path)
        .with_context(|| format!("Failed to open atomic write file at {}", path.display()))?;

    serde_json::to_writer_pretty(&mut file, &SnapshotFile::capture(state))
        .context("Failed to serialize snapshot")?;

    file.commit()
        .with_context(|| format!("Failed to save snapshot to {}", path.display()))?;
    Ok(())
}

/// Read and validate a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<Comparison> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open snapshot at {}", path.display()))?;

    let snapshot: SnapshotFile = serde_json::from_reader(file)
        .with_context(|| format!("Failed to parse snapshot at {}", path.display()))?;

    if snapshot.version != SNAPSHOT_VERSION {
        anyhow::bail!("Unsupported snapshot version: {}", snapshot.version);
    }

    snapshot.into_comparison()
}
