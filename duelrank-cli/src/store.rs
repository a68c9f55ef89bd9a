//! The `__voting_db.json` file kept in the root of every voted-on directory.

use duelrank_core::{ExportOptions, Result, Snapshot, SnapshotSink};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SNAPSHOT_FILE_NAME: &str = "__voting_db.json";

pub fn snapshot_path(dir: &Path) -> PathBuf {
    dir.join(SNAPSHOT_FILE_NAME)
}

/// Read and validate the snapshot in `dir`. `Ok(None)` when there is none yet.
pub fn read_snapshot(dir: &Path) -> Result<Option<Snapshot>> {
    let path = snapshot_path(dir);
    match std::fs::read_to_string(&path) {
        Ok(content) => Snapshot::parse(&content).map(Some),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Like `read_snapshot`, but an unreadable or malformed file is logged and
/// treated as no history.
pub fn load_snapshot(dir: &Path) -> Option<Snapshot> {
    match read_snapshot(dir) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            warn!(
                path = %snapshot_path(dir).display(),
                error = %e,
                "ignoring unreadable voting history"
            );
            None
        }
    }
}

/// Writes snapshots to `__voting_db.json`, attaching the export fit (ratings
/// and buckets) each time.
pub struct JsonFileSink {
    path: PathBuf,
    export: ExportOptions,
}

impl JsonFileSink {
    pub fn new(dir: &Path, export: ExportOptions) -> Self {
        JsonFileSink {
            path: snapshot_path(dir),
            export,
        }
    }
}

impl SnapshotSink for JsonFileSink {
    fn write(&mut self, snapshot: &Snapshot) -> Result<()> {
        let exported = snapshot.clone().with_export_fit(&self.export, &mut rand::rng())?;
        std::fs::write(&self.path, exported.to_json_pretty()?)?;
        debug!(path = %self.path.display(), votes = exported.votes.len(), "voting history saved");
        Ok(())
    }
}
