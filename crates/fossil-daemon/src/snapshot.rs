// crates/fossil-daemon/src/snapshot.rs
//
// JSON snapshots of the whole deployment, so a restarted keeper resumes
// with the same balances, deposits, and distribution checkpoint.

use std::fs;
use std::path::Path;

use fossil_core::FossilError;
use fossil_economics::Deployment;

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is not a valid deployment: {0}")]
    Ledger(#[from] FossilError),
}

/// Read a snapshot. Returns `Ok(None)` when no snapshot exists yet.
pub fn load(path: &Path) -> Result<Option<Deployment>, SnapshotError> {
    if !path.exists() {
        return Ok(None);
    }
    let json = fs::read_to_string(path)?;
    let deployment = Deployment::from_json(&json)?;
    tracing::info!("Restored deployment snapshot from {}", path.display());
    Ok(Some(deployment))
}

/// Write a snapshot, creating parent directories as needed.
pub fn save(path: &Path, deployment: &Deployment) -> Result<(), SnapshotError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let json = deployment.to_json()?;
    // Write then rename; the file at `path` is always a complete snapshot.
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)?;
    fs::rename(&tmp, path)?;
    tracing::info!("Wrote deployment snapshot to {}", path.display());
    Ok(())
}
