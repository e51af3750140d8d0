//! JSON snapshots of a [`MemoryStore`]
//!
//! The table payload is stored as a JSON string next to a hex-encoded
//! blake3 digest of its bytes. Restoring verifies the digest and then
//! replays the rows through the same constraint checks as live writes.

use super::memory::Tables;
use super::{MemoryStore, StoreError, StoreResult};
use crate::types::{Candidate, Vote, Voter};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

/// Raw table contents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rows {
    pub candidates: Vec<Candidate>,
    pub voters: Vec<Voter>,
    pub votes: Vec<Vote>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    checksum: String,
    payload: String,
}

fn checksum(payload: &str) -> String {
    hex::encode(blake3::hash(payload.as_bytes()).as_bytes())
}

impl MemoryStore {
    /// Write every table to `path`.
    ///
    /// The file is written beside `path` first and renamed into place.
    pub async fn save_snapshot(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let rows = self.read()?.rows();

        let payload = serde_json::to_string(&rows)?;
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            checksum: checksum(&payload),
            payload,
        };
        let bytes = serde_json::to_vec_pretty(&file)?;

        let staging = path.with_extension("tmp");
        tokio::fs::write(&staging, bytes).await?;
        tokio::fs::rename(&staging, path).await?;

        tracing::info!(
            "💾 Snapshot saved: path={}, candidates={}, voters={}, votes={}",
            path.display(),
            rows.candidates.len(),
            rows.voters.len(),
            rows.votes.len()
        );
        Ok(())
    }

    /// Replace every table with the contents of the snapshot at `path`.
    ///
    /// On any error the current tables are left untouched.
    pub async fn restore_snapshot(&self, path: impl AsRef<Path>) -> StoreResult<()> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        let file: SnapshotFile = serde_json::from_slice(&bytes)?;
        if file.version != SNAPSHOT_VERSION {
            tracing::warn!(
                "⚠️ Unsupported snapshot version: path={}, version={}",
                path.display(),
                file.version
            );
            return Err(StoreError::UnsupportedVersion {
                found: file.version,
                expected: SNAPSHOT_VERSION,
            });
        }

        let actual = checksum(&file.payload);
        if actual != file.checksum {
            tracing::warn!("⚠️ Snapshot checksum mismatch: path={}", path.display());
            return Err(StoreError::ChecksumMismatch {
                expected: file.checksum,
                actual,
            });
        }

        let rows: Rows = serde_json::from_str(&file.payload)?;
        let votes = rows.votes.len();
        let tables = Tables::from_rows(rows)?;
        self.replace(tables)?;

        tracing::info!(
            "📂 Snapshot restored: path={}, votes={}",
            path.display(),
            votes
        );
        Ok(())
    }
}
