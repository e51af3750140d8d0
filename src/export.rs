//! Tabular export of every vote
//!
//! One row per vote, most recent first, written as CSV with a fixed header.

use crate::{Result, storage_error};
use crate::store::EntityStore;
use crate::types::VoteRecord;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::sync::Arc;

/// CSV header row
pub const CSV_HEADER: [&str; 5] = ["Voter UID", "Voter Name", "Candidate", "Party", "Timestamp"];

/// Timestamp layout used in exported rows
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One exported vote
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExportRow {
    pub voter_uid: String,
    pub voter_name: String,
    pub candidate_name: String,
    pub candidate_party: String,
    pub timestamp: String,
}

impl From<&VoteRecord> for ExportRow {
    fn from(record: &VoteRecord) -> Self {
        Self {
            voter_uid: record.voter.uid.clone(),
            voter_name: record.voter.name.clone(),
            candidate_name: record.candidate.name.clone(),
            candidate_party: record.candidate.party.clone(),
            timestamp: record.vote.timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }
}

/// Write `rows` as CSV, header first; the header is written even when there
/// are no rows
pub fn write_csv<W: Write>(rows: &[ExportRow], writer: W) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);
    out.write_record(CSV_HEADER)?;
    for row in rows {
        out.serialize(row)?;
    }
    out.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Builds export rows from an [`EntityStore`]
#[derive(Clone)]
pub struct Exporter {
    store: Arc<dyn EntityStore>,
    file_name: String,
}

impl Exporter {
    pub fn new(store: Arc<dyn EntityStore>, file_name: impl Into<String>) -> Self {
        Self {
            store,
            file_name: file_name.into(),
        }
    }

    /// Suggested download name
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Every vote as a row, most recent first
    pub fn rows(&self) -> Result<Vec<ExportRow>> {
        Ok(self
            .store
            .vote_records()?
            .iter()
            .map(ExportRow::from)
            .collect())
    }

    /// Write every vote as CSV
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<()> {
        let rows = self.rows()?;
        write_csv(&rows, writer)?;
        tracing::info!("📤 Exported {} vote rows", rows.len());
        Ok(())
    }

    /// CSV document as a string
    pub fn to_csv_string(&self) -> Result<String> {
        let mut buffer = Vec::new();
        self.write_csv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| storage_error!("CSV output is not UTF-8: {}", e))
    }
}
