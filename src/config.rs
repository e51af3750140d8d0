//! Configuration management for the voting ledger
//!
//! Loads settings from environment variables (and a `.env` file when present)
//! with validation.

use crate::{Result, config_error};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Log formats understood by [`crate::init_with`]
pub const LOG_FORMATS: [&str; 3] = ["full", "compact", "pretty"];

/// Vote ledger settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Prefix for the display name synthesized for voters registered without
    /// one (`"{prefix} {uid}"`)
    pub voter_label_prefix: String,
}

impl LedgerConfig {
    /// Display name for a voter who did not supply one
    pub fn synthesized_voter_name(&self, uid: &str) -> String {
        format!("{} {}", self.voter_label_prefix, uid)
    }
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            voter_label_prefix: "Voter".to_string(),
        }
    }
}

/// Settings for the export and chart series adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Message carried by a no-data series
    pub no_data_message: String,

    /// Suggested file name for the CSV export
    pub export_file_name: String,
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            no_data_message: "No votes yet".to_string(),
            export_file_name: "voting_results.csv".to_string(),
        }
    }
}

/// Persistence settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Where the in-memory store is snapshotted; `None` keeps it volatile
    pub snapshot_path: Option<PathBuf>,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ledger: LedgerConfig,
    pub reporting: ReportingConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Load configuration from environment
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let ledger = LedgerConfig {
            voter_label_prefix: env_or("VOTES_VOTER_LABEL_PREFIX", "Voter"),
        };

        let reporting = ReportingConfig {
            no_data_message: env_or("VOTES_NO_DATA_MESSAGE", "No votes yet"),
            export_file_name: env_or("VOTES_EXPORT_FILE_NAME", "voting_results.csv"),
        };

        let storage = StorageConfig {
            snapshot_path: std::env::var("VOTES_SNAPSHOT_PATH")
                .ok()
                .filter(|p| !p.trim().is_empty())
                .map(PathBuf::from),
        };

        let logging = LoggingConfig {
            level: env_or("LOG_LEVEL", "info"),
            format: env_or("LOG_FORMAT", "full"),
        };

        let config = Self {
            ledger,
            reporting,
            storage,
            logging,
        };
        config.validate()?;
        Ok(config)
    }

    /// Create configuration for testing
    pub fn for_testing() -> Result<Self> {
        let config = Self {
            ledger: LedgerConfig::default(),
            reporting: ReportingConfig::default(),
            storage: StorageConfig::default(),
            logging: LoggingConfig {
                level: "debug".to_string(),
                format: "pretty".to_string(),
            },
        };
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the adapters cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.ledger.voter_label_prefix.trim().is_empty() {
            return Err(config_error!("VOTES_VOTER_LABEL_PREFIX must not be empty"));
        }
        if self.reporting.no_data_message.trim().is_empty() {
            return Err(config_error!("VOTES_NO_DATA_MESSAGE must not be empty"));
        }
        if self.reporting.export_file_name.trim().is_empty() {
            return Err(config_error!("VOTES_EXPORT_FILE_NAME must not be empty"));
        }
        if !LOG_FORMATS.contains(&self.logging.format.as_str()) {
            return Err(config_error!(
                "LOG_FORMAT must be one of {:?}, got {}",
                LOG_FORMATS,
                self.logging.format
            ));
        }
        Ok(())
    }
}
