//! Voting system facade
//!
//! Wires one shared [`MemoryStore`] into the ledger, the aggregator, the
//! chart series adapter and the exporter.

use crate::aggregation::Aggregator;
use crate::config::Config;
use crate::export::Exporter;
use crate::ledger::VoteLedger;
use crate::series::SeriesAdapter;
use crate::store::{Clock, EntityStore, MemoryStore, SystemClock};
use crate::{Error, Result};
use std::sync::Arc;

pub struct VotingSystem {
    config: Config,
    store: Arc<MemoryStore>,
    ledger: VoteLedger,
    aggregator: Aggregator,
    series: SeriesAdapter,
    exporter: Exporter,
}

impl VotingSystem {
    /// Build a system over an empty store
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build a system whose timestamps come from `clock`
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(MemoryStore::with_clock(clock));
        let shared: Arc<dyn EntityStore> = store.clone();

        let ledger = VoteLedger::new(shared.clone(), config.ledger.clone());
        let aggregator = Aggregator::new(shared.clone());
        let series = SeriesAdapter::new(
            aggregator.clone(),
            config.reporting.no_data_message.clone(),
        );
        let exporter = Exporter::new(shared, config.reporting.export_file_name.clone());

        Self {
            config,
            store,
            ledger,
            aggregator,
            series,
            exporter,
        }
    }

    /// Build a system and restore the configured snapshot, if one exists
    pub async fn open(config: Config) -> Result<Self> {
        let system = Self::new(config);
        if let Some(path) = &system.config.storage.snapshot_path {
            let exists = tokio::fs::try_exists(path)
                .await
                .map_err(|e| Error::storage(format!("cannot stat {}: {e}", path.display())))?;
            if exists {
                system.store.restore_snapshot(path).await?;
            } else {
                tracing::info!("📂 No snapshot at {}, starting empty", path.display());
            }
        }
        Ok(system)
    }

    /// Test system with default settings
    pub fn for_testing() -> Result<Self> {
        Ok(Self::new(Config::for_testing()?))
    }

    /// Write the store to the configured snapshot path; no-op without one
    pub async fn persist(&self) -> Result<bool> {
        match &self.config.storage.snapshot_path {
            Some(path) => {
                self.store.save_snapshot(path).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn ledger(&self) -> &VoteLedger {
        &self.ledger
    }

    pub fn aggregator(&self) -> &Aggregator {
        &self.aggregator
    }

    pub fn series(&self) -> &SeriesAdapter {
        &self.series
    }

    pub fn exporter(&self) -> &Exporter {
        &self.exporter
    }
}
