//! One-vote-per-voter ledger with tallies, statistics and chart series
//!
//! The ledger guarantees a single committed vote per voter; the read side
//! derives tallies, percentages, party roll-ups, daily trends and export
//! rows from whatever the store currently holds.

pub mod aggregation;
pub mod config;
pub mod errors;
pub mod export;
pub mod ledger;
pub mod series;
pub mod store;
pub mod system;
pub mod types;

// Re-export commonly used types
pub use errors::{Error, ErrorClass, Result};
pub use system::VotingSystem;

use config::LoggingConfig;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize logging with the `RUST_LOG` filter, defaulting to `votes=info`
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "votes=info".into()),
        )
        .try_init()
        .map_err(|e| config_error!("logging already initialized: {}", e))?;

    tracing::info!("🗳️  Voting ledger v{} initialized", VERSION);
    Ok(())
}

/// Initialize logging from configuration; `RUST_LOG` still wins when set
pub fn init_with(logging: &LoggingConfig) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(format!("votes={}", logging.level)))
        .map_err(|e| config_error!("invalid LOG_LEVEL {}: {}", logging.level, e))?;

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let installed = match logging.format.as_str() {
        "compact" => builder.compact().try_init(),
        "pretty" => builder.pretty().try_init(),
        _ => builder.try_init(),
    };
    installed.map_err(|e| config_error!("logging already initialized: {}", e))?;

    tracing::info!(
        "🗳️  Voting ledger v{} initialized (level={}, format={})",
        VERSION,
        logging.level,
        logging.format
    );
    Ok(())
}
