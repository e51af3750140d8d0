//! Error handling for the voting ledger

use crate::store::StoreError;

/// Result type alias for the voting ledger
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the voting ledger
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Required caller input was absent or blank
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// Caller input was present but unusable
    #[error("Invalid value for {field}: {reason}")]
    InvalidField { field: String, reason: String },

    /// The referenced candidate does not exist
    #[error("Candidate not found: {candidate_id}")]
    CandidateNotFound { candidate_id: String },

    /// The voter already has a committed vote
    #[error("Voter {voter_name} has already cast their vote")]
    AlreadyVoted {
        voter_uid: String,
        voter_name: String,
    },

    /// Unexpected storage problem; no vote was committed
    #[error("Storage failure: {message}")]
    StorageFailure { message: String },

    /// Tabular export errors
    #[error("Export error: {0}")]
    Export(#[from] csv::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },
}

/// How a caller should present an error to the person who triggered it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Input problem; ask again
    Reprompt,
    /// Expected business-rule outcome, not a fault
    Informational,
    /// Unexpected failure; report generically and log
    Fault,
}

impl Error {
    /// Create a new missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
        }
    }

    /// Create a new invalid field error
    pub fn invalid_field(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a new candidate lookup error
    pub fn candidate_not_found(candidate_id: impl ToString) -> Self {
        Self::CandidateNotFound {
            candidate_id: candidate_id.to_string(),
        }
    }

    /// Create a new storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::StorageFailure {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Classify the error for presentation
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::MissingField { .. }
            | Self::InvalidField { .. }
            | Self::CandidateNotFound { .. } => ErrorClass::Reprompt,
            Self::AlreadyVoted { .. } => ErrorClass::Informational,
            Self::StorageFailure { .. }
            | Self::Export(_)
            | Self::Serialization(_)
            | Self::Config { .. } => ErrorClass::Fault,
        }
    }

    /// True for the duplicate-vote rejection
    pub fn is_already_voted(&self) -> bool {
        matches!(self, Self::AlreadyVoted { .. })
    }
}

impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        Self::storage(err.to_string())
    }
}

/// Convenience macros for creating specific error types
#[macro_export]
macro_rules! storage_error {
    ($msg:expr) => {
        $crate::Error::storage($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::storage(format!($fmt, $($arg)*))
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr) => {
        $crate::Error::config($msg)
    };
    ($fmt:expr, $($arg:tt)*) => {
        $crate::Error::config(format!($fmt, $($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let missing = Error::missing_field("voter_uid");
        assert!(matches!(missing, Error::MissingField { .. }));

        let not_found = Error::candidate_not_found("42");
        assert!(matches!(not_found, Error::CandidateNotFound { .. }));
        assert_eq!(not_found.to_string(), "Candidate not found: 42");

        let storage = Error::storage("disk full");
        assert!(matches!(storage, Error::StorageFailure { .. }));
    }

    #[test]
    fn test_error_macros() {
        let storage = storage_error!("table {} locked", "votes");
        assert_eq!(storage.to_string(), "Storage failure: table votes locked");

        let config = config_error!("bad value");
        assert!(matches!(config, Error::Config { .. }));
    }

    #[test]
    fn test_error_classes() {
        assert_eq!(Error::missing_field("x").class(), ErrorClass::Reprompt);
        assert_eq!(Error::invalid_field("x", "too long").class(), ErrorClass::Reprompt);
        assert_eq!(Error::candidate_not_found("x").class(), ErrorClass::Reprompt);
        assert_eq!(Error::storage("x").class(), ErrorClass::Fault);

        let already = Error::AlreadyVoted {
            voter_uid: "V1".to_string(),
            voter_name: "Ada".to_string(),
        };
        assert_eq!(already.class(), ErrorClass::Informational);
        assert!(already.is_already_voted());
        assert_eq!(already.to_string(), "Voter Ada has already cast their vote");
    }

    #[test]
    fn test_store_errors_become_storage_failures() {
        let err: Error = StoreError::Poisoned.into();
        assert!(matches!(err, Error::StorageFailure { .. }));
    }
}
