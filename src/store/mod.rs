//! Entity storage for candidates, voters and votes
//!
//! [`EntityStore`] is the seam between the ledger/aggregation code and a
//! backend. Backends own the integrity rules of the persisted layout:
//!
//! - every row id is unique ([`CANDIDATE_PK`], [`VOTER_PK`], [`VOTE_PK`])
//! - `voter.uid` is unique ([`VOTER_UID_UNIQUE`])
//! - `vote.voter_id` is unique ([`VOTE_VOTER_UNIQUE`]), so at most one vote
//!   per voter can ever be committed, no matter how many writers race
//! - `vote.voter_id` and `vote.candidate_id` must reference existing rows
//!   ([`VOTE_VOTER_FK`], [`VOTE_CANDIDATE_FK`])
//! - deleting a voter or candidate deletes the votes that reference it

pub mod memory;
pub mod snapshot;

use crate::types::{Candidate, CandidateId, Vote, VoteRecord, Voter, VoterId};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

pub use memory::MemoryStore;

/// Primary key of the candidate table
pub const CANDIDATE_PK: &str = "candidate_pk";

/// Primary key of the voter table
pub const VOTER_PK: &str = "voter_pk";

/// Primary key of the vote table
pub const VOTE_PK: &str = "vote_pk";

/// Unique index on the voter external identifier
pub const VOTER_UID_UNIQUE: &str = "voter_uid_unique";

/// Unique index on the voter a vote belongs to
pub const VOTE_VOTER_UNIQUE: &str = "vote_voter_unique";

/// Foreign key from a vote to its voter
pub const VOTE_VOTER_FK: &str = "vote_voter_fk";

/// Foreign key from a vote to its candidate
pub const VOTE_CANDIDATE_FK: &str = "vote_candidate_fk";

/// Result type alias for storage operations
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a storage backend
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("unique constraint `{constraint}` violated")]
    UniqueViolation { constraint: &'static str },

    #[error("foreign key constraint `{constraint}` violated")]
    ForeignKeyViolation { constraint: &'static str },

    #[error("store lock poisoned")]
    Poisoned,

    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("snapshot is malformed: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("snapshot checksum mismatch: expected {expected}, found {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported snapshot version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl StoreError {
    /// True when `constraint` is the violated unique index
    pub fn violates_unique(&self, constraint: &str) -> bool {
        matches!(self, Self::UniqueViolation { constraint: c } if *c == constraint)
    }

    /// True when `constraint` is the violated foreign key
    pub fn violates_foreign_key(&self, constraint: &str) -> bool {
        matches!(self, Self::ForeignKeyViolation { constraint: c } if *c == constraint)
    }
}

/// Source of server-assigned timestamps
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Jump to an absolute instant
    pub fn set(&self, instant: DateTime<Utc>) {
        if let Ok(mut now) = self.now.lock() {
            *now = instant;
        }
    }

    /// Move forward by `delta`
    pub fn advance(&self, delta: chrono::Duration) {
        if let Ok(mut now) = self.now.lock() {
            *now += delta;
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}

/// Storage operations the voting core relies on.
///
/// Every write runs as a single atomic step against the backend, and every
/// constraint listed in the module docs is checked inside that step.
pub trait EntityStore: Send + Sync {
    /// Insert a candidate with a server-assigned id and `created_at`.
    fn insert_candidate(&self, name: &str, party: &str) -> StoreResult<Candidate>;

    fn candidate(&self, id: &CandidateId) -> StoreResult<Option<Candidate>>;

    /// All candidates ordered by name.
    fn candidates(&self) -> StoreResult<Vec<Candidate>>;

    /// Remove a candidate and every vote cast for it.
    fn delete_candidate(&self, id: &CandidateId) -> StoreResult<Option<Candidate>>;

    /// Fetch the voter with `uid`, or create it named `name`.
    ///
    /// The lookup and the insert form one atomic step. The flag is `true`
    /// when this call created the voter.
    fn get_or_create_voter(&self, uid: &str, name: &str) -> StoreResult<(Voter, bool)>;

    fn voter_by_uid(&self, uid: &str) -> StoreResult<Option<Voter>>;

    /// All voters, most recently registered first.
    fn voters(&self) -> StoreResult<Vec<Voter>>;

    /// Remove a voter and their vote.
    fn delete_voter(&self, id: &VoterId) -> StoreResult<Option<Voter>>;

    /// Commit a vote with a server-assigned timestamp.
    ///
    /// # Errors
    ///
    /// [`StoreError::UniqueViolation`] on [`VOTE_VOTER_UNIQUE`] when the
    /// voter already has a vote, [`StoreError::ForeignKeyViolation`] when
    /// either reference is dangling.
    fn insert_vote(&self, voter_id: &VoterId, candidate_id: &CandidateId) -> StoreResult<Vote>;

    fn vote_by_voter(&self, voter_id: &VoterId) -> StoreResult<Option<Vote>>;

    fn vote_count(&self) -> StoreResult<u64>;

    /// Votes per candidate id; candidates without votes are absent.
    fn vote_counts(&self) -> StoreResult<HashMap<CandidateId, u64>>;

    /// Cast times of every vote, oldest first.
    fn vote_timestamps(&self) -> StoreResult<Vec<DateTime<Utc>>>;

    /// Every vote joined with its voter and candidate, most recent first.
    fn vote_records(&self) -> StoreResult<Vec<VoteRecord>>;
}
