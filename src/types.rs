//! # Core Types for the Voting Ledger
//!
//! This module defines the persisted entities (candidates, voters, votes) and
//! the explicit result records produced by the aggregation read path.
//!
//! ## Type Categories
//!
//! ### Entities
//! - [`Candidate`]: A person on the ballot and their party
//! - [`Voter`]: A registered voter, recognised by an external `uid`
//! - [`Vote`]: The single vote a voter may ever cast
//! - [`VoteRecord`]: A vote with its voter and candidate resolved
//!
//! ### Derived Results
//! - [`CandidateTally`]: Vote count (and optional share) per candidate
//! - [`ResultsSummary`]: Total votes plus the percentage-bearing tally
//! - [`CandidateStatistics`]: Mean and median votes per candidate
//! - [`PartyTally`]: Votes rolled up by party
//! - [`DailyVotes`]: Votes bucketed by calendar date
//!
//! ## Usage Examples
//!
//! ```rust
//! use votes::types::{Candidate, CandidateTally};
//! use chrono::Utc;
//! use uuid::Uuid;
//!
//! let candidate = Candidate {
//!     id: Uuid::new_v4(),
//!     name: "Ada Lovelace".to_string(),
//!     party: "Analytical".to_string(),
//!     created_at: Utc::now(),
//! };
//!
//! let tally = CandidateTally::new(candidate, 3);
//! assert_eq!(tally.vote_count, 3);
//! assert!(tally.percentage.is_none());
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generated identity of a [`Candidate`]
pub type CandidateId = Uuid;

/// Generated identity of a [`Voter`]
pub type VoterId = Uuid;

/// Generated identity of a [`Vote`]
pub type VoteId = Uuid;

/// Maximum length of a candidate name
pub const CANDIDATE_NAME_MAX_LEN: usize = 200;

/// Maximum length of a party name
pub const PARTY_NAME_MAX_LEN: usize = 100;

/// Maximum length of a voter external identifier
pub const VOTER_UID_MAX_LEN: usize = 50;

/// Maximum length of a voter display name
pub const VOTER_NAME_MAX_LEN: usize = 200;

/// A candidate standing in the vote
///
/// Duplicate `(name, party)` pairs are legal. Listings order candidates by
/// `name`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Candidate {
    pub id: CandidateId,

    /// Display name, non-empty
    pub name: String,

    /// Party affiliation, non-empty
    pub party: String,

    /// Server-assigned creation time
    pub created_at: DateTime<Utc>,
}

impl std::fmt::Display for Candidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.party)
    }
}

/// A registered voter
///
/// `uid` is the caller-supplied external identifier and is unique across all
/// voters. Listings show the most recently registered voter first.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Voter {
    pub id: VoterId,

    /// External identifier used to recognise a returning voter
    pub uid: String,

    /// Display name
    pub name: String,

    /// Server-assigned registration time
    pub registered_on: DateTime<Utc>,
}

impl std::fmt::Display for Voter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} (UID: {})", self.name, self.uid)
    }
}

/// A committed vote
///
/// At most one `Vote` exists per voter. Votes are never updated; they only
/// disappear when their voter or candidate is deleted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vote {
    pub id: VoteId,
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,

    /// Server-assigned cast time
    pub timestamp: DateTime<Utc>,
}

/// A vote with its voter and candidate attached
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VoteRecord {
    pub vote: Vote,
    pub voter: Voter,
    pub candidate: Candidate,
}

impl std::fmt::Display for VoteRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} voted for {}", self.voter.name, self.candidate.name)
    }
}

/// Vote count for a single candidate
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CandidateTally {
    pub candidate: Candidate,
    pub vote_count: u64,

    /// Share of all votes, rounded to two decimals; only set by
    /// [`crate::aggregation::Aggregator::results_summary`]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<f64>,
}

impl CandidateTally {
    pub fn new(candidate: Candidate, vote_count: u64) -> Self {
        Self {
            candidate,
            vote_count,
            percentage: None,
        }
    }
}

/// Results page payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultsSummary {
    pub total_votes: u64,

    /// Every candidate, zero-vote ones included, with `percentage` set
    pub tallies: Vec<CandidateTally>,
}

/// Descriptive statistics over per-candidate vote counts
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CandidateStatistics {
    pub mean_votes: f64,
    pub median_votes: f64,
    pub total_candidates: usize,
}

/// Votes summed over every candidate of one party
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PartyTally {
    pub party: String,
    pub total_votes: u64,
}

/// Votes cast on one calendar date
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyVotes {
    pub date: NaiveDate,
    pub vote_count: u64,
}
