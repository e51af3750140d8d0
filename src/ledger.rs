//! Vote ledger: one vote per voter, ever
//!
//! Casting a vote runs these steps:
//! 1. Validate the caller input
//! 2. Resolve or register the voter by external id (atomic get-or-create)
//! 3. Reject voters that already have a vote (`AlreadyVoted`)
//! 4. Resolve the candidate (`CandidateNotFound`)
//! 5. Insert the vote; the store's unique index on the voter is checked on
//!    every insert, so a caller that slipped past step 3 still ends up with
//!    `AlreadyVoted`
//!
//! Voter registration is not rolled back when the vote itself is rejected.

use crate::config::LedgerConfig;
use crate::store::{
    EntityStore, MemoryStore, StoreError, VOTE_CANDIDATE_FK, VOTE_VOTER_UNIQUE, VOTER_UID_UNIQUE,
};
use crate::types::{
    CANDIDATE_NAME_MAX_LEN, Candidate, CandidateId, PARTY_NAME_MAX_LEN, VOTER_NAME_MAX_LEN,
    VOTER_UID_MAX_LEN, Vote, VoteRecord, Voter, VoterId,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Raw vote submission as it arrives from a form
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CastVoteRequest {
    pub voter_uid: Option<String>,
    pub candidate_id: Option<String>,
    pub voter_name: Option<String>,
}

/// Returns the trimmed value, or `MissingField` when it is absent or blank
fn required<'a>(field: &str, value: Option<&'a str>) -> Result<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(Error::missing_field(field)),
    }
}

fn check_len(field: &str, value: &str, max: usize) -> Result<()> {
    if value.chars().count() > max {
        return Err(Error::invalid_field(
            field,
            format!("must be at most {max} characters"),
        ));
    }
    Ok(())
}

/// Accepts votes and registers voters and candidates
pub struct VoteLedger {
    store: Arc<dyn EntityStore>,
    config: LedgerConfig,
}

impl VoteLedger {
    pub fn new(store: Arc<dyn EntityStore>, config: LedgerConfig) -> Self {
        Self { store, config }
    }

    /// Ledger over a fresh in-memory store
    pub fn for_testing() -> Self {
        Self::new(Arc::new(MemoryStore::new()), LedgerConfig::default())
    }

    /// Cast the single vote `voter_uid` is allowed.
    ///
    /// `voter_name` is only used when the voter is registered by this call;
    /// without it a name is synthesized from the uid.
    pub fn cast_vote(
        &self,
        voter_uid: &str,
        candidate_id: &CandidateId,
        voter_name: Option<&str>,
    ) -> Result<VoteRecord> {
        let voter_uid = required("voter_uid", Some(voter_uid))?;
        check_len("voter_uid", voter_uid, VOTER_UID_MAX_LEN)?;

        let voter = self.resolve_voter(voter_uid, voter_name)?;

        let existing = self.store.vote_by_voter(&voter.id).map_err(|e| {
            tracing::error!("❌ Vote lookup failed: voter={}, error={}", voter.uid, e);
            Error::from(e)
        })?;
        if existing.is_some() {
            tracing::warn!("🚫 Duplicate vote rejected: voter={}", voter.uid);
            return Err(already_voted(&voter));
        }

        let candidate = self
            .store
            .candidate(candidate_id)?
            .ok_or_else(|| Error::candidate_not_found(candidate_id))?;

        let vote = self
            .store
            .insert_vote(&voter.id, &candidate.id)
            .map_err(|e| self.translate_insert_error(e, &voter, candidate_id))?;

        tracing::info!(
            "🗳️ Vote recorded: voter={}, candidate={}, vote={}",
            voter.uid,
            candidate.name,
            vote.id
        );

        Ok(VoteRecord {
            vote,
            voter,
            candidate,
        })
    }

    /// Parse a raw form submission and cast it
    pub fn submit(&self, request: &CastVoteRequest) -> Result<VoteRecord> {
        let voter_uid = required("voter_uid", request.voter_uid.as_deref())?;
        let raw_candidate = required("candidate_id", request.candidate_id.as_deref())?;
        let candidate_id =
            Uuid::parse_str(raw_candidate).map_err(|_| Error::candidate_not_found(raw_candidate))?;

        self.cast_vote(voter_uid, &candidate_id, request.voter_name.as_deref())
    }

    fn resolve_voter(&self, uid: &str, voter_name: Option<&str>) -> Result<Voter> {
        if let Some(voter) = self.store.voter_by_uid(uid)? {
            return Ok(voter);
        }

        let name = match voter_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.config.synthesized_voter_name(uid),
        };
        check_len("voter_name", &name, VOTER_NAME_MAX_LEN)?;

        let (voter, created) = match self.store.get_or_create_voter(uid, &name) {
            Ok(resolved) => resolved,
            // Another writer registered the uid first; theirs is authoritative
            Err(e) if e.violates_unique(VOTER_UID_UNIQUE) => {
                let voter = self.store.voter_by_uid(uid)?.ok_or_else(|| Error::from(e))?;
                (voter, false)
            }
            Err(e) => return Err(e.into()),
        };
        if created {
            tracing::info!("📝 Voter registered on vote: uid={}, name={}", voter.uid, voter.name);
        }
        Ok(voter)
    }

    fn translate_insert_error(
        &self,
        err: StoreError,
        voter: &Voter,
        candidate_id: &CandidateId,
    ) -> Error {
        if err.violates_unique(VOTE_VOTER_UNIQUE) {
            tracing::warn!("🚫 Concurrent duplicate vote rejected by store: voter={}", voter.uid);
            already_voted(voter)
        } else if err.violates_foreign_key(VOTE_CANDIDATE_FK) {
            Error::candidate_not_found(candidate_id)
        } else {
            tracing::error!("❌ Vote insert failed: voter={}, error={}", voter.uid, err);
            Error::from(err)
        }
    }

    /// Look up a voter by external id, e.g. to pre-fill a display name
    pub fn voter_by_uid(&self, uid: &str) -> Result<Option<Voter>> {
        Ok(self.store.voter_by_uid(uid)?)
    }

    /// The vote `uid` has cast, if any
    pub fn vote_of(&self, uid: &str) -> Result<Option<Vote>> {
        match self.store.voter_by_uid(uid)? {
            Some(voter) => Ok(self.store.vote_by_voter(&voter.id)?),
            None => Ok(None),
        }
    }

    /// Candidates ordered by name, for populating a ballot
    pub fn candidates(&self) -> Result<Vec<Candidate>> {
        Ok(self.store.candidates()?)
    }

    /// Voters, most recently registered first
    pub fn voters(&self) -> Result<Vec<Voter>> {
        Ok(self.store.voters()?)
    }

    /// Add a candidate to the ballot
    pub fn register_candidate(&self, name: &str, party: &str) -> Result<Candidate> {
        let name = required("name", Some(name))?;
        let party = required("party", Some(party))?;
        check_len("name", name, CANDIDATE_NAME_MAX_LEN)?;
        check_len("party", party, PARTY_NAME_MAX_LEN)?;

        let candidate = self.store.insert_candidate(name, party)?;
        tracing::info!("👤 Candidate added: {}", candidate);
        Ok(candidate)
    }

    /// Register a voter ahead of voting; returns the existing voter when
    /// `uid` is already known
    pub fn register_voter(&self, uid: &str, name: Option<&str>) -> Result<Voter> {
        let uid = required("voter_uid", Some(uid))?;
        check_len("voter_uid", uid, VOTER_UID_MAX_LEN)?;

        self.resolve_voter(uid, name)
    }

    /// Remove a candidate and every vote cast for them
    pub fn remove_candidate(&self, id: &CandidateId) -> Result<Option<Candidate>> {
        let removed = self.store.delete_candidate(id)?;
        if let Some(candidate) = &removed {
            tracing::info!("🗑️ Candidate removed with their votes: {}", candidate);
        }
        Ok(removed)
    }

    /// Remove a voter and their vote
    pub fn remove_voter(&self, id: &VoterId) -> Result<Option<Voter>> {
        let removed = self.store.delete_voter(id)?;
        if let Some(voter) = &removed {
            tracing::info!("🗑️ Voter removed with their vote: {}", voter);
        }
        Ok(removed)
    }
}

fn already_voted(voter: &Voter) -> Error {
    Error::AlreadyVoted {
        voter_uid: voter.uid.clone(),
        voter_name: voter.name.clone(),
    }
}
