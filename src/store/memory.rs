//! In-process entity store
//!
//! All tables live behind one `RwLock`. Writers hold the write guard for the
//! whole of a check-then-insert, which is what makes the unique indexes hold
//! under concurrent callers.

use super::snapshot::Rows;
use super::{
    CANDIDATE_PK, Clock, EntityStore, StoreError, StoreResult, SystemClock, VOTE_CANDIDATE_FK,
    VOTE_PK, VOTE_VOTER_FK, VOTE_VOTER_UNIQUE, VOTER_PK, VOTER_UID_UNIQUE,
};
use crate::types::{Candidate, CandidateId, Vote, VoteId, VoteRecord, Voter, VoterId};
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// Rows in insertion order, addressed by primary key
#[derive(Debug)]
struct Table<K, T> {
    rows: BTreeMap<u64, T>,
    keys: HashMap<K, u64>,
    next_seq: u64,
    pk: &'static str,
}

impl<K: Eq + Hash, T> Table<K, T> {
    fn new(pk: &'static str) -> Self {
        Self {
            rows: BTreeMap::new(),
            keys: HashMap::new(),
            next_seq: 0,
            pk,
        }
    }

    fn get(&self, key: &K) -> Option<&T> {
        self.keys.get(key).and_then(|seq| self.rows.get(seq))
    }

    fn contains(&self, key: &K) -> bool {
        self.keys.contains_key(key)
    }

    fn insert(&mut self, key: K, row: T) -> StoreResult<()> {
        if self.keys.contains_key(&key) {
            return Err(StoreError::UniqueViolation {
                constraint: self.pk,
            });
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.keys.insert(key, seq);
        self.rows.insert(seq, row);
        Ok(())
    }

    fn remove(&mut self, key: &K) -> Option<T> {
        let seq = self.keys.remove(key)?;
        self.rows.remove(&seq)
    }

    /// Rows, oldest insert first
    fn values(&self) -> impl DoubleEndedIterator<Item = &T> {
        self.rows.values()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Rows plus the indexes that back the store's constraints
#[derive(Debug)]
pub(crate) struct Tables {
    candidates: Table<CandidateId, Candidate>,
    voters: Table<VoterId, Voter>,
    votes: Table<VoteId, Vote>,
    voter_uids: HashMap<String, VoterId>,
    voted: HashMap<VoterId, VoteId>,
}

impl Default for Tables {
    fn default() -> Self {
        Self {
            candidates: Table::new(CANDIDATE_PK),
            voters: Table::new(VOTER_PK),
            votes: Table::new(VOTE_PK),
            voter_uids: HashMap::new(),
            voted: HashMap::new(),
        }
    }
}

impl Tables {
    fn voter_by_uid(&self, uid: &str) -> Option<&Voter> {
        self.voter_uids.get(uid).and_then(|id| self.voters.get(id))
    }

    pub(crate) fn push_candidate(&mut self, candidate: Candidate) -> StoreResult<()> {
        self.candidates.insert(candidate.id, candidate)
    }

    pub(crate) fn push_voter(&mut self, voter: Voter) -> StoreResult<()> {
        if self.voter_uids.contains_key(&voter.uid) {
            return Err(StoreError::UniqueViolation {
                constraint: VOTER_UID_UNIQUE,
            });
        }
        let (id, uid) = (voter.id, voter.uid.clone());
        self.voters.insert(id, voter)?;
        self.voter_uids.insert(uid, id);
        Ok(())
    }

    pub(crate) fn push_vote(&mut self, vote: Vote) -> StoreResult<()> {
        if !self.voters.contains(&vote.voter_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: VOTE_VOTER_FK,
            });
        }
        if !self.candidates.contains(&vote.candidate_id) {
            return Err(StoreError::ForeignKeyViolation {
                constraint: VOTE_CANDIDATE_FK,
            });
        }
        if self.voted.contains_key(&vote.voter_id) {
            return Err(StoreError::UniqueViolation {
                constraint: VOTE_VOTER_UNIQUE,
            });
        }
        let (id, voter_id) = (vote.id, vote.voter_id);
        self.votes.insert(id, vote)?;
        self.voted.insert(voter_id, id);
        Ok(())
    }

    /// Drop the votes cast for `candidate_id`, freeing each voter's slot
    fn remove_votes_for(&mut self, candidate_id: &CandidateId) {
        let doomed: Vec<(VoteId, VoterId)> = self
            .votes
            .values()
            .filter(|vote| vote.candidate_id == *candidate_id)
            .map(|vote| (vote.id, vote.voter_id))
            .collect();
        for (vote_id, voter_id) in doomed {
            self.votes.remove(&vote_id);
            self.voted.remove(&voter_id);
        }
    }

    pub(crate) fn rows(&self) -> Rows {
        Rows {
            candidates: self.candidates.values().cloned().collect(),
            voters: self.voters.values().cloned().collect(),
            votes: self.votes.values().cloned().collect(),
        }
    }

    /// Rebuild tables from raw rows, re-checking every constraint
    pub(crate) fn from_rows(rows: Rows) -> StoreResult<Self> {
        let mut tables = Self::default();
        for candidate in rows.candidates {
            tables.push_candidate(candidate)?;
        }
        for voter in rows.voters {
            tables.push_voter(voter)?;
        }
        for vote in rows.votes {
            tables.push_vote(vote)?;
        }
        Ok(tables)
    }
}

/// [`EntityStore`] kept in process memory
pub struct MemoryStore {
    tables: RwLock<Tables>,
    clock: Arc<dyn Clock>,
}

impl MemoryStore {
    /// Create an empty store stamped by the wall clock
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Create an empty store stamped by `clock`
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
            clock,
        }
    }

    pub(crate) fn read(&self) -> StoreResult<RwLockReadGuard<'_, Tables>> {
        self.tables.read().map_err(|_| StoreError::Poisoned)
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Tables>> {
        self.tables.write().map_err(|_| StoreError::Poisoned)
    }

    /// Replace every table with `tables`
    pub(crate) fn replace(&self, tables: Tables) -> StoreResult<()> {
        *self.write()? = tables;
        Ok(())
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityStore for MemoryStore {
    fn insert_candidate(&self, name: &str, party: &str) -> StoreResult<Candidate> {
        let candidate = Candidate {
            id: Uuid::new_v4(),
            name: name.to_string(),
            party: party.to_string(),
            created_at: self.clock.now(),
        };
        self.write()?.push_candidate(candidate.clone())?;
        Ok(candidate)
    }

    fn candidate(&self, id: &CandidateId) -> StoreResult<Option<Candidate>> {
        Ok(self.read()?.candidates.get(id).cloned())
    }

    fn candidates(&self) -> StoreResult<Vec<Candidate>> {
        let mut candidates: Vec<Candidate> = self.read()?.candidates.values().cloned().collect();
        candidates.sort_by(|a, b| a.name.cmp(&b.name).then(a.created_at.cmp(&b.created_at)));
        Ok(candidates)
    }

    fn delete_candidate(&self, id: &CandidateId) -> StoreResult<Option<Candidate>> {
        let mut tables = self.write()?;
        let Some(candidate) = tables.candidates.remove(id) else {
            return Ok(None);
        };
        tables.remove_votes_for(id);
        Ok(Some(candidate))
    }

    fn get_or_create_voter(&self, uid: &str, name: &str) -> StoreResult<(Voter, bool)> {
        let mut tables = self.write()?;
        if let Some(existing) = tables.voter_by_uid(uid) {
            return Ok((existing.clone(), false));
        }

        let voter = Voter {
            id: Uuid::new_v4(),
            uid: uid.to_string(),
            name: name.to_string(),
            registered_on: self.clock.now(),
        };
        tables.push_voter(voter.clone())?;
        Ok((voter, true))
    }

    fn voter_by_uid(&self, uid: &str) -> StoreResult<Option<Voter>> {
        Ok(self.read()?.voter_by_uid(uid).cloned())
    }

    fn voters(&self) -> StoreResult<Vec<Voter>> {
        let mut voters: Vec<Voter> = self.read()?.voters.values().rev().cloned().collect();
        voters.sort_by(|a, b| b.registered_on.cmp(&a.registered_on));
        Ok(voters)
    }

    fn delete_voter(&self, id: &VoterId) -> StoreResult<Option<Voter>> {
        let mut tables = self.write()?;
        let Some(voter) = tables.voters.remove(id) else {
            return Ok(None);
        };
        tables.voter_uids.remove(&voter.uid);
        if let Some(vote_id) = tables.voted.remove(&voter.id) {
            tables.votes.remove(&vote_id);
        }
        Ok(Some(voter))
    }

    fn insert_vote(&self, voter_id: &VoterId, candidate_id: &CandidateId) -> StoreResult<Vote> {
        let mut tables = self.write()?;
        let vote = Vote {
            id: Uuid::new_v4(),
            voter_id: *voter_id,
            candidate_id: *candidate_id,
            timestamp: self.clock.now(),
        };
        tables.push_vote(vote.clone())?;
        Ok(vote)
    }

    fn vote_by_voter(&self, voter_id: &VoterId) -> StoreResult<Option<Vote>> {
        let tables = self.read()?;
        let Some(vote_id) = tables.voted.get(voter_id) else {
            return Ok(None);
        };
        Ok(tables.votes.get(vote_id).cloned())
    }

    fn vote_count(&self) -> StoreResult<u64> {
        Ok(self.read()?.votes.len() as u64)
    }

    fn vote_counts(&self) -> StoreResult<HashMap<CandidateId, u64>> {
        let tables = self.read()?;
        let mut counts = HashMap::new();
        for vote in tables.votes.values() {
            *counts.entry(vote.candidate_id).or_insert(0) += 1;
        }
        Ok(counts)
    }

    fn vote_timestamps(&self) -> StoreResult<Vec<DateTime<Utc>>> {
        let mut timestamps: Vec<_> = self.read()?.votes.values().map(|v| v.timestamp).collect();
        timestamps.sort();
        Ok(timestamps)
    }

    fn vote_records(&self) -> StoreResult<Vec<VoteRecord>> {
        let tables = self.read()?;
        let mut records: Vec<VoteRecord> = tables
            .votes
            .values()
            .rev()
            .filter_map(|vote| {
                Some(VoteRecord {
                    vote: vote.clone(),
                    voter: tables.voters.get(&vote.voter_id)?.clone(),
                    candidate: tables.candidates.get(&vote.candidate_id)?.clone(),
                })
            })
            .collect();
        records.sort_by(|a, b| b.vote.timestamp.cmp(&a.vote.timestamp));
        Ok(records)
    }
}
