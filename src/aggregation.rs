//! Read-side aggregation over the ledger
//!
//! Every call recomputes from current store content; nothing is cached
//! between calls. Empty ledgers produce zero/empty results, never errors.

use crate::Result;
use crate::store::EntityStore;
use crate::types::{CandidateStatistics, CandidateTally, DailyVotes, PartyTally, ResultsSummary};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Round to two decimal places, ties to even on the exact binary value
///
/// `{:.2}` formatting is correctly rounded, so `0.125` becomes `0.12` and
/// `2.675` (stored just below the half) becomes `2.67`.
pub fn round2(value: f64) -> f64 {
    format!("{value:.2}").parse().unwrap_or(value)
}

/// Arithmetic mean; `0` for an empty set
pub fn mean(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().map(|&v| v as f64).sum::<f64>() / values.len() as f64
}

/// Median (mean of the two middle values for even-sized sets); `0` for an
/// empty set
pub fn median(values: &[u64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Share of `count` in `total` as a percentage rounded to two decimals
pub fn percentage(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    round2(count as f64 / total as f64 * 100.0)
}

/// Data behind the trend chart
#[derive(Debug, Clone, PartialEq)]
pub enum Trend {
    /// Votes on two or more distinct dates
    Daily(Vec<DailyVotes>),
    /// Votes all fall on one date; candidates with votes, in tally order
    ByCandidate(Vec<CandidateTally>),
    /// No votes at all
    Empty,
}

/// Computes tallies and statistics from an [`EntityStore`]
#[derive(Clone)]
pub struct Aggregator {
    store: Arc<dyn EntityStore>,
}

impl Aggregator {
    pub fn new(store: Arc<dyn EntityStore>) -> Self {
        Self { store }
    }

    /// Every candidate with its vote count, zero-vote candidates included.
    ///
    /// Sorted by vote count descending, then name ascending. Every chart and
    /// the results page use this order.
    pub fn tally_by_candidate(&self) -> Result<Vec<CandidateTally>> {
        let candidates = self.store.candidates()?;
        let counts = self.store.vote_counts()?;

        let mut tallies: Vec<CandidateTally> = candidates
            .into_iter()
            .map(|candidate| {
                let count = counts.get(&candidate.id).copied().unwrap_or(0);
                CandidateTally::new(candidate, count)
            })
            .collect();
        tallies.sort_by(|a, b| {
            b.vote_count
                .cmp(&a.vote_count)
                .then_with(|| a.candidate.name.cmp(&b.candidate.name))
        });
        Ok(tallies)
    }

    /// Total votes and the tally with each candidate's percentage
    pub fn results_summary(&self) -> Result<ResultsSummary> {
        let total_votes = self.store.vote_count()?;
        let tallies = self
            .tally_by_candidate()?
            .into_iter()
            .map(|tally| CandidateTally {
                percentage: Some(percentage(tally.vote_count, total_votes)),
                ..tally
            })
            .collect();

        Ok(ResultsSummary {
            total_votes,
            tallies,
        })
    }

    /// Mean and median votes per candidate, zero-vote candidates included
    pub fn candidate_statistics(&self) -> Result<CandidateStatistics> {
        let counts: Vec<u64> = self
            .tally_by_candidate()?
            .iter()
            .map(|t| t.vote_count)
            .collect();

        let stats = CandidateStatistics {
            mean_votes: round2(mean(&counts)),
            median_votes: round2(median(&counts)),
            total_candidates: counts.len(),
        };
        tracing::debug!(
            "📊 Candidate statistics: mean={}, median={}, candidates={}",
            stats.mean_votes,
            stats.median_votes,
            stats.total_candidates
        );
        Ok(stats)
    }

    /// Votes summed per party, largest first (ties by party name).
    ///
    /// A party whose candidates have no votes is reported with zero.
    pub fn tally_by_party(&self) -> Result<Vec<PartyTally>> {
        let mut totals: HashMap<String, u64> = HashMap::new();
        for tally in self.tally_by_candidate()? {
            *totals.entry(tally.candidate.party).or_insert(0) += tally.vote_count;
        }

        let mut parties: Vec<PartyTally> = totals
            .into_iter()
            .map(|(party, total_votes)| PartyTally { party, total_votes })
            .collect();
        parties.sort_by(|a, b| {
            b.total_votes
                .cmp(&a.total_votes)
                .then_with(|| a.party.cmp(&b.party))
        });
        Ok(parties)
    }

    /// Votes bucketed by UTC calendar date, oldest first
    pub fn votes_over_time(&self) -> Result<Vec<DailyVotes>> {
        let mut buckets: BTreeMap<_, u64> = BTreeMap::new();
        for timestamp in self.store.vote_timestamps()? {
            *buckets.entry(timestamp.date_naive()).or_insert(0) += 1;
        }

        Ok(buckets
            .into_iter()
            .map(|(date, vote_count)| DailyVotes { date, vote_count })
            .collect())
    }

    /// Daily buckets when they span two or more dates, otherwise the
    /// per-candidate distribution of candidates that have votes
    pub fn trend(&self) -> Result<Trend> {
        let daily = self.votes_over_time()?;
        if daily.len() > 1 {
            return Ok(Trend::Daily(daily));
        }

        let with_votes: Vec<CandidateTally> = self
            .tally_by_candidate()?
            .into_iter()
            .filter(|t| t.vote_count > 0)
            .collect();
        if with_votes.is_empty() {
            Ok(Trend::Empty)
        } else {
            Ok(Trend::ByCandidate(with_votes))
        }
    }
}
