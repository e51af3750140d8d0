//! Label/value series for the chart renderer
//!
//! Series are shaped straight from [`Aggregator`] output. Where a chart would
//! have nothing meaningful to draw, the series carries
//! [`SeriesData::NoData`] instead.

use crate::Result;
use crate::aggregation::{Aggregator, Trend};
use crate::types::CandidateTally;
use serde::{Deserialize, Serialize};

/// Which chart a series feeds
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SeriesKind {
    Bar,
    Pie,
    HorizontalBar,
    Party,
    Trend,
}

/// Points of a series, or the no-data sentinel
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SeriesData {
    Points { labels: Vec<String>, values: Vec<u64> },
    NoData { message: String },
}

/// A titled series ready for rasterizing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Series {
    pub kind: SeriesKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub data: SeriesData,
}

impl Series {
    fn new(kind: SeriesKind, title: &str, x_label: &str, y_label: &str, data: SeriesData) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            data,
        }
    }

    pub fn is_no_data(&self) -> bool {
        matches!(self.data, SeriesData::NoData { .. })
    }

    /// `(label, value)` pairs; empty for a no-data series
    pub fn points(&self) -> Vec<(&str, u64)> {
        match &self.data {
            SeriesData::Points { labels, values } => labels
                .iter()
                .map(String::as_str)
                .zip(values.iter().copied())
                .collect(),
            SeriesData::NoData { .. } => Vec::new(),
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn candidate_points(tallies: &[CandidateTally]) -> SeriesData {
    SeriesData::Points {
        labels: tallies.iter().map(|t| t.candidate.name.clone()).collect(),
        values: tallies.iter().map(|t| t.vote_count).collect(),
    }
}

/// Builds chart series from aggregation results
#[derive(Clone)]
pub struct SeriesAdapter {
    aggregator: Aggregator,
    no_data_message: String,
}

impl SeriesAdapter {
    pub fn new(aggregator: Aggregator, no_data_message: impl Into<String>) -> Self {
        Self {
            aggregator,
            no_data_message: no_data_message.into(),
        }
    }

    fn no_data(&self) -> SeriesData {
        SeriesData::NoData {
            message: self.no_data_message.clone(),
        }
    }

    /// Every candidate in tally order
    pub fn bar(&self) -> Result<Series> {
        let tallies = self.aggregator.tally_by_candidate()?;
        Ok(Series::new(
            SeriesKind::Bar,
            "Voting Results by Candidate",
            "Candidates",
            "Number of Votes",
            candidate_points(&tallies),
        ))
    }

    /// Same data as [`Self::bar`], laid out with swapped axes
    pub fn horizontal_bar(&self) -> Result<Series> {
        let tallies = self.aggregator.tally_by_candidate()?;
        Ok(Series::new(
            SeriesKind::HorizontalBar,
            "Voting Results - Horizontal Bar Chart",
            "Number of Votes",
            "Candidates",
            candidate_points(&tallies),
        ))
    }

    /// Candidates with at least one vote; no slices means no data
    pub fn pie(&self) -> Result<Series> {
        let tallies: Vec<CandidateTally> = self
            .aggregator
            .tally_by_candidate()?
            .into_iter()
            .filter(|t| t.vote_count > 0)
            .collect();

        let data = if tallies.is_empty() {
            self.no_data()
        } else {
            candidate_points(&tallies)
        };
        Ok(Series::new(
            SeriesKind::Pie,
            "Vote Distribution by Candidate",
            "",
            "",
            data,
        ))
    }

    /// Summed votes per party
    pub fn party(&self) -> Result<Series> {
        let parties = self.aggregator.tally_by_party()?;

        let data = if parties.is_empty() {
            self.no_data()
        } else {
            SeriesData::Points {
                labels: parties.iter().map(|p| p.party.clone()).collect(),
                values: parties.iter().map(|p| p.total_votes).collect(),
            }
        };
        Ok(Series::new(
            SeriesKind::Party,
            "Voting Results by Political Party",
            "Political Party",
            "Total Votes",
            data,
        ))
    }

    /// Votes per date, falling back to per-candidate distribution when all
    /// votes share one date
    pub fn trend(&self) -> Result<Series> {
        let series = match self.aggregator.trend()? {
            Trend::Daily(days) => Series::new(
                SeriesKind::Trend,
                "Voting Trends Over Time",
                "Date",
                "Votes Cast",
                SeriesData::Points {
                    labels: days.iter().map(|d| d.date.to_string()).collect(),
                    values: days.iter().map(|d| d.vote_count).collect(),
                },
            ),
            Trend::ByCandidate(tallies) => Series::new(
                SeriesKind::Trend,
                "Vote Distribution - Line Chart",
                "Candidates",
                "Number of Votes",
                candidate_points(&tallies),
            ),
            Trend::Empty => Series::new(
                SeriesKind::Trend,
                "Voting Trends Over Time",
                "Date",
                "Votes Cast",
                self.no_data(),
            ),
        };
        Ok(series)
    }

    /// One series of every kind
    pub fn all(&self) -> Result<Vec<Series>> {
        Ok(vec![
            self.bar()?,
            self.pie()?,
            self.horizontal_bar()?,
            self.party()?,
            self.trend()?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_data_serialization() {
        let series = Series::new(
            SeriesKind::Pie,
            "Vote Distribution by Candidate",
            "",
            "",
            SeriesData::NoData {
                message: "No votes yet".to_string(),
            },
        );
        assert!(series.is_no_data());
        assert!(series.points().is_empty());

        let json: serde_json::Value = serde_json::from_str(&series.to_json().unwrap()).unwrap();
        assert_eq!(json["kind"], "pie");
        assert_eq!(json["data"]["status"], "no_data");
        assert_eq!(json["data"]["message"], "No votes yet");
    }

    #[test]
    fn test_points_pairs_labels_and_values() {
        let series = Series::new(
            SeriesKind::Party,
            "Voting Results by Political Party",
            "Political Party",
            "Total Votes",
            SeriesData::Points {
                labels: vec!["Green".to_string(), "Blue".to_string()],
                values: vec![3, 1],
            },
        );
        assert_eq!(series.points(), vec![("Green", 3), ("Blue", 1)]);

        let json: serde_json::Value = serde_json::to_value(&series).unwrap();
        assert_eq!(json["kind"], "party");
        assert_eq!(json["data"]["status"], "points");
    }
}
