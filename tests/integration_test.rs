//! Integration tests for the ledger, aggregation and adapters

use chrono::{TimeZone, Utc};
use std::sync::Arc;
use votes::{
    Error, ErrorClass, Result, VotingSystem,
    config::Config,
    series::{SeriesData, SeriesKind},
    store::ManualClock,
};

fn clocked_system() -> Result<(Arc<ManualClock>, VotingSystem)> {
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 11, 5, 9, 0, 0).unwrap(),
    ));
    let system = VotingSystem::with_clock(Config::for_testing()?, clock.clone());
    Ok((clock, system))
}

#[tokio::test]
async fn test_double_vote_scenario() -> Result<()> {
    println!("🚫 Testing double voting prevention...");

    let system = VotingSystem::for_testing()?;
    let ledger = system.ledger();
    let c1 = ledger.register_candidate("Candidate One", "North")?;
    let c2 = ledger.register_candidate("Candidate Two", "South")?;

    ledger.register_voter("V1", Some("First Voter"))?;
    ledger.cast_vote("V1", &c1.id, None)?;
    println!("✅ First vote accepted");

    let err = ledger.cast_vote("V1", &c2.id, None).unwrap_err();
    assert!(err.is_already_voted());
    assert_eq!(err.class(), ErrorClass::Informational);
    println!("✅ Second vote rejected: {err}");

    let tallies = system.aggregator().tally_by_candidate()?;
    let counts: Vec<_> = tallies
        .iter()
        .map(|t| (t.candidate.name.as_str(), t.vote_count))
        .collect();
    assert_eq!(counts, vec![("Candidate One", 1), ("Candidate Two", 0)]);
    assert_eq!(system.aggregator().results_summary()?.total_votes, 1);

    Ok(())
}

#[tokio::test]
async fn test_every_later_cast_is_rejected() -> Result<()> {
    let system = VotingSystem::for_testing()?;
    let ledger = system.ledger();
    let candidates: Vec<_> = ["A", "B", "C"]
        .iter()
        .map(|name| ledger.register_candidate(name, "Party"))
        .collect::<Result<_>>()?;

    ledger.cast_vote("repeat", &candidates[0].id, None)?;
    for candidate in candidates.iter().cycle().take(9) {
        let err = ledger.cast_vote("repeat", &candidate.id, None).unwrap_err();
        assert!(matches!(err, Error::AlreadyVoted { .. }));
    }

    assert_eq!(system.aggregator().results_summary()?.total_votes, 1);
    assert_eq!(ledger.voters()?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_unknown_voter_registered_once_across_candidates() -> Result<()> {
    let system = VotingSystem::for_testing()?;
    let ledger = system.ledger();
    let a = ledger.register_candidate("A", "Red")?;
    let b = ledger.register_candidate("B", "Blue")?;

    let first = ledger.cast_vote("fresh", &a.id, Some("Fresh Voter"));
    let second = ledger.cast_vote("fresh", &b.id, Some("Different Name"));

    assert!(first.is_ok());
    assert!(second.unwrap_err().is_already_voted());

    let voters = ledger.voters()?;
    assert_eq!(voters.len(), 1);
    assert_eq!(voters[0].name, "Fresh Voter");
    Ok(())
}

#[tokio::test]
async fn test_tally_ordering_and_percentages() -> Result<()> {
    println!("📊 Testing tally ordering...");

    let system = VotingSystem::for_testing()?;
    let ledger = system.ledger();
    let a = ledger.register_candidate("A", "Left")?;
    let b = ledger.register_candidate("B", "Right")?;
    let c = ledger.register_candidate("C", "Left")?;

    let plan = [(&b, 2), (&a, 2), (&c, 5)];
    let mut uid = 0;
    for (candidate, votes) in plan {
        for _ in 0..votes {
            uid += 1;
            ledger.cast_vote(&format!("V{uid}"), &candidate.id, None)?;
        }
    }

    let summary = system.aggregator().results_summary()?;
    let order: Vec<_> = summary
        .tallies
        .iter()
        .map(|t| t.candidate.name.as_str())
        .collect();
    assert_eq!(order, vec!["C", "A", "B"]);

    let shares: Vec<f64> = summary.tallies.iter().filter_map(|t| t.percentage).collect();
    assert_eq!(shares, vec![55.56, 22.22, 22.22]);
    let total: f64 = shares.iter().sum();
    assert!((total - 100.0).abs() < 0.05);

    let parties = system.aggregator().tally_by_party()?;
    assert_eq!(parties[0].party, "Left");
    assert_eq!(parties[0].total_votes, 7);
    assert_eq!(parties[1].total_votes, 2);
    println!("✅ Ordering C, A, B confirmed");
    Ok(())
}

#[tokio::test]
async fn test_statistics_include_zero_vote_candidates() -> Result<()> {
    let system = VotingSystem::for_testing()?;
    let ledger = system.ledger();
    let winner = ledger.register_candidate("Winner", "X")?;
    ledger.register_candidate("Zero One", "Y")?;
    ledger.register_candidate("Zero Two", "Z")?;

    for i in 0..3 {
        ledger.cast_vote(&format!("S{i}"), &winner.id, None)?;
    }

    let stats = system.aggregator().candidate_statistics()?;
    assert_eq!(stats.mean_votes, 1.0);
    assert_eq!(stats.median_votes, 0.0);
    assert_eq!(stats.total_candidates, 3);

    let parties = system.aggregator().tally_by_party()?;
    assert_eq!(parties.len(), 3);
    assert_eq!(parties[0].party, "X");
    assert!(parties[1..].iter().all(|p| p.total_votes == 0));
    Ok(())
}

#[tokio::test]
async fn test_statistics_even_sized_set() -> Result<()> {
    let system = VotingSystem::for_testing()?;
    let ledger = system.ledger();
    let mut uid = 0;
    for (name, votes) in [("One", 1), ("Two", 2), ("Three", 3), ("Four", 4)] {
        let candidate = ledger.register_candidate(name, "P")?;
        for _ in 0..votes {
            uid += 1;
            ledger.cast_vote(&format!("E{uid}"), &candidate.id, None)?;
        }
    }

    let stats = system.aggregator().candidate_statistics()?;
    assert_eq!(stats.mean_votes, 2.5);
    assert_eq!(stats.median_votes, 2.5);
    assert_eq!(stats.total_candidates, 4);
    Ok(())
}

#[tokio::test]
async fn test_empty_ledger_scenario() -> Result<()> {
    println!("🫙 Testing empty ledger...");

    let system = VotingSystem::for_testing()?;
    let aggregator = system.aggregator();

    let summary = aggregator.results_summary()?;
    assert_eq!(summary.total_votes, 0);
    assert!(summary.tallies.is_empty());

    let stats = aggregator.candidate_statistics()?;
    assert_eq!(stats.mean_votes, 0.0);
    assert_eq!(stats.median_votes, 0.0);
    assert_eq!(stats.total_candidates, 0);

    assert!(aggregator.tally_by_party()?.is_empty());
    assert!(aggregator.votes_over_time()?.is_empty());

    let series = system.series();
    assert!(series.pie()?.is_no_data());
    assert!(series.trend()?.is_no_data());
    assert!(series.party()?.is_no_data());
    assert!(series.bar()?.points().is_empty());

    let rows = system.exporter().rows()?;
    assert!(rows.is_empty());
    println!("✅ Empty ledger yields zero/empty/sentinel results");
    Ok(())
}

#[tokio::test]
async fn test_candidates_without_votes() -> Result<()> {
    let system = VotingSystem::for_testing()?;
    system.ledger().register_candidate("Quiet", "Silent")?;
    system.ledger().register_candidate("Calm", "Silent")?;

    let summary = system.aggregator().results_summary()?;
    assert_eq!(summary.total_votes, 0);
    assert!(summary.tallies.iter().all(|t| t.percentage == Some(0.0)));
    let names: Vec<_> = summary
        .tallies
        .iter()
        .map(|t| t.candidate.name.as_str())
        .collect();
    assert_eq!(names, vec!["Calm", "Quiet"]);

    let parties = system.aggregator().tally_by_party()?;
    assert_eq!(parties.len(), 1);
    assert_eq!(parties[0].total_votes, 0);

    let pie = system.series().pie()?;
    assert_eq!(
        pie.data,
        SeriesData::NoData {
            message: "No votes yet".to_string()
        }
    );
    assert!(!system.series().party()?.is_no_data());
    Ok(())
}

#[tokio::test]
async fn test_trend_falls_back_on_single_date() -> Result<()> {
    println!("📈 Testing trend fallback...");

    let (clock, system) = clocked_system()?;
    let ledger = system.ledger();
    let a = ledger.register_candidate("A", "One")?;
    let b = ledger.register_candidate("B", "Two")?;
    ledger.register_candidate("Nobody", "Three")?;

    ledger.cast_vote("T1", &a.id, None)?;
    clock.advance(chrono::Duration::hours(3));
    ledger.cast_vote("T2", &b.id, None)?;
    clock.advance(chrono::Duration::hours(3));
    ledger.cast_vote("T3", &a.id, None)?;

    let days = system.aggregator().votes_over_time()?;
    assert_eq!(days.len(), 1);
    assert_eq!(days[0].vote_count, 3);

    let trend = system.series().trend()?;
    assert_eq!(trend.kind, SeriesKind::Trend);
    assert_eq!(trend.title, "Vote Distribution - Line Chart");
    assert_eq!(trend.points(), vec![("A", 2), ("B", 1)]);
    println!("✅ Single-date ledger falls back to candidate distribution");
    Ok(())
}

#[tokio::test]
async fn test_trend_uses_dates_when_spread() -> Result<()> {
    let (clock, system) = clocked_system()?;
    let ledger = system.ledger();
    let a = ledger.register_candidate("A", "One")?;

    ledger.cast_vote("D1", &a.id, None)?;
    ledger.cast_vote("D2", &a.id, None)?;
    clock.set(Utc.with_ymd_and_hms(2024, 11, 7, 23, 59, 59).unwrap());
    ledger.cast_vote("D3", &a.id, None)?;

    let trend = system.series().trend()?;
    assert_eq!(trend.title, "Voting Trends Over Time");
    assert_eq!(trend.x_label, "Date");
    assert_eq!(trend.points(), vec![("2024-11-05", 2), ("2024-11-07", 1)]);
    Ok(())
}

#[tokio::test]
async fn test_export_rows_most_recent_first() -> Result<()> {
    let (clock, system) = clocked_system()?;
    let ledger = system.ledger();
    let a = ledger.register_candidate("Alice", "Green")?;
    let b = ledger.register_candidate("Bob", "Blue")?;

    ledger.cast_vote("first", &a.id, Some("First"))?;
    clock.advance(chrono::Duration::seconds(90));
    ledger.cast_vote("second", &b.id, Some("Second"))?;

    let rows = system.exporter().rows()?;
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].voter_uid, "second");
    assert_eq!(rows[0].candidate_name, "Bob");
    assert_eq!(rows[0].candidate_party, "Blue");
    assert_eq!(rows[0].timestamp, "2024-11-05 09:01:30");
    assert_eq!(rows[1].voter_name, "First");
    assert_eq!(rows[1].timestamp, "2024-11-05 09:00:00");

    let csv = system.exporter().to_csv_string()?;
    let lines: Vec<_> = csv.lines().collect();
    assert_eq!(lines[0], "Voter UID,Voter Name,Candidate,Party,Timestamp");
    assert_eq!(lines[1], "second,Second,Bob,Blue,2024-11-05 09:01:30");
    assert_eq!(system.exporter().file_name(), "voting_results.csv");
    Ok(())
}

#[tokio::test]
async fn test_all_series_share_tally_order() -> Result<()> {
    let system = VotingSystem::for_testing()?;
    let ledger = system.ledger();
    let a = ledger.register_candidate("Anna", "P1")?;
    let b = ledger.register_candidate("Ben", "P2")?;
    ledger.register_candidate("Cleo", "P2")?;

    ledger.cast_vote("x1", &b.id, None)?;
    ledger.cast_vote("x2", &b.id, None)?;
    ledger.cast_vote("x3", &a.id, None)?;

    let series = system.series().all()?;
    assert_eq!(series.len(), 5);

    let bar = &series[0];
    assert_eq!(bar.points(), vec![("Ben", 2), ("Anna", 1), ("Cleo", 0)]);
    let pie = &series[1];
    assert_eq!(pie.points(), vec![("Ben", 2), ("Anna", 1)]);
    let horizontal = &series[2];
    assert_eq!(horizontal.points(), bar.points());
    assert_eq!(horizontal.x_label, "Number of Votes");
    let party = &series[3];
    assert_eq!(party.points(), vec![("P2", 2), ("P1", 1)]);
    Ok(())
}
