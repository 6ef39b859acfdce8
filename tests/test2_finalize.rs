mod common;

use golf_standings::model::{CompetitionResult, ScoringType};
use golf_standings::score::{
    FinalizeOutcome, finalize_competition_results, finalize_due_competitions, get_leaderboard,
};
use golf_standings::{EngineConfig, Storage, StorageError};

use common::{CLUB_SEASON, at, setup_storage};

#[tokio::test]
async fn finalize_twice_writes_one_row_per_participant_and_type()
-> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();
    let now = at("2024-05-05 08:00:00");

    let first = finalize_competition_results(&storage, &config, 1, now).await?;
    // tour tracks both, so gross and net rows for all seven players
    assert_eq!(first, FinalizeOutcome::Finalized { rows_written: 14 });

    let second = finalize_competition_results(&storage, &config, 1, now).await?;
    assert_eq!(second, FinalizeOutcome::AlreadyFinal);

    let gross = storage.get_results(1, ScoringType::Gross).await?;
    let net = storage.get_results(1, ScoringType::Net).await?;
    assert_eq!(gross.len(), 7);
    assert_eq!(net.len(), 7);

    let competition = storage.get_competition(1).await?;
    assert!(competition.is_results_final);
    assert_eq!(competition.results_finalized_at, Some(now));
    Ok(())
}

#[tokio::test]
async fn finalized_snapshot_treats_partial_rounds_as_dnf() -> Result<(), Box<dyn std::error::Error>>
{
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();
    finalize_competition_results(&storage, &config, 1, at("2024-05-05 08:00:00")).await?;

    let gross = storage.get_results(1, ScoringType::Gross).await?;
    let rows: Vec<(i64, usize)> = gross.iter().map(|r| (r.participant_id, r.position)).collect();
    assert_eq!(rows, [(2, 1), (3, 1), (1, 3), (4, 4), (6, 0), (7, 0), (5, 0)]);
    assert!(gross.iter().find(|r| r.participant_id == 6).unwrap().is_dnf);
    assert_eq!(gross[3].points, Some(20.0));

    let net = storage.get_results(1, ScoringType::Net).await?;
    let rows: Vec<(i64, usize)> = net.iter().map(|r| (r.participant_id, r.position)).collect();
    assert_eq!(rows, [(4, 1), (1, 2), (2, 3), (3, 3), (6, 0), (7, 0), (5, 0)]);
    assert_eq!(net[0].net_total, Some(52));
    Ok(())
}

#[tokio::test]
async fn leaderboard_is_served_from_the_snapshot_once_final()
-> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();
    let now = at("2024-05-05 08:00:00");
    finalize_competition_results(&storage, &config, 1, now).await?;

    let board = get_leaderboard(&storage, &config, 1).await?;
    assert!(!board.is_projected);
    assert_eq!(board.finalized_at, Some(now));
    assert_eq!(board.entries.len(), 7);
    assert_eq!(board.entries[0].player_name, "Bob");
    let alice = board.entries.iter().find(|e| e.player_name == "Alice").unwrap();
    assert_eq!(alice.course_handicap, Some(11));
    assert_eq!(alice.points, Some(20.0));

    // later score edits don't move a final leaderboard
    let err = storage.record_hole_score(4, 1, 2).await.unwrap_err();
    assert!(matches!(err, StorageError::Locked(_)));
    let again = get_leaderboard(&storage, &config, 1).await?;
    assert_eq!(again, board);
    Ok(())
}

#[tokio::test]
async fn not_eligible_before_the_window_passes() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();

    let same_day = finalize_competition_results(&storage, &config, 1, at("2024-05-04 20:00:00"))
        .await?;
    assert_eq!(same_day, FinalizeOutcome::NotEligible);
    let window_open =
        finalize_competition_results(&storage, &config, 2, at("2024-06-01 11:59:59")).await?;
    assert_eq!(window_open, FinalizeOutcome::NotEligible);

    assert!(storage.get_results(1, ScoringType::Gross).await?.is_empty());
    assert!(!storage.get_competition(1).await?.is_results_final);
    Ok(())
}

#[tokio::test]
async fn failed_snapshot_write_rolls_back() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let now = at("2024-05-05 08:00:00");
    let row = |participant_id| CompetitionResult {
        competition_id: 1,
        participant_id,
        scoring_type: ScoringType::Gross,
        position: 1,
        points: None,
        gross_total: 72,
        net_total: None,
        relative_to_par: 0,
        net_relative_to_par: None,
        holes_played: 18,
        is_dq: false,
        is_dnf: false,
        created_at: now,
    };

    // participant 999 doesn't exist, so the second insert breaks a foreign key
    let err = storage
        .store_results(1, &[row(1), row(999)], now)
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Db(_)));

    assert!(storage.get_results(1, ScoringType::Gross).await?.is_empty());
    let competition = storage.get_competition(1).await?;
    assert!(!competition.is_results_final);
    assert_eq!(competition.results_finalized_at, None);
    Ok(())
}

#[tokio::test]
async fn score_recorded_before_finalize_is_in_the_snapshot()
-> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();

    // Dan's bogey on the par 3 third is corrected to a par
    storage.record_hole_score(4, 3, 3).await?;
    finalize_competition_results(&storage, &config, 1, at("2024-05-05 08:00:00")).await?;

    let gross = storage.get_results(1, ScoringType::Gross).await?;
    let dan = gross.iter().find(|r| r.participant_id == 4).unwrap();
    assert_eq!(dan.gross_total, 72);
    assert_eq!(dan.relative_to_par, 0);
    Ok(())
}

#[tokio::test]
async fn score_racing_finalize_is_either_snapshotted_or_refused()
-> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();
    let now = at("2024-05-05 08:00:00");

    let (entry, outcome) = tokio::join!(
        storage.record_hole_score(4, 3, 3),
        finalize_competition_results(&storage, &config, 1, now),
    );
    assert_eq!(outcome?, FinalizeOutcome::Finalized { rows_written: 14 });

    let gross = storage.get_results(1, ScoringType::Gross).await?;
    let dan = gross.iter().find(|r| r.participant_id == 4).unwrap();
    match entry {
        Ok(()) => assert_eq!(dan.gross_total, 72),
        Err(err) => {
            assert!(matches!(err, StorageError::Locked(_)));
            assert_eq!(dan.gross_total, 73);
        }
    }
    Ok(())
}

#[tokio::test]
async fn batch_finalize_reports_each_competition() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();

    let report = finalize_due_competitions(&storage, &config, at("2024-05-10 00:00:00")).await?;
    assert_eq!(report.finalized, vec![1]);
    assert_eq!(report.skipped, vec![2]);
    assert!(report.failed.is_empty());

    let report = finalize_due_competitions(&storage, &config, at("2024-06-02 00:00:00")).await?;
    assert_eq!(report.finalized, vec![2]);
    assert!(report.skipped.is_empty());

    // net-only competition outside a tour still snapshots gross
    assert_eq!(storage.get_results(2, ScoringType::Gross).await?.len(), 3);
    assert_eq!(storage.get_results(2, ScoringType::Net).await?.len(), 3);
    Ok(())
}
