mod common;

use golf_standings::model::ScoreDisplay;
use golf_standings::score::get_scorecard;
use golf_standings::{CoreError, EngineConfig, Storage, StorageError};

use common::{CLUB_SEASON, setup_storage};

#[tokio::test]
async fn hole_entry_grows_the_score() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;

    storage.record_hole_score(7, 1, 4).await?;
    storage.record_hole_score(7, 3, -1).await?;
    assert_eq!(storage.get_participant(7).await?.score, vec![4, 0, -1]);

    // clearing a hole keeps the array length
    storage.record_hole_score(7, 1, 0).await?;
    assert_eq!(storage.get_participant(7).await?.score, vec![0, 0, -1]);
    Ok(())
}

#[tokio::test]
async fn hole_entry_rejects_bad_input() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;

    let err = storage.record_hole_score(7, 19, 4).await.unwrap_err();
    assert!(matches!(err, StorageError::Invalid(_)));
    let err = storage.record_hole_score(7, 0, 4).await.unwrap_err();
    assert!(matches!(err, StorageError::Invalid(_)));
    let err = storage.record_hole_score(7, 1, -2).await.unwrap_err();
    assert!(matches!(err, StorageError::Invalid(_)));
    let err = storage.record_hole_score(999, 1, 4).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound(_)));

    assert!(storage.get_participant(7).await?.score.is_empty());
    Ok(())
}

#[tokio::test]
async fn locked_card_refuses_edits_until_unlocked() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;

    storage.set_locked(7, true).await?;
    let err = storage.record_hole_score(7, 1, 4).await.unwrap_err();
    assert!(matches!(err, StorageError::Locked(_)));
    let err = storage.set_manual_total(7, Some(80)).await.unwrap_err();
    assert!(matches!(err, StorageError::Locked(_)));

    // a locked player can still be disqualified
    storage.set_disqualified(7, true).await?;
    assert!(storage.get_participant(7).await?.is_dq);

    storage.set_locked(7, false).await?;
    storage.record_hole_score(7, 1, 4).await?;
    assert_eq!(storage.get_participant(7).await?.score, vec![4]);
    Ok(())
}

#[tokio::test]
async fn manual_total_stands_in_for_the_round() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    storage.set_manual_total(7, Some(70)).await?;

    let board =
        golf_standings::score::get_leaderboard(&storage, &EngineConfig::default(), 1).await?;
    let gus = board.entries.iter().find(|e| e.player_name == "Gus").unwrap();
    assert_eq!(gus.gross_total, 70);
    assert_eq!(gus.relative_to_par, -2);
    assert_eq!(gus.holes_played, 18);
    assert_eq!(gus.position, 1);
    Ok(())
}

#[tokio::test]
async fn scorecard_shows_nines_and_handicap_strokes() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let config = EngineConfig::default();

    let card = get_scorecard(&storage, &config, 1).await?;
    assert_eq!(card.player_name, "Alice");
    assert_eq!(card.course_handicap, Some(11));
    assert_eq!((card.par.front, card.par.back, card.par.total), (36, 36, 72));
    assert_eq!((card.gross.front, card.gross.back, card.gross.total), (36, 36, 72));
    assert_eq!(card.holes.len(), 18);
    // default stroke index: hole 1 is SI 1, hole 7 is SI 13
    assert_eq!(card.holes[0].stroke_index, 1);
    assert_eq!(card.holes[0].handicap_strokes, 1);
    assert_eq!(card.holes[6].handicap_strokes, 0);
    assert!(card.holes.iter().all(|h| h.score_display == ScoreDisplay::Par));

    let bob = get_scorecard(&storage, &config, 2).await?;
    assert_eq!(bob.holes[0].score_display, ScoreDisplay::Birdie);
    assert!(bob.holes.iter().all(|h| h.handicap_strokes == 0));

    let finn = get_scorecard(&storage, &config, 6).await?;
    assert_eq!((finn.gross.front, finn.gross.back), (36, 0));
    assert_eq!(finn.holes[9].score_display, ScoreDisplay::NotPlayed);
    Ok(())
}

#[tokio::test]
async fn unknown_participant_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage(CLUB_SEASON).await?;
    let err = get_scorecard(&storage, &EngineConfig::default(), 999)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
    Ok(())
}
