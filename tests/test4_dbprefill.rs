mod common;

use golf_standings::controller::db_prefill::{Seed, db_prefill};
use golf_standings::model::{CompetitionSchedule, Gender, ScoringMode};
use golf_standings::score::get_leaderboard;
use golf_standings::{CoreError, EngineConfig, Storage};

use common::setup_storage;

const SEED: &str = r#"{
    "tours": [
        {"tour_id": 1, "name": "Winter League", "points_table": {"1": 50, "default": 5}, "scoring_mode": "net"}
    ],
    "courses": [
        {"course_id": 1, "name": "Links", "pars": [4,4,3,5,4,4,3,5,4,4,4,3,5,4,4,3,5,4],
         "tees": [
            {"tee_id": 1, "name": "Yellow", "course_rating": 70.1, "slope_rating": 121,
             "ratings": [{"gender": "women", "course_rating": 75.2, "slope_rating": 130}]}
         ]}
    ],
    "competitions": [
        {"competition_id": 1, "name": "January Cup", "course_id": 1, "tour_id": 1,
         "scoring_mode": "both",
         "schedule": {"kind": "open_window", "start": "2025-01-01T00:00:00", "end": "2025-01-31T23:59:59"},
         "teams": [{"team_id": 1, "name": "North"}],
         "participants": [
            {"participant_id": 1, "player_name": "Kim", "gender": "women", "handicap_index": 12.0,
             "tee_id": 1, "team_id": 1, "score": [5,4,3,5,4,4,3,5,4]},
            {"participant_id": 2, "player_name": "Lee", "tee_id": 1, "team_id": 1}
         ]}
    ]
}"#;

#[tokio::test]
async fn prefill_loads_a_whole_season() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage("").await?;
    let seed: Seed = serde_json::from_str(SEED)?;
    db_prefill(&seed, &storage).await?;

    let competition = storage.get_competition(1).await?;
    assert_eq!(competition.scoring_mode, ScoringMode::Both);
    assert!(matches!(
        competition.schedule,
        CompetitionSchedule::OpenWindow { start: Some(_), .. }
    ));
    assert!((competition.points_multiplier - 1.0).abs() < f64::EPSILON);

    let tees = storage.get_tees(1).await?;
    assert_eq!(tees[0].ratings[0].gender, Gender::Women);
    assert_eq!(tees[0].ratings[0].slope_rating, 130);

    let tour = storage.get_tour(1).await?;
    assert_eq!(tour.points_table.lookup(7), Some(5));

    let lee = storage.get_participant(2).await?;
    assert!(lee.score.is_empty());
    assert_eq!(lee.gender, None);

    // women's rating: 12 * 130 / 113 + (75.2 - 72) = 17.0 -> 17
    let board = get_leaderboard(&storage, &EngineConfig::default(), 1).await?;
    let kim = board.entries.iter().find(|e| e.player_name == "Kim").unwrap();
    assert_eq!(kim.course_handicap, Some(17));
    assert_eq!(kim.relative_to_par, 1);
    Ok(())
}

#[tokio::test]
async fn prefill_is_all_or_nothing() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage("").await?;
    let mut seed: Seed = serde_json::from_str(SEED)?;
    // points at a tee that doesn't exist
    seed.competitions[0].participants[1].tee_id = Some(42);

    let err = db_prefill(&seed, &storage).await.unwrap_err();
    assert!(matches!(err, CoreError::Db(_)));
    assert!(matches!(
        storage.get_tour(1).await.unwrap_err(),
        golf_standings::StorageError::NotFound(_)
    ));
    Ok(())
}

#[tokio::test]
async fn prefill_rejects_a_broken_stroke_index() -> Result<(), Box<dyn std::error::Error>> {
    let storage = setup_storage("").await?;
    let mut seed: Seed = serde_json::from_str(SEED)?;
    seed.courses[0].stroke_index = Some(vec![1; 18]);

    let err = db_prefill(&seed, &storage).await.unwrap_err();
    assert!(matches!(err, CoreError::Parse(_)));
    Ok(())
}
