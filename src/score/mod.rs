pub mod context;
pub mod finalize;
pub mod handicap;
pub mod leaderboard;
pub mod metrics;
pub mod points;
pub mod ranking;
pub mod score_aggregators;
pub mod strokes;

pub use context::{CompetitionContext, load_competition_context};
pub use finalize::{
    FinalizeOutcome, FinalizeReport, finalize_competition_results, finalize_due_competitions,
};
pub use leaderboard::{compute_leaderboard, get_leaderboard, get_scorecard, get_team_leaderboard};
