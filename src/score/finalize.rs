use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::{error, info};

use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::model::{
    Competition, CompetitionResult, CompetitionSchedule, Leaderboard, ScoringType, Tour,
};
use crate::score::context::CompetitionContext;
use crate::score::leaderboard::compute_leaderboard;
use crate::storage::{SnapshotBuilder, SnapshotWrite, Storage};

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FinalizeOutcome {
    Finalized { rows_written: usize },
    AlreadyFinal,
    NotEligible,
}

#[derive(Serialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct FinalizeReport {
    pub finalized: Vec<i64>,
    pub skipped: Vec<i64>,
    pub failed: Vec<i64>,
}

/// Whether the competition's playing window is over at `now`: the day of a
/// scheduled round has passed, or an open window's end is behind us.
#[must_use]
pub fn is_eligible(competition: &Competition, now: NaiveDateTime) -> bool {
    match &competition.schedule {
        CompetitionSchedule::Scheduled { date } => *date < now.date(),
        CompetitionSchedule::OpenWindow { end, .. } => *end < now,
    }
}

/// Gross is always snapshotted; net too when the tour or the competition
/// tracks it.
#[must_use]
pub fn required_scoring_types(competition: &Competition, tour: Option<&Tour>) -> Vec<ScoringType> {
    let tracks_net = competition.scoring_mode.tracks_net()
        || tour.is_some_and(|t| t.scoring_mode.tracks_net());
    if tracks_net {
        vec![ScoringType::Gross, ScoringType::Net]
    } else {
        vec![ScoringType::Gross]
    }
}

fn snapshot_rows(
    board: &Leaderboard,
    scoring_type: ScoringType,
    created_at: NaiveDateTime,
) -> impl Iterator<Item = CompetitionResult> + '_ {
    board.entries.iter().map(move |e| CompetitionResult {
        competition_id: board.competition_id,
        participant_id: e.participant_id,
        scoring_type,
        position: e.position,
        points: e.points,
        gross_total: e.gross_total,
        net_total: e.net_total,
        relative_to_par: e.relative_to_par,
        net_relative_to_par: e.net_relative_to_par,
        holes_played: e.holes_played,
        is_dq: e.is_dq,
        is_dnf: e.is_dnf,
        created_at,
    })
}

/// Snapshot rows for every required scoring type, computed with the window
/// treated as closed.
fn snapshot_for(
    ctx: &CompetitionContext,
    config: &EngineConfig,
    created_at: NaiveDateTime,
) -> Vec<CompetitionResult> {
    let mut ctx = ctx.clone();
    ctx.competition.window_closed = true;
    let mut rows = Vec::new();
    for scoring_type in required_scoring_types(&ctx.competition, ctx.tour.as_ref()) {
        let board = compute_leaderboard(&ctx, config, scoring_type.as_mode());
        rows.extend(snapshot_rows(&board, scoring_type, created_at));
    }
    rows
}

/// Snapshot the standings of one competition and flag it final.
///
/// The playing window is over by the time a competition is eligible, so
/// incomplete rounds are snapshotted as DNF. The standings are read and the
/// rows and final flag written in one transaction, so a score accepted
/// before this returns is part of the snapshot.
///
/// # Errors
/// Returns `NotFound` for an unknown competition and `Db` when the write
/// fails, in which case nothing is stored.
pub async fn finalize_competition_results(
    storage: &dyn Storage,
    config: &EngineConfig,
    competition_id: i64,
    now: NaiveDateTime,
) -> Result<FinalizeOutcome, CoreError> {
    let config = config.clone();
    let build: SnapshotBuilder = Box::new(move |ctx: &CompetitionContext| {
        is_eligible(&ctx.competition, now).then(|| snapshot_for(ctx, &config, now))
    });

    match storage.finalize_with(competition_id, now, build).await? {
        SnapshotWrite::Written(rows_written) => {
            info!(competition_id, rows_written, "finalized competition results");
            Ok(FinalizeOutcome::Finalized { rows_written })
        }
        SnapshotWrite::AlreadyFinal => Ok(FinalizeOutcome::AlreadyFinal),
        SnapshotWrite::Declined => Ok(FinalizeOutcome::NotEligible),
    }
}

/// Finalize every unfinalized competition whose window has passed. A failure
/// on one competition is logged and the rest still run.
///
/// # Errors
/// Returns `Db` only when the list of candidates can't be read.
pub async fn finalize_due_competitions(
    storage: &dyn Storage,
    config: &EngineConfig,
    now: NaiveDateTime,
) -> Result<FinalizeReport, CoreError> {
    let mut report = FinalizeReport::default();
    for competition in storage.list_unfinalized_competitions().await? {
        let competition_id = competition.competition_id;
        if !is_eligible(&competition, now) {
            report.skipped.push(competition_id);
            continue;
        }
        match finalize_competition_results(storage, config, competition_id, now).await {
            Ok(FinalizeOutcome::Finalized { .. }) => report.finalized.push(competition_id),
            Ok(FinalizeOutcome::AlreadyFinal | FinalizeOutcome::NotEligible) => {
                report.skipped.push(competition_id);
            }
            Err(e) => {
                error!(competition_id, error = %e, "failed to finalize competition");
                report.failed.push(competition_id);
            }
        }
    }
    info!(
        finalized = report.finalized.len(),
        skipped = report.skipped.len(),
        failed = report.failed.len(),
        "finalize run complete"
    );
    Ok(report)
}
