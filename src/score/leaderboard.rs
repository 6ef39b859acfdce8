use crate::config::EngineConfig;
use crate::error::CoreError;
use crate::model::{
    CompetitionResult, GameFormat, HoleLine, Leaderboard, LeaderboardEntry, NineTotals,
    Participant, ScoreDisplay, Scorecard, ScoringMode, ScoringType, TeamEntry,
};
use crate::score::context::{CompetitionContext, load_competition_context};
use crate::score::handicap::{HandicapCalculator, net_relative_to_par, net_score};
use crate::score::metrics::{RoundMetrics, gross_score};
use crate::score::points::project_points;
use crate::score::ranking::rank_entries;
use crate::score::score_aggregators::aggregate_teams;
use crate::score::strokes::{allocate_strokes, resolve_stroke_index};
use crate::storage::Storage;

/// Snapshot rows backing a leaderboard in `mode`.
#[must_use]
pub fn snapshot_scoring_type(mode: ScoringMode) -> ScoringType {
    match mode {
        ScoringMode::Net => ScoringType::Net,
        ScoringMode::Gross | ScoringMode::Both => ScoringType::Gross,
    }
}

/// Unranked stroke-play entry for one participant.
///
/// Net figures are left empty when the participant has no handicap index or
/// hasn't reported a hole yet. A completed card, pickups included, measures
/// net relative-to-par against the course par. A card still in progress
/// measures it against the par of the holes that produced strokes.
#[must_use]
pub fn score_participant(
    participant: &Participant,
    ctx: &CompetitionContext,
    config: &EngineConfig,
) -> LeaderboardEntry {
    let pars = &ctx.course.pars;
    let total_par = ctx.course.total_par();
    let metrics = match participant.manual_total {
        Some(total) => RoundMetrics::from_manual_total(total, pars),
        None => RoundMetrics::from_score(&participant.score, pars),
    };

    let calc = HandicapCalculator::new(&config.handicap);
    let tee = ctx.tee(participant.tee_id);
    let rating = calc.rating(tee, participant.gender, Some(total_par));
    let course_handicap = calc.course_handicap(participant.handicap_index, &rating, total_par);

    let par_basis = if metrics.holes_played >= ctx.course.hole_count() {
        total_par
    } else {
        metrics.gross_total - metrics.relative_to_par
    };
    let net_total = course_handicap
        .filter(|_| metrics.holes_played > 0)
        .map(|ch| net_score(metrics.gross_total, ch));
    let strokes_received = course_handicap
        .map(|ch| allocate_strokes(ch, resolve_stroke_index(tee, &ctx.course, &config.handicap)))
        .unwrap_or_default();

    LeaderboardEntry {
        participant_id: participant.participant_id,
        player_name: participant.player_name.clone(),
        team_id: participant.team_id,
        tee_time_id: participant.tee_time_id,
        gross_total: metrics.gross_total,
        holes_played: metrics.holes_played,
        relative_to_par: metrics.relative_to_par,
        course_handicap,
        net_total,
        net_relative_to_par: net_total.map(|net| net_relative_to_par(net, par_basis)),
        position: 0,
        points: None,
        is_dq: participant.is_dq,
        is_dnf: metrics.holes_played < ctx.course.hole_count() && ctx.competition.window_closed,
        strokes_received,
    }
}

/// Recompute standings from the raw scores, ranked on `mode`.
#[must_use]
pub fn compute_leaderboard(
    ctx: &CompetitionContext,
    config: &EngineConfig,
    mode: ScoringMode,
) -> Leaderboard {
    let entries = match ctx.competition.game_format {
        GameFormat::StrokePlay => ctx
            .participants
            .iter()
            .map(|p| score_participant(p, ctx, config))
            .collect(),
    };
    let mut entries = rank_entries(entries, mode, config.net_fallback);

    if let Some(tour) = &ctx.tour {
        project_points(
            &mut entries,
            &tour.points_table,
            ctx.competition.points_multiplier,
        );
    }

    Leaderboard {
        competition_id: ctx.competition.competition_id,
        scoring_mode: mode,
        entries,
        is_projected: true,
        finalized_at: None,
    }
}

/// Rebuild standings from finalized snapshot rows. Display-only stroke
/// allocation is rederived from the stored gross and net totals.
#[must_use]
pub fn leaderboard_from_snapshot(
    ctx: &CompetitionContext,
    config: &EngineConfig,
    results: &[CompetitionResult],
    mode: ScoringMode,
) -> Leaderboard {
    let entries = results
        .iter()
        .map(|r| {
            let participant = ctx.participant(r.participant_id);
            let course_handicap = r.net_total.map(|net| r.gross_total - net);
            let tee = ctx.tee(participant.and_then(|p| p.tee_id));
            let strokes_received = course_handicap
                .map(|ch| {
                    allocate_strokes(ch, resolve_stroke_index(tee, &ctx.course, &config.handicap))
                })
                .unwrap_or_default();
            LeaderboardEntry {
                participant_id: r.participant_id,
                player_name: participant.map_or_else(
                    || format!("participant {}", r.participant_id),
                    |p| p.player_name.clone(),
                ),
                team_id: participant.and_then(|p| p.team_id),
                tee_time_id: participant.and_then(|p| p.tee_time_id),
                gross_total: r.gross_total,
                holes_played: r.holes_played,
                relative_to_par: r.relative_to_par,
                course_handicap,
                net_total: r.net_total,
                net_relative_to_par: r.net_relative_to_par,
                position: r.position,
                points: r.points,
                is_dq: r.is_dq,
                is_dnf: r.is_dnf,
                strokes_received,
            }
        })
        .collect();

    Leaderboard {
        competition_id: ctx.competition.competition_id,
        scoring_mode: mode,
        entries,
        is_projected: false,
        finalized_at: ctx.competition.results_finalized_at,
    }
}

/// Standings for a competition under its own scoring mode: the finalized
/// snapshot once there is one, a live projection before that.
///
/// # Errors
/// Returns `NotFound` for an unknown competition and `Db` when the store
/// fails.
pub async fn get_leaderboard(
    storage: &dyn Storage,
    config: &EngineConfig,
    competition_id: i64,
) -> Result<Leaderboard, CoreError> {
    let ctx = load_competition_context(storage, competition_id).await?;
    leaderboard_for_context(storage, config, &ctx).await
}

async fn leaderboard_for_context(
    storage: &dyn Storage,
    config: &EngineConfig,
    ctx: &CompetitionContext,
) -> Result<Leaderboard, CoreError> {
    let mode = ctx.competition.scoring_mode;
    if ctx.competition.is_results_final {
        let results = storage
            .get_results(
                ctx.competition.competition_id,
                snapshot_scoring_type(mode),
            )
            .await?;
        return Ok(leaderboard_from_snapshot(ctx, config, &results, mode));
    }
    Ok(compute_leaderboard(ctx, config, mode))
}

/// Team standings built on top of the individual leaderboard.
///
/// # Errors
/// Returns `NotFound` for an unknown competition and `Db` when the store
/// fails.
pub async fn get_team_leaderboard(
    storage: &dyn Storage,
    config: &EngineConfig,
    competition_id: i64,
) -> Result<Vec<TeamEntry>, CoreError> {
    let ctx = load_competition_context(storage, competition_id).await?;
    let board = leaderboard_for_context(storage, config, &ctx).await?;
    Ok(aggregate_teams(
        &ctx.teams,
        &board.entries,
        ctx.course.hole_count(),
    ))
}

#[must_use]
pub fn build_scorecard(
    participant: &Participant,
    ctx: &CompetitionContext,
    config: &EngineConfig,
) -> Scorecard {
    let entry = score_participant(participant, ctx, config);
    let tee = ctx.tee(participant.tee_id);
    let stroke_index = resolve_stroke_index(tee, &ctx.course, &config.handicap);
    let pars = &ctx.course.pars;

    let holes = pars
        .iter()
        .enumerate()
        .map(|(i, &par)| {
            let strokes = participant.score.get(i).copied().unwrap_or(0);
            HoleLine {
                hole: i + 1,
                par,
                stroke_index: stroke_index.get(i).copied().unwrap_or(0),
                strokes,
                handicap_strokes: entry.strokes_received.get(i).copied().unwrap_or(0),
                score_display: ScoreDisplay::from_strokes(strokes, par),
            }
        })
        .collect();

    let split = pars.len().div_ceil(2);
    let score = &participant.score[..participant.score.len().min(pars.len())];
    let (front, back) = score.split_at(score.len().min(split));
    let gross = NineTotals {
        front: gross_score(front),
        back: gross_score(back),
        total: gross_score(score),
    };

    Scorecard {
        participant_id: participant.participant_id,
        player_name: participant.player_name.clone(),
        course_handicap: entry.course_handicap,
        par: ctx.course.par_summary(),
        gross,
        holes,
    }
}

/// Hole-by-hole card for one participant.
///
/// # Errors
/// Returns `NotFound` for an unknown participant and `Db` when the store
/// fails.
pub async fn get_scorecard(
    storage: &dyn Storage,
    config: &EngineConfig,
    participant_id: i64,
) -> Result<Scorecard, CoreError> {
    let participant = storage.get_participant(participant_id).await?;
    let ctx = load_competition_context(storage, participant.competition_id).await?;
    Ok(build_scorecard(&participant, &ctx, config))
}
