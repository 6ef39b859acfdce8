use ahash::AHashMap;

use crate::model::{LeaderboardEntry, Team, TeamEntry, TeamStatus};
use crate::score::ranking::competition_positions;

/// Entries grouped by team id, keeping leaderboard order inside each group.
#[must_use]
pub fn group_by_team(entries: &[LeaderboardEntry]) -> AHashMap<i64, Vec<&LeaderboardEntry>> {
    let mut grouped: AHashMap<i64, Vec<&LeaderboardEntry>> = AHashMap::new();
    for entry in entries {
        if let Some(team_id) = entry.team_id {
            grouped.entry(team_id).or_default().push(entry);
        }
    }
    grouped
}

fn team_status(members: &[&LeaderboardEntry], holes_per_member: usize) -> TeamStatus {
    let counted: Vec<_> = members.iter().filter(|e| !e.is_dq).collect();
    let played: usize = counted.iter().map(|e| e.holes_played).sum();
    if played == 0 {
        TeamStatus::NotStarted
    } else if counted.iter().all(|e| e.holes_played >= holes_per_member) {
        TeamStatus::Finished
    } else {
        TeamStatus::InProgress
    }
}

/// Sum member totals per team and rank the started teams by strokes
/// relative to par. Disqualified members are listed but add nothing.
/// Teams that haven't started sort last with position 0.
#[must_use]
pub fn aggregate_teams(
    teams: &[Team],
    entries: &[LeaderboardEntry],
    holes_per_member: usize,
) -> Vec<TeamEntry> {
    let grouped = group_by_team(entries);
    let mut started = Vec::new();
    let mut not_started = Vec::new();

    for team in teams {
        let members = grouped.get(&team.team_id).map_or(&[][..], Vec::as_slice);
        let counted = members.iter().filter(|e| !e.is_dq);
        let row = TeamEntry {
            team_id: team.team_id,
            team_name: team.name.clone(),
            member_ids: members.iter().map(|e| e.participant_id).collect(),
            gross_total: counted.clone().map(|e| e.gross_total).sum(),
            relative_to_par: counted.clone().map(|e| e.relative_to_par).sum(),
            holes_played: counted.map(|e| e.holes_played).sum(),
            status: team_status(members, holes_per_member),
            position: 0,
        };
        match row.status {
            TeamStatus::NotStarted => not_started.push(row),
            TeamStatus::InProgress | TeamStatus::Finished => started.push(row),
        }
    }

    started.sort_by(|a, b| {
        a.relative_to_par
            .cmp(&b.relative_to_par)
            .then_with(|| a.team_name.cmp(&b.team_name))
    });
    let keys: Vec<i32> = started.iter().map(|t| t.relative_to_par).collect();
    for (team, position) in started.iter_mut().zip(competition_positions(&keys)) {
        team.position = position;
    }
    not_started.sort_by(|a, b| a.team_name.cmp(&b.team_name));
    started.extend(not_started);
    started
}
