use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

pub const HOLES_PER_ROUND: usize = 18;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Men,
    Women,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::Men => "men",
            Gender::Women => "women",
        };
        write!(f, "{s}")
    }
}

impl FromStr for Gender {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "men" | "m" => Ok(Self::Men),
            "women" | "w" => Ok(Self::Women),
            other => Err(CoreError::Parse(format!("unknown gender '{other}'"))),
        }
    }
}

/// Which figure a leaderboard is ranked on.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    #[default]
    Gross,
    Net,
    Both,
}

impl ScoringMode {
    #[must_use]
    pub fn tracks_net(self) -> bool {
        matches!(self, Self::Net | Self::Both)
    }
}

impl fmt::Display for ScoringMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScoringMode::Gross => "gross",
            ScoringMode::Net => "net",
            ScoringMode::Both => "both",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ScoringMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gross" => Ok(Self::Gross),
            "net" => Ok(Self::Net),
            "both" => Ok(Self::Both),
            other => Err(CoreError::Parse(format!("unknown scoring mode '{other}'"))),
        }
    }
}

/// The figure a snapshot row was computed for. A `both` competition is
/// snapshotted once per type.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ScoringType {
    Gross,
    Net,
}

impl ScoringType {
    #[must_use]
    pub fn as_mode(self) -> ScoringMode {
        match self {
            ScoringType::Gross => ScoringMode::Gross,
            ScoringType::Net => ScoringMode::Net,
        }
    }
}

impl fmt::Display for ScoringType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScoringType::Gross => "gross",
            ScoringType::Net => "net",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ScoringType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gross" => Ok(Self::Gross),
            "net" => Ok(Self::Net),
            other => Err(CoreError::Parse(format!("unknown scoring type '{other}'"))),
        }
    }
}

/// Game format of a competition. Stroke play is the only format scored today.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum GameFormat {
    #[default]
    StrokePlay,
}

impl FromStr for GameFormat {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stroke_play" | "strokeplay" => Ok(Self::StrokePlay),
            other => Err(CoreError::Parse(format!("unknown game format '{other}'"))),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TeeRating {
    pub gender: Gender,
    pub course_rating: f64,
    #[serde(default = "default_slope_rating")]
    pub slope_rating: i32,
}

fn default_slope_rating() -> i32 {
    113
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tee {
    pub tee_id: i64,
    pub name: String,
    pub course_rating: Option<f64>,
    pub slope_rating: Option<i32>,
    #[serde(default)]
    pub ratings: Vec<TeeRating>,
    pub stroke_index: Option<Vec<i32>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Course {
    pub course_id: i64,
    pub name: String,
    pub pars: Vec<i32>,
    pub stroke_index: Option<Vec<i32>>,
}

impl Course {
    #[must_use]
    pub fn total_par(&self) -> i32 {
        self.pars.iter().sum()
    }

    #[must_use]
    pub fn hole_count(&self) -> usize {
        self.pars.len()
    }

    #[must_use]
    pub fn par_summary(&self) -> ParSummary {
        ParSummary::from_pars(&self.pars)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ParSummary {
    pub front: i32,
    pub back: i32,
    pub total: i32,
}

impl ParSummary {
    /// Front is the first half of the holes, back the remainder.
    #[must_use]
    pub fn from_pars(pars: &[i32]) -> Self {
        let split = pars.len().div_ceil(2);
        let front = pars[..split].iter().sum();
        let back = pars[split..].iter().sum();
        Self {
            front,
            back,
            total: front + back,
        }
    }
}

/// Points awarded per finishing position, keyed by the position as a string,
/// with a `"default"` entry for positions the table doesn't list. Values are
/// `i32` so every one converts to `f64` exactly.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
#[serde(transparent)]
pub struct PointsTable(pub BTreeMap<String, i32>);

impl PointsTable {
    pub const DEFAULT_KEY: &'static str = "default";

    #[must_use]
    pub fn lookup(&self, position: usize) -> Option<i32> {
        self.0
            .get(&position.to_string())
            .or_else(|| self.0.get(Self::DEFAULT_KEY))
            .copied()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Tour {
    pub tour_id: i64,
    pub name: String,
    pub points_table: PointsTable,
    pub scoring_mode: ScoringMode,
}

/// When a competition may be scored. The window-closed flag on
/// [`Competition`] is the authoritative fact for DNF purposes; the schedule
/// only drives finalization eligibility.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompetitionSchedule {
    Scheduled {
        date: NaiveDate,
    },
    OpenWindow {
        start: Option<NaiveDateTime>,
        end: NaiveDateTime,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Competition {
    pub competition_id: i64,
    pub name: String,
    pub course_id: i64,
    pub tour_id: Option<i64>,
    pub points_multiplier: f64,
    pub scoring_mode: ScoringMode,
    pub game_format: GameFormat,
    pub schedule: CompetitionSchedule,
    pub window_closed: bool,
    pub is_results_final: bool,
    pub results_finalized_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Team {
    pub team_id: i64,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Participant {
    pub participant_id: i64,
    pub competition_id: i64,
    pub player_name: String,
    pub gender: Option<Gender>,
    pub handicap_index: Option<f64>,
    pub tee_id: Option<i64>,
    pub team_id: Option<i64>,
    pub tee_time_id: Option<i64>,
    pub score: Vec<i32>,
    pub manual_total: Option<i32>,
    pub is_dq: bool,
    pub is_locked: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct LeaderboardEntry {
    pub participant_id: i64,
    pub player_name: String,
    pub team_id: Option<i64>,
    pub tee_time_id: Option<i64>,
    pub gross_total: i32,
    pub holes_played: usize,
    pub relative_to_par: i32,
    pub course_handicap: Option<i32>,
    pub net_total: Option<i32>,
    pub net_relative_to_par: Option<i32>,
    /// Competition rank; 0 when excluded (DQ or DNF).
    pub position: usize,
    pub points: Option<f64>,
    pub is_dq: bool,
    pub is_dnf: bool,
    /// Display-only handicap stroke allocation, empty without a handicap.
    pub strokes_received: Vec<i32>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Leaderboard {
    pub competition_id: i64,
    pub scoring_mode: ScoringMode,
    pub entries: Vec<LeaderboardEntry>,
    pub is_projected: bool,
    pub finalized_at: Option<NaiveDateTime>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamStatus {
    NotStarted,
    InProgress,
    Finished,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct TeamEntry {
    pub team_id: i64,
    pub team_name: String,
    pub member_ids: Vec<i64>,
    pub gross_total: i32,
    pub relative_to_par: i32,
    pub holes_played: usize,
    pub status: TeamStatus,
    /// Competition rank among started teams; 0 for teams not yet started.
    pub position: usize,
}

/// One immutable snapshot row per participant per scoring type.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CompetitionResult {
    pub competition_id: i64,
    pub participant_id: i64,
    pub scoring_type: ScoringType,
    pub position: usize,
    pub points: Option<f64>,
    pub gross_total: i32,
    pub net_total: Option<i32>,
    pub relative_to_par: i32,
    pub net_relative_to_par: Option<i32>,
    pub holes_played: usize,
    pub is_dq: bool,
    pub is_dnf: bool,
    pub created_at: NaiveDateTime,
}
