use serde::{Deserialize, Serialize};

use crate::model::types::ParSummary;

/// Marker stored for a hole the player picked up on.
pub const PICKED_UP: i32 = -1;
/// Marker stored for a hole with nothing reported yet.
pub const NOT_PLAYED: i32 = 0;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HoleLine {
    pub hole: usize,
    pub par: i32,
    pub stroke_index: i32,
    pub strokes: i32,
    pub handicap_strokes: i32,
    pub score_display: ScoreDisplay,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct NineTotals {
    pub front: i32,
    pub back: i32,
    pub total: i32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Scorecard {
    pub participant_id: i64,
    pub player_name: String,
    pub course_handicap: Option<i32>,
    pub par: ParSummary,
    pub gross: NineTotals,
    pub holes: Vec<HoleLine>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub enum ScoreDisplay {
    NotPlayed,
    PickedUp,
    Condor,
    Albatross,
    Eagle,
    Birdie,
    Par,
    Bogey,
    DoubleBogey,
    TripleBogey,
    QuadrupleBogey,
    Worse,
}

impl ScoreDisplay {
    #[must_use]
    pub fn from_strokes(strokes: i32, par: i32) -> Self {
        match strokes {
            NOT_PLAYED => Self::NotPlayed,
            PICKED_UP => Self::PickedUp,
            s if s < 0 => Self::PickedUp,
            s => Self::from_i32(s - par),
        }
    }

    /// Classify a strokes-minus-par difference.
    #[must_use]
    pub fn from_i32(i: i32) -> Self {
        match i {
            i32::MIN..=-4 => Self::Condor,
            -3 => Self::Albatross,
            -2 => Self::Eagle,
            -1 => Self::Birdie,
            0 => Self::Par,
            1 => Self::Bogey,
            2 => Self::DoubleBogey,
            3 => Self::TripleBogey,
            4 => Self::QuadrupleBogey,
            _ => Self::Worse,
        }
    }
}

impl From<i32> for ScoreDisplay {
    fn from(value: i32) -> Self {
        Self::from_i32(value)
    }
}
