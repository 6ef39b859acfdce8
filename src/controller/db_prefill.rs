use rusqlite::{Transaction, params};
use serde::Deserialize;
use tracing::info;

use crate::error::CoreError;
use crate::model::{
    CompetitionSchedule, DB_DATE_FORMAT, GameFormat, Gender, PointsTable, ScoringMode, Team, Tee,
    format_db_timestamp,
};
use crate::score::strokes::is_valid_stroke_index;
use crate::storage::{SqliteStorage, StorageError};

/// Seed document for a fresh database:
///
/// ```json
/// { "tours": [{"tour_id": 1, "name": "...", "points_table": {"1": 100, "default": 10}, "scoring_mode": "both"}],
///   "courses": [{"course_id": 1, "name": "...", "pars": [4, 3, ...], "tees": [{"tee_id": 1, "name": "White", "course_rating": 71.3, "slope_rating": 125}]}],
///   "competitions": [{"competition_id": 1, "name": "...", "course_id": 1, "tour_id": 1,
///                     "schedule": {"kind": "scheduled", "date": "2024-05-04"},
///                     "teams": [{"team_id": 1, "name": "..."}],
///                     "participants": [{"participant_id": 1, "player_name": "...", "score": [4, 5, ...]}]}] }
/// ```
#[derive(Deserialize, Clone, Debug, Default)]
pub struct Seed {
    #[serde(default)]
    pub tours: Vec<TourSeed>,
    #[serde(default)]
    pub courses: Vec<CourseSeed>,
    #[serde(default)]
    pub competitions: Vec<CompetitionSeed>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct TourSeed {
    pub tour_id: i64,
    pub name: String,
    #[serde(default)]
    pub points_table: PointsTable,
    #[serde(default)]
    pub scoring_mode: ScoringMode,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CourseSeed {
    pub course_id: i64,
    pub name: String,
    pub pars: Vec<i32>,
    pub stroke_index: Option<Vec<i32>>,
    #[serde(default)]
    pub tees: Vec<Tee>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CompetitionSeed {
    pub competition_id: i64,
    pub name: String,
    pub course_id: i64,
    pub tour_id: Option<i64>,
    #[serde(default = "default_multiplier")]
    pub points_multiplier: f64,
    #[serde(default)]
    pub scoring_mode: ScoringMode,
    #[serde(default)]
    pub game_format: GameFormat,
    pub schedule: CompetitionSchedule,
    #[serde(default)]
    pub window_closed: bool,
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub participants: Vec<ParticipantSeed>,
}

fn default_multiplier() -> f64 {
    1.0
}

#[derive(Deserialize, Clone, Debug)]
pub struct ParticipantSeed {
    pub participant_id: i64,
    pub player_name: String,
    pub gender: Option<Gender>,
    pub handicap_index: Option<f64>,
    pub tee_id: Option<i64>,
    pub team_id: Option<i64>,
    pub tee_time_id: Option<i64>,
    #[serde(default)]
    pub score: Vec<i32>,
    pub manual_total: Option<i32>,
    #[serde(default)]
    pub is_dq: bool,
    #[serde(default)]
    pub is_locked: bool,
}

impl Seed {
    /// Shape checks the schema can't express.
    ///
    /// # Errors
    ///
    /// Will return `Err` naming the first course or participant that doesn't fit
    pub fn validate(&self) -> Result<(), CoreError> {
        for course in &self.courses {
            if course.pars.is_empty() || course.pars.iter().any(|&p| p <= 0) {
                return Err(CoreError::Parse(format!(
                    "course {} needs a positive par for every hole",
                    course.course_id
                )));
            }
            let indexes = course
                .stroke_index
                .iter()
                .chain(course.tees.iter().filter_map(|t| t.stroke_index.as_ref()));
            for si in indexes {
                if si.len() != course.pars.len() || !is_valid_stroke_index(si) {
                    return Err(CoreError::Parse(format!(
                        "course {} has a stroke index that isn't a permutation of its holes",
                        course.course_id
                    )));
                }
            }
        }
        for competition in &self.competitions {
            for p in &competition.participants {
                if p.score.iter().any(|&s| s < -1) {
                    return Err(CoreError::Parse(format!(
                        "participant {} has a negative stroke count",
                        p.participant_id
                    )));
                }
            }
        }
        Ok(())
    }
}

fn json_text<T: serde::Serialize>(value: &T) -> Result<String, StorageError> {
    Ok(serde_json::to_string(value)?)
}

fn insert_course(tx: &Transaction<'_>, course: &CourseSeed) -> Result<(), StorageError> {
    let stroke_index = course.stroke_index.as_ref().map(json_text).transpose()?;
    tx.execute(
        "INSERT INTO course (course_id, name, pars, stroke_index) VALUES (?1, ?2, ?3, ?4)",
        params![
            course.course_id,
            course.name,
            json_text(&course.pars)?,
            stroke_index
        ],
    )?;
    for tee in &course.tees {
        let stroke_index = tee.stroke_index.as_ref().map(json_text).transpose()?;
        tx.execute(
            "INSERT INTO tee (tee_id, course_id, name, course_rating, slope_rating, stroke_index)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                tee.tee_id,
                course.course_id,
                tee.name,
                tee.course_rating,
                tee.slope_rating,
                stroke_index
            ],
        )?;
        for rating in &tee.ratings {
            tx.execute(
                "INSERT INTO tee_rating (tee_id, gender, course_rating, slope_rating)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    tee.tee_id,
                    rating.gender.to_string(),
                    rating.course_rating,
                    rating.slope_rating
                ],
            )?;
        }
    }
    Ok(())
}

fn insert_competition(tx: &Transaction<'_>, c: &CompetitionSeed) -> Result<(), StorageError> {
    let (kind, date, start, end) = match &c.schedule {
        CompetitionSchedule::Scheduled { date } => {
            ("scheduled", Some(date.format(DB_DATE_FORMAT).to_string()), None, None)
        }
        CompetitionSchedule::OpenWindow { start, end } => (
            "open_window",
            None,
            start.map(format_db_timestamp),
            Some(format_db_timestamp(*end)),
        ),
    };
    let game_format = match c.game_format {
        GameFormat::StrokePlay => "stroke_play",
    };
    tx.execute(
        "INSERT INTO competition (competition_id, name, course_id, tour_id, points_multiplier,
             scoring_mode, game_format, schedule_kind, competition_date, window_start, window_end,
             window_closed)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            c.competition_id,
            c.name,
            c.course_id,
            c.tour_id,
            c.points_multiplier,
            c.scoring_mode.to_string(),
            game_format,
            kind,
            date,
            start,
            end,
            c.window_closed
        ],
    )?;
    for team in &c.teams {
        tx.execute(
            "INSERT INTO team (team_id, competition_id, name) VALUES (?1, ?2, ?3)",
            params![team.team_id, c.competition_id, team.name],
        )?;
    }
    for p in &c.participants {
        tx.execute(
            "INSERT INTO participant (participant_id, competition_id, player_name, gender,
                 handicap_index, tee_id, team_id, tee_time_id, score, manual_total, is_dq, is_locked)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                p.participant_id,
                c.competition_id,
                p.player_name,
                p.gender.map(|g| g.to_string()),
                p.handicap_index,
                p.tee_id,
                p.team_id,
                p.tee_time_id,
                json_text(&p.score)?,
                p.manual_total,
                p.is_dq,
                p.is_locked
            ],
        )?;
    }
    Ok(())
}

/// Load a seed document. Either everything lands or nothing does.
///
/// # Errors
///
/// Will return `Err` if the seed fails validation or any insert fails
pub async fn db_prefill(seed: &Seed, storage: &SqliteStorage) -> Result<(), CoreError> {
    seed.validate()?;
    let seed = seed.clone();
    let (tours, courses, competitions) = (
        seed.tours.len(),
        seed.courses.len(),
        seed.competitions.len(),
    );
    storage
        .interact(move |conn| {
            let tx = conn.transaction()?;
            for tour in &seed.tours {
                tx.execute(
                    "INSERT INTO tour (tour_id, name, points_table, scoring_mode)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        tour.tour_id,
                        tour.name,
                        json_text(&tour.points_table)?,
                        tour.scoring_mode.to_string()
                    ],
                )?;
            }
            for course in &seed.courses {
                insert_course(&tx, course)?;
            }
            for competition in &seed.competitions {
                insert_competition(&tx, competition)?;
            }
            tx.commit()?;
            Ok(())
        })
        .await?;
    info!(tours, courses, competitions, "prefilled database");
    Ok(())
}
