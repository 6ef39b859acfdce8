use async_trait::async_trait;
use chrono::NaiveDateTime;
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params};
use serde::de::DeserializeOwned;
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::{SnapshotBuilder, SnapshotWrite, Storage, StorageError};
use crate::error::CoreError;
use crate::model::{
    Competition, CompetitionResult, CompetitionSchedule, Course, Participant, ScoringType, Team,
    Tee, TeeRating, Tour, format_db_timestamp, parse_db_date, parse_db_timestamp,
};
use crate::score::context::CompetitionContext;

pub const TABLES_AND_DDL: &[(&str, &str)] = &[
    ("tour", include_str!("../sql/schema/sqlite/01_tour.sql")),
    ("course", include_str!("../sql/schema/sqlite/02_course.sql")),
    ("tee", include_str!("../sql/schema/sqlite/03_tee.sql")),
    (
        "competition",
        include_str!("../sql/schema/sqlite/04_competition.sql"),
    ),
    (
        "participant",
        include_str!("../sql/schema/sqlite/05_participant.sql"),
    ),
    (
        "competition_result",
        include_str!("../sql/schema/sqlite/06_competition_result.sql"),
    ),
];

pub const DROP_TABLES: &str = include_str!("../sql/schema/sqlite/00_table_drop.sql");

const GET_COMPETITION: &str = include_str!("../sql/functions/sqlite/01_get_competition.sql");
const GET_PARTICIPANTS: &str = include_str!("../sql/functions/sqlite/02_get_participants.sql");
const GET_RESULTS: &str = include_str!("../sql/functions/sqlite/03_get_results.sql");
const INSERT_RESULT: &str = include_str!("../sql/functions/sqlite/04_insert_result.sql");
const LIST_UNFINALIZED: &str =
    include_str!("../sql/functions/sqlite/05_list_unfinalized_competitions.sql");
const GET_HOLE_ENTRY_STATE: &str =
    include_str!("../sql/functions/sqlite/06_get_hole_entry_state.sql");

/// [`Storage`] over a single SQLite connection. Calls run on tokio's
/// blocking pool, one at a time.
#[derive(Clone)]
pub struct SqliteStorage {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStorage {
    /// Open (or create) a database file. `:memory:` and `file:` URIs work too.
    ///
    /// # Errors
    ///
    /// Will return `Err` if sqlite can't open the database
    pub fn open(db_name: &str) -> Result<Self, StorageError> {
        let conn = Connection::open(db_name)?;
        Self::from_connection(conn)
    }

    /// # Errors
    ///
    /// Will return `Err` if sqlite can't allocate the database
    pub fn open_in_memory() -> Result<Self, StorageError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create every table that doesn't exist yet.
    ///
    /// # Errors
    ///
    /// Will return `Err` if any DDL statement fails
    pub async fn create_schema(&self) -> Result<(), StorageError> {
        let ddl = TABLES_AND_DDL
            .iter()
            .map(|(_, sql)| *sql)
            .collect::<Vec<_>>()
            .join("\n");
        self.execute_batch(&ddl).await
    }

    /// Run a batch of statements inside one transaction.
    ///
    /// # Errors
    ///
    /// Will return `Err` if any statement fails; nothing is applied then
    pub async fn execute_batch(&self, sql: &str) -> Result<(), StorageError> {
        let sql = sql.to_owned();
        self.interact(move |conn| {
            let tx = conn.transaction()?;
            tx.execute_batch(&sql)?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    pub(crate) async fn interact<F, T>(&self, f: F) -> Result<T, StorageError>
    where
        F: FnOnce(&mut Connection) -> Result<T, StorageError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| StorageError::db("sqlite connection mutex poisoned"))?;
            f(&mut *guard)
        })
        .await
        .map_err(|e| StorageError::db(format!("sqlite task failed: {e}")))?
    }

    /// Flip one participant column, refusing once the competition is final
    /// (and, when `respect_lock` is set, once the participant is locked).
    async fn update_participant(
        &self,
        participant_id: i64,
        respect_lock: bool,
        sql: &'static str,
        value: Value,
    ) -> Result<(), StorageError> {
        self.interact(move |conn| {
            let tx = conn.transaction()?;
            let (_, is_locked, is_final, _) = hole_entry_state(&tx, participant_id)?;
            if is_final {
                return Err(StorageError::Locked(format!(
                    "results for participant {participant_id}'s competition are final"
                )));
            }
            if respect_lock && is_locked {
                return Err(StorageError::Locked(format!(
                    "participant {participant_id} is locked"
                )));
            }
            tx.execute(sql, params![value, participant_id])?;
            tx.commit()?;
            Ok(())
        })
        .await
    }
}

fn conversion_err(
    row: &Row<'_>,
    column: &str,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    let idx = row.as_ref().column_index(column).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, column: &str) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    serde_json::from_str(&text).map_err(|e| conversion_err(row, column, e))
}

fn opt_json_column<T: DeserializeOwned>(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(column)?;
    text.map(|t| serde_json::from_str(&t).map_err(|e| conversion_err(row, column, e)))
        .transpose()
}

fn parsed_column<T: FromStr<Err = CoreError>>(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<T> {
    let text: String = row.get(column)?;
    text.parse().map_err(|e: CoreError| conversion_err(row, column, e))
}

fn opt_parsed_column<T: FromStr<Err = CoreError>>(
    row: &Row<'_>,
    column: &str,
) -> rusqlite::Result<Option<T>> {
    let text: Option<String> = row.get(column)?;
    text.map(|t| t.parse().map_err(|e: CoreError| conversion_err(row, column, e)))
        .transpose()
}

fn opt_timestamp_column(row: &Row<'_>, column: &str) -> rusqlite::Result<Option<NaiveDateTime>> {
    let text: Option<String> = row.get(column)?;
    text.map(|t| parse_db_timestamp(&t).map_err(|e| conversion_err(row, column, e)))
        .transpose()
}

fn usize_column(row: &Row<'_>, column: &str) -> rusqlite::Result<usize> {
    let value: i64 = row.get(column)?;
    usize::try_from(value).map_err(|e| conversion_err(row, column, e))
}

fn competition_from_row(row: &Row<'_>) -> rusqlite::Result<Competition> {
    let kind: String = row.get("schedule_kind")?;
    let schedule = match kind.as_str() {
        "scheduled" => {
            let text: Option<String> = row.get("competition_date")?;
            let text = text.ok_or_else(|| {
                conversion_err(
                    row,
                    "competition_date",
                    CoreError::Parse("scheduled competition without a date".to_string()),
                )
            })?;
            CompetitionSchedule::Scheduled {
                date: parse_db_date(&text).map_err(|e| conversion_err(row, "competition_date", e))?,
            }
        }
        "open_window" => CompetitionSchedule::OpenWindow {
            start: opt_timestamp_column(row, "window_start")?,
            end: opt_timestamp_column(row, "window_end")?.ok_or_else(|| {
                conversion_err(
                    row,
                    "window_end",
                    CoreError::Parse("open window competition without an end".to_string()),
                )
            })?,
        },
        other => {
            return Err(conversion_err(
                row,
                "schedule_kind",
                CoreError::Parse(format!("unknown schedule kind '{other}'")),
            ));
        }
    };

    Ok(Competition {
        competition_id: row.get("competition_id")?,
        name: row.get("name")?,
        course_id: row.get("course_id")?,
        tour_id: row.get("tour_id")?,
        points_multiplier: row.get("points_multiplier")?,
        scoring_mode: parsed_column(row, "scoring_mode")?,
        game_format: parsed_column(row, "game_format")?,
        schedule,
        window_closed: row.get("window_closed")?,
        is_results_final: row.get("is_results_final")?,
        results_finalized_at: opt_timestamp_column(row, "results_finalized_at")?,
    })
}

fn participant_from_row(row: &Row<'_>) -> rusqlite::Result<Participant> {
    Ok(Participant {
        participant_id: row.get("participant_id")?,
        competition_id: row.get("competition_id")?,
        player_name: row.get("player_name")?,
        gender: opt_parsed_column(row, "gender")?,
        handicap_index: row.get("handicap_index")?,
        tee_id: row.get("tee_id")?,
        team_id: row.get("team_id")?,
        tee_time_id: row.get("tee_time_id")?,
        score: json_column(row, "score")?,
        manual_total: row.get("manual_total")?,
        is_dq: row.get("is_dq")?,
        is_locked: row.get("is_locked")?,
    })
}

fn result_from_row(row: &Row<'_>) -> rusqlite::Result<CompetitionResult> {
    let created_at: String = row.get("created_at")?;
    Ok(CompetitionResult {
        competition_id: row.get("competition_id")?,
        participant_id: row.get("participant_id")?,
        scoring_type: parsed_column(row, "scoring_type")?,
        position: usize_column(row, "position")?,
        points: row.get("points")?,
        gross_total: row.get("gross_total")?,
        net_total: row.get("net_total")?,
        relative_to_par: row.get("relative_to_par")?,
        net_relative_to_par: row.get("net_relative_to_par")?,
        holes_played: usize_column(row, "holes_played")?,
        is_dq: row.get("is_dq")?,
        is_dnf: row.get("is_dnf")?,
        created_at: parse_db_timestamp(&created_at)
            .map_err(|e| conversion_err(row, "created_at", e))?,
    })
}

/// Score, lock flag, final flag and pars for one participant.
fn hole_entry_state(
    conn: &Connection,
    participant_id: i64,
) -> Result<(Vec<i32>, bool, bool, Vec<i32>), StorageError> {
    conn.query_row(GET_HOLE_ENTRY_STATE, params![participant_id], |row| {
        Ok((
            json_column::<Vec<i32>>(row, "score")?,
            row.get::<_, bool>("is_locked")?,
            row.get::<_, bool>("is_results_final")?,
            json_column::<Vec<i32>>(row, "pars")?,
        ))
    })
    .optional()?
    .ok_or_else(|| StorageError::NotFound(format!("participant {participant_id}")))
}

fn read_competition(conn: &Connection, competition_id: i64) -> Result<Competition, StorageError> {
    conn.query_row(GET_COMPETITION, params![competition_id], competition_from_row)
        .optional()?
        .ok_or_else(|| StorageError::NotFound(format!("competition {competition_id}")))
}

fn read_course(conn: &Connection, course_id: i64) -> Result<Course, StorageError> {
    conn.query_row(
        "SELECT course_id, name, pars, stroke_index FROM course WHERE course_id = ?1",
        params![course_id],
        |row| {
            Ok(Course {
                course_id: row.get("course_id")?,
                name: row.get("name")?,
                pars: json_column(row, "pars")?,
                stroke_index: opt_json_column(row, "stroke_index")?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| StorageError::NotFound(format!("course {course_id}")))
}

fn read_tees(conn: &Connection, course_id: i64) -> Result<Vec<Tee>, StorageError> {
    let mut tees = {
        let mut stmt = conn.prepare(
            "SELECT tee_id, name, course_rating, slope_rating, stroke_index
             FROM tee WHERE course_id = ?1 ORDER BY tee_id",
        )?;
        let tees = stmt
            .query_map(params![course_id], |row| {
                Ok(Tee {
                    tee_id: row.get("tee_id")?,
                    name: row.get("name")?,
                    course_rating: row.get("course_rating")?,
                    slope_rating: row.get("slope_rating")?,
                    ratings: vec![],
                    stroke_index: opt_json_column(row, "stroke_index")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        tees
    };

    let mut stmt = conn.prepare(
        "SELECT tr.tee_id, tr.gender, tr.course_rating, tr.slope_rating
         FROM tee_rating tr
         JOIN tee t ON t.tee_id = tr.tee_id
         WHERE t.course_id = ?1
         ORDER BY tr.tee_id, tr.gender",
    )?;
    let ratings = stmt
        .query_map(params![course_id], |row| {
            Ok((
                row.get::<_, i64>("tee_id")?,
                TeeRating {
                    gender: parsed_column(row, "gender")?,
                    course_rating: row.get("course_rating")?,
                    slope_rating: row.get("slope_rating")?,
                },
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;

    for (tee_id, rating) in ratings {
        if let Some(tee) = tees.iter_mut().find(|t| t.tee_id == tee_id) {
            tee.ratings.push(rating);
        }
    }
    Ok(tees)
}

fn read_tour(conn: &Connection, tour_id: i64) -> Result<Tour, StorageError> {
    conn.query_row(
        "SELECT tour_id, name, points_table, scoring_mode FROM tour WHERE tour_id = ?1",
        params![tour_id],
        |row| {
            Ok(Tour {
                tour_id: row.get("tour_id")?,
                name: row.get("name")?,
                points_table: json_column(row, "points_table")?,
                scoring_mode: parsed_column(row, "scoring_mode")?,
            })
        },
    )
    .optional()?
    .ok_or_else(|| StorageError::NotFound(format!("tour {tour_id}")))
}

fn read_participants(
    conn: &Connection,
    competition_id: i64,
) -> Result<Vec<Participant>, StorageError> {
    let mut stmt = conn.prepare(GET_PARTICIPANTS)?;
    let participants = stmt
        .query_map(params![competition_id], participant_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(participants)
}

fn read_teams(conn: &Connection, competition_id: i64) -> Result<Vec<Team>, StorageError> {
    let mut stmt =
        conn.prepare("SELECT team_id, name FROM team WHERE competition_id = ?1 ORDER BY team_id")?;
    let teams = stmt
        .query_map(params![competition_id], |row| {
            Ok(Team {
                team_id: row.get("team_id")?,
                name: row.get("name")?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(teams)
}

/// The same context `load_competition_context` assembles, read on one
/// connection so it can sit inside a caller's transaction.
fn read_context(
    conn: &Connection,
    competition_id: i64,
) -> Result<CompetitionContext, StorageError> {
    let competition = read_competition(conn, competition_id)?;
    let course = read_course(conn, competition.course_id)?;
    let tees = read_tees(conn, competition.course_id)?;
    let tour = competition
        .tour_id
        .map(|tour_id| read_tour(conn, tour_id))
        .transpose()?;
    let participants = read_participants(conn, competition_id)?;
    let teams = read_teams(conn, competition_id)?;
    Ok(CompetitionContext {
        competition,
        course,
        tees,
        tour,
        participants,
        teams,
    })
}

/// Insert the snapshot rows and flag the competition final. The caller owns
/// the transaction and has already checked the competition isn't final.
fn write_snapshot(
    tx: &Transaction<'_>,
    competition_id: i64,
    results: &[CompetitionResult],
    finalized_at: NaiveDateTime,
) -> Result<usize, StorageError> {
    let mut written = 0;
    {
        let mut stmt = tx.prepare(INSERT_RESULT)?;
        for r in results {
            if r.competition_id != competition_id {
                return Err(StorageError::Invalid(format!(
                    "result for competition {} passed to competition {competition_id}",
                    r.competition_id
                )));
            }
            written += stmt.execute(params![
                r.competition_id,
                r.participant_id,
                r.scoring_type.to_string(),
                r.position as i64,
                r.points,
                r.gross_total,
                r.net_total,
                r.relative_to_par,
                r.net_relative_to_par,
                r.holes_played as i64,
                r.is_dq,
                r.is_dnf,
                format_db_timestamp(r.created_at),
            ])?;
        }
    }

    tx.execute(
        "UPDATE competition SET is_results_final = 1, results_finalized_at = ?2
         WHERE competition_id = ?1",
        params![competition_id, format_db_timestamp(finalized_at)],
    )?;
    Ok(written)
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn get_competition(&self, competition_id: i64) -> Result<Competition, StorageError> {
        self.interact(move |conn| read_competition(conn, competition_id)).await
    }

    async fn get_course(&self, course_id: i64) -> Result<Course, StorageError> {
        self.interact(move |conn| read_course(conn, course_id)).await
    }

    async fn get_tees(&self, course_id: i64) -> Result<Vec<Tee>, StorageError> {
        self.interact(move |conn| read_tees(conn, course_id)).await
    }

    async fn get_tour(&self, tour_id: i64) -> Result<Tour, StorageError> {
        self.interact(move |conn| read_tour(conn, tour_id)).await
    }

    async fn get_participants(
        &self,
        competition_id: i64,
    ) -> Result<Vec<Participant>, StorageError> {
        self.interact(move |conn| read_participants(conn, competition_id)).await
    }

    async fn get_participant(&self, participant_id: i64) -> Result<Participant, StorageError> {
        self.interact(move |conn| {
            conn.query_row(
                "SELECT participant_id, competition_id, player_name, gender, handicap_index,
                    tee_id, team_id, tee_time_id, score, manual_total, is_dq, is_locked
                 FROM participant WHERE participant_id = ?1",
                params![participant_id],
                participant_from_row,
            )
            .optional()?
            .ok_or_else(|| StorageError::NotFound(format!("participant {participant_id}")))
        })
        .await
    }

    async fn get_teams(&self, competition_id: i64) -> Result<Vec<Team>, StorageError> {
        self.interact(move |conn| read_teams(conn, competition_id)).await
    }

    async fn list_unfinalized_competitions(&self) -> Result<Vec<Competition>, StorageError> {
        self.interact(|conn| {
            let mut stmt = conn.prepare(LIST_UNFINALIZED)?;
            let competitions = stmt
                .query_map([], competition_from_row)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(competitions)
        })
        .await
    }

    async fn get_results(
        &self,
        competition_id: i64,
        scoring_type: ScoringType,
    ) -> Result<Vec<CompetitionResult>, StorageError> {
        self.interact(move |conn| {
            let mut stmt = conn.prepare(GET_RESULTS)?;
            let results = stmt
                .query_map(
                    params![competition_id, scoring_type.to_string()],
                    result_from_row,
                )?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(results)
        })
        .await
    }

    async fn store_results(
        &self,
        competition_id: i64,
        results: &[CompetitionResult],
        finalized_at: NaiveDateTime,
    ) -> Result<usize, StorageError> {
        let results = results.to_vec();
        self.interact(move |conn| {
            let tx = conn.transaction()?;
            let is_final: Option<bool> = tx
                .query_row(
                    "SELECT is_results_final FROM competition WHERE competition_id = ?1",
                    params![competition_id],
                    |row| row.get(0),
                )
                .optional()?;
            match is_final {
                None => {
                    return Err(StorageError::NotFound(format!(
                        "competition {competition_id}"
                    )));
                }
                Some(true) => return Ok(0),
                Some(false) => {}
            }

            let written = write_snapshot(&tx, competition_id, &results, finalized_at)?;
            tx.commit()?;
            Ok(written)
        })
        .await
    }

    async fn finalize_with(
        &self,
        competition_id: i64,
        finalized_at: NaiveDateTime,
        build: SnapshotBuilder,
    ) -> Result<SnapshotWrite, StorageError> {
        self.interact(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let ctx = read_context(&tx, competition_id)?;
            if ctx.competition.is_results_final {
                return Ok(SnapshotWrite::AlreadyFinal);
            }
            let Some(rows) = build(&ctx) else {
                return Ok(SnapshotWrite::Declined);
            };
            let written = write_snapshot(&tx, competition_id, &rows, finalized_at)?;
            tx.commit()?;
            Ok(SnapshotWrite::Written(written))
        })
        .await
    }

    async fn record_hole_score(
        &self,
        participant_id: i64,
        hole: usize,
        strokes: i32,
    ) -> Result<(), StorageError> {
        if strokes < -1 {
            return Err(StorageError::Invalid(format!(
                "{strokes} is not a stroke count, 0 or -1"
            )));
        }
        self.interact(move |conn| {
            let tx = conn.transaction()?;
            let (mut score, is_locked, is_final, pars) = hole_entry_state(&tx, participant_id)?;
            if is_final || is_locked {
                warn!(participant_id, hole, "rejected score entry on a locked card");
                return Err(StorageError::Locked(format!(
                    "participant {participant_id}'s card is locked"
                )));
            }
            if hole == 0 || hole > pars.len() {
                return Err(StorageError::Invalid(format!(
                    "hole {hole} is outside 1..={}",
                    pars.len()
                )));
            }
            if score.len() < hole {
                score.resize(hole, 0);
            }
            score[hole - 1] = strokes;
            tx.execute(
                "UPDATE participant SET score = ?1 WHERE participant_id = ?2",
                params![serde_json::to_string(&score)?, participant_id],
            )?;
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn set_manual_total(
        &self,
        participant_id: i64,
        manual_total: Option<i32>,
    ) -> Result<(), StorageError> {
        let value = manual_total.map_or(Value::Null, |v| Value::Integer(i64::from(v)));
        self.update_participant(
            participant_id,
            true,
            "UPDATE participant SET manual_total = ?1 WHERE participant_id = ?2",
            value,
        )
        .await
    }

    async fn set_disqualified(
        &self,
        participant_id: i64,
        is_dq: bool,
    ) -> Result<(), StorageError> {
        self.update_participant(
            participant_id,
            false,
            "UPDATE participant SET is_dq = ?1 WHERE participant_id = ?2",
            Value::Integer(i64::from(is_dq)),
        )
        .await
    }

    async fn set_locked(&self, participant_id: i64, is_locked: bool) -> Result<(), StorageError> {
        self.update_participant(
            participant_id,
            false,
            "UPDATE participant SET is_locked = ?1 WHERE participant_id = ?2",
            Value::Integer(i64::from(is_locked)),
        )
        .await
    }
}
