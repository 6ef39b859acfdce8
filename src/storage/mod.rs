use async_trait::async_trait;
use chrono::NaiveDateTime;
use thiserror::Error;

use crate::model::{
    Competition, CompetitionResult, Course, Participant, ScoringType, Team, Tee, Tour,
};
use crate::score::context::CompetitionContext;

pub mod sqlite;

pub use sqlite::SqliteStorage;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StorageError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Locked(String),
    #[error("{0}")]
    Invalid(String),
    #[error("{0}")]
    Db(String),
}

impl StorageError {
    #[must_use]
    pub fn db(message: impl Into<String>) -> Self {
        Self::Db(message.into())
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Db(err.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Db(format!("bad json column: {err}"))
    }
}

/// Turns the competition as it stands inside the finalize transaction into
/// snapshot rows. `None` leaves the competition untouched.
pub type SnapshotBuilder =
    Box<dyn FnOnce(&CompetitionContext) -> Option<Vec<CompetitionResult>> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotWrite {
    Written(usize),
    AlreadyFinal,
    Declined,
}

/// Read/write contract the engine needs from the competition store.
///
/// Everything returned is a snapshot: the engine never holds a borrow into
/// the store across a computation.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn get_competition(&self, competition_id: i64) -> Result<Competition, StorageError>;
    async fn get_course(&self, course_id: i64) -> Result<Course, StorageError>;
    async fn get_tees(&self, course_id: i64) -> Result<Vec<Tee>, StorageError>;
    async fn get_tour(&self, tour_id: i64) -> Result<Tour, StorageError>;
    async fn get_participants(&self, competition_id: i64)
    -> Result<Vec<Participant>, StorageError>;
    async fn get_participant(&self, participant_id: i64) -> Result<Participant, StorageError>;
    async fn get_teams(&self, competition_id: i64) -> Result<Vec<Team>, StorageError>;
    async fn list_unfinalized_competitions(&self) -> Result<Vec<Competition>, StorageError>;
    async fn get_results(
        &self,
        competition_id: i64,
        scoring_type: ScoringType,
    ) -> Result<Vec<CompetitionResult>, StorageError>;

    /// Write the snapshot rows and flag the competition final, all in one
    /// transaction. Returns the number of rows written; a competition that is
    /// already final writes nothing and returns 0.
    async fn store_results(
        &self,
        competition_id: i64,
        results: &[CompetitionResult],
        finalized_at: NaiveDateTime,
    ) -> Result<usize, StorageError>;

    /// Read the competition, build its snapshot with `build` and write it,
    /// with no score entry able to land between the read and the write.
    async fn finalize_with(
        &self,
        competition_id: i64,
        finalized_at: NaiveDateTime,
        build: SnapshotBuilder,
    ) -> Result<SnapshotWrite, StorageError>;

    /// Set one hole (1-based) of a participant's score.
    async fn record_hole_score(
        &self,
        participant_id: i64,
        hole: usize,
        strokes: i32,
    ) -> Result<(), StorageError>;
    async fn set_manual_total(
        &self,
        participant_id: i64,
        manual_total: Option<i32>,
    ) -> Result<(), StorageError>;
    async fn set_disqualified(&self, participant_id: i64, is_dq: bool)
    -> Result<(), StorageError>;
    async fn set_locked(&self, participant_id: i64, is_locked: bool) -> Result<(), StorageError>;
}
