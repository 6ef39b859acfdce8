use golf_standings::{SqliteStorage, StorageError};

#[allow(dead_code)]
pub const CLUB_SEASON: &str = include_str!("../fixtures/club_season.sql");

/// Fresh in-memory store with the schema and `fixture_sql` loaded.
pub async fn setup_storage(fixture_sql: &str) -> Result<SqliteStorage, StorageError> {
    let storage = SqliteStorage::open_in_memory()?;
    storage
        .execute_batch(golf_standings::storage::sqlite::DROP_TABLES)
        .await?;
    storage.create_schema().await?;
    storage.execute_batch(fixture_sql).await?;
    Ok(storage)
}

#[allow(dead_code)]
pub fn at(text: &str) -> chrono::NaiveDateTime {
    golf_standings::model::parse_db_timestamp(text).expect("fixture timestamp")
}
