use chrono::{NaiveDate, NaiveDateTime};

use crate::error::CoreError;

pub const DB_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const DB_DATE_FORMAT: &str = "%Y-%m-%d";

#[must_use]
pub fn format_db_timestamp(ts: NaiveDateTime) -> String {
    ts.format(DB_TIMESTAMP_FORMAT).to_string()
}

/// Accepts `YYYY-MM-DD HH:MM:SS` and the `T`-separated RFC 3339 local form.
///
/// # Errors
///
/// Will return `Err` if the text is neither format
pub fn parse_db_timestamp(text: &str) -> Result<NaiveDateTime, CoreError> {
    let text = text.trim();
    NaiveDateTime::parse_from_str(text, DB_TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| CoreError::Parse(format!("bad timestamp '{text}': {e}")))
}

/// # Errors
///
/// Will return `Err` if the text isn't `YYYY-MM-DD`
pub fn parse_db_date(text: &str) -> Result<NaiveDate, CoreError> {
    let text = text.trim();
    NaiveDate::parse_from_str(text, DB_DATE_FORMAT)
        .map_err(|e| CoreError::Parse(format!("bad date '{text}': {e}")))
}
