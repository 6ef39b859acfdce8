use chrono::NaiveDateTime;
use std::{fs, path::PathBuf};

use super::types::Args;
use crate::config::EngineConfig;
use crate::controller::db_prefill::Seed;
use crate::model::parse_db_timestamp;

/// # Errors
///
/// Will return `Err` if any of the `;`-separated files is not readable
pub fn check_readable_file(file: &str) -> Result<String, String> {
    for file in file.split(';').map(str::trim).filter(|f| !f.is_empty()) {
        let path = PathBuf::from(file);
        if !path.is_file() || fs::metadata(&path).is_err() {
            return Err(format!("The sql startup script '{file}' is not readable."));
        }
    }
    Ok(file.to_string())
}

fn read_readable(file: &str, what: &str) -> Result<String, String> {
    let path = PathBuf::from(file);
    if !path.is_file() {
        return Err(format!("The {what} '{file}' is not readable."));
    }
    fs::read_to_string(&path).map_err(|e| format!("The {what} '{file}' is not readable: {e}"))
}

/// # Errors
///
/// Will return `Err` if the file is not readable or is not a valid seed document
pub fn check_readable_file_and_json(file: &str) -> Result<Seed, String> {
    let contents = read_readable(file, "json file")?;
    let seed: Seed = serde_json::from_str(&contents)
        .map_err(|e| format!("The json file '{file}' is not in the correct format: {e}"))?;
    seed.validate().map_err(|e| e.to_string())?;
    Ok(seed)
}

/// # Errors
///
/// Will return `Err` if the file is not readable or holds an unusable config
pub fn check_engine_config(file: &str) -> Result<EngineConfig, String> {
    read_readable(file, "engine config")?;
    EngineConfig::from_json_file(file).map_err(|e| e.to_string())
}

/// # Errors
///
/// Will return `Err` if the text isn't a `YYYY-MM-DD HH:MM:SS` timestamp
pub fn check_timestamp(text: &str) -> Result<NaiveDateTime, String> {
    parse_db_timestamp(text).map_err(|e| e.to_string())
}

impl Args {
    /// # Errors
    ///
    /// Will return `Err` if the database name is blank
    pub fn validate(&self) -> Result<(), String> {
        if self.db_name.trim().is_empty() {
            return Err("Database name is required".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_startup_script_is_rejected() {
        let err = check_readable_file("Cargo.toml;does/not/exist.sql").unwrap_err();
        assert!(err.contains("does/not/exist.sql"));
        assert!(check_readable_file("Cargo.toml").is_ok());
    }

    #[test]
    fn timestamps_use_the_db_format() {
        assert!(check_timestamp("2024-05-05 08:00:00").is_ok());
        assert!(check_timestamp("yesterday").is_err());
    }
}
