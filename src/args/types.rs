use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use crate::config::EngineConfig;
use crate::controller::db_prefill::Seed;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The sqlite database file. `:memory:` works for a throwaway run.
    #[arg(short = 'n', long, value_name = "DATABASE_NAME")]
    pub db_name: String,
    /// If specified, these `;`-separated sql files are run on program startup. Be careful with the SQL you run here, don't mess up your own database.
    #[arg(long, value_name = "DATABASE_STARTUP_SCRIPT", value_parser = crate::args::validation::check_readable_file)]
    pub db_startup_script: Option<String>,
    /// Seed document loaded after the schema is created.
    #[arg(
        long,
        value_name = "DATABASE_POPULATE_JSON",
        value_parser = crate::args::validation::check_readable_file_and_json
    )]
    pub db_populate_json: Option<Seed>,
    /// Handicap and ranking settings; defaults apply to anything omitted.
    #[arg(
        long,
        value_name = "ENGINE_CONFIG",
        value_parser = crate::args::validation::check_engine_config
    )]
    pub engine_config: Option<EngineConfig>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Individual standings for a competition.
    Leaderboard { competition_id: i64 },
    /// Team standings for a competition.
    Teams { competition_id: i64 },
    /// Hole-by-hole card for a participant.
    Scorecard { participant_id: i64 },
    /// Set one hole of a participant's score (0 clears it, -1 is a pickup).
    Score {
        participant_id: i64,
        hole: usize,
        #[arg(allow_negative_numbers = true)]
        strokes: i32,
    },
    /// Snapshot a competition's results and mark them final.
    Finalize {
        competition_id: i64,
        /// Treat this as the current time, `YYYY-MM-DD HH:MM:SS`.
        #[arg(long, value_parser = crate::args::validation::check_timestamp)]
        now: Option<NaiveDateTime>,
    },
    /// Finalize every competition whose window has passed.
    FinalizeDue {
        #[arg(long, value_parser = crate::args::validation::check_timestamp)]
        now: Option<NaiveDateTime>,
    },
}

#[derive(Debug, Clone)]
pub struct CleanArgs {
    pub db_name: String,
    pub db_startup_script: Option<String>,
    pub combined_sql_script: String,
    pub db_populate_json: Option<Seed>,
    pub engine_config: EngineConfig,
    pub command: Command,
}
