use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use golf_standings::args::{self, CleanArgs, Command};
use golf_standings::controller::db_prefill;
use golf_standings::score::{
    finalize_competition_results, finalize_due_competitions, get_leaderboard, get_scorecard,
    get_team_leaderboard,
};
use golf_standings::{SqliteStorage, Storage};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = args::args_checks()?;
    let storage = SqliteStorage::open(&args.db_name)?;
    storage.create_schema().await?;
    run_startup_tasks(&args, &storage).await?;
    run_command(&args, &storage).await
}

async fn run_startup_tasks(
    args: &CleanArgs,
    storage: &SqliteStorage,
) -> Result<(), Box<dyn std::error::Error>> {
    if !args.combined_sql_script.is_empty() {
        storage.execute_batch(&args.combined_sql_script).await?;
    }

    if let Some(seed) = &args.db_populate_json {
        db_prefill::db_prefill(seed, storage).await?;
    }

    Ok(())
}

fn now_or(now: Option<NaiveDateTime>) -> NaiveDateTime {
    now.unwrap_or_else(|| Local::now().naive_local())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run_command(
    args: &CleanArgs,
    storage: &SqliteStorage,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = &args.engine_config;
    match &args.command {
        Command::Leaderboard { competition_id } => {
            print_json(&get_leaderboard(storage, config, *competition_id).await?)
        }
        Command::Teams { competition_id } => {
            print_json(&get_team_leaderboard(storage, config, *competition_id).await?)
        }
        Command::Scorecard { participant_id } => {
            print_json(&get_scorecard(storage, config, *participant_id).await?)
        }
        Command::Score {
            participant_id,
            hole,
            strokes,
        } => {
            storage
                .record_hole_score(*participant_id, *hole, *strokes)
                .await?;
            print_json(&get_scorecard(storage, config, *participant_id).await?)
        }
        Command::Finalize {
            competition_id,
            now,
        } => print_json(
            &finalize_competition_results(storage, config, *competition_id, now_or(*now)).await?,
        ),
        Command::FinalizeDue { now } => {
            print_json(&finalize_due_competitions(storage, config, now_or(*now)).await?)
        }
    }
}
