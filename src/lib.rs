pub mod args;
pub mod config;
pub mod controller {
    pub mod db_prefill;
}
pub mod error;
pub mod model;
pub mod score;
pub mod storage;

pub use config::{EngineConfig, HandicapConfig, NetFallback};
pub use error::CoreError;
pub use storage::{SqliteStorage, Storage, StorageError};
