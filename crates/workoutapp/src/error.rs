use crate::import::ProviderError;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum WorkoutError {
    #[error("Workout not found: {0}")]
    WorkoutNotFound(Uuid),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Workout store is closed")]
    StoreClosed,

    #[error("Invalid storage key: {0:?}")]
    InvalidKey(String),

    #[error("Workout type must not be empty")]
    EmptyWorkoutType,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Import task failed: {0}")]
    Task(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, WorkoutError>;
