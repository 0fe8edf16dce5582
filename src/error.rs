//! Error kinds for the ranking engine.
//!
//! All of these are recoverable. None of them leave a run or the persisted
//! list in a partially updated state.

use crate::item::Category;

/// Failure of the underlying key-value store.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by tournament runs and the ranking session.
#[derive(thiserror::Error, Debug)]
pub enum RankError {
    #[error("`{id}` is not part of the current matchup")]
    InvalidChoice { id: String },

    #[error("The draw has already been used in this run")]
    DrawAlreadyUsed,

    #[error("The run is complete; no matchup is awaiting a choice")]
    RunComplete,

    #[error("A {0} ranking run is already active")]
    RunAlreadyActive(Category),

    #[error("No {0} ranking run is active")]
    NoActiveRun(Category),

    #[error("The {0} ranking run still has matchups left")]
    RunInProgress(Category),

    #[error("`{id}` is already ranked")]
    AlreadyRanked { id: String },

    #[error("Pick between {min} and {max} favorites first (have {have})")]
    NotEnoughFavorites { have: usize, min: usize, max: usize },

    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StoreError),
}

pub type RankResult<T> = Result<T, RankError>;
