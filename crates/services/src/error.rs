//! Shared error types for the services crate.

use thiserror::Error;

use bee_core::catalog::CatalogError;
use bee_core::model::WordId;
use bee_core::scheduler::SchedulerError;
use storage::repository::StorageError;
use storage::sqlite::SqliteInitError;

/// Errors emitted by `DrillService` and the session workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DrillError {
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error("word {0} not found")]
    WordNotFound(WordId),
}

/// Errors emitted while looking up or fetching dictionary data.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EnrichmentError {
    #[error("dictionary request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

/// Errors emitted while loading the catalog into storage.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PopulateError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Errors emitted while bootstrapping app services.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppServicesError {
    #[error(transparent)]
    Sqlite(#[from] SqliteInitError),
    #[error(transparent)]
    Storage(#[from] StorageError),
    #[error(transparent)]
    Populate(#[from] PopulateError),
}
