use std::sync::Arc;

use bee_core::catalog::Catalog;
use storage::repository::{Storage, StorageBackend};

use crate::Clock;
use crate::catalog_service::{PopulateReport, populate, refresh_enrichment};
use crate::drill_service::DrillService;
use crate::enrichment::EnrichmentSource;
use crate::error::AppServicesError;
use crate::learner_service::LearnerService;
use crate::sessions::{SessionStore, SessionWorkflow};

/// Assembles app-facing services over one storage backend.
#[derive(Clone)]
pub struct AppServices {
    storage: Storage,
    drill: Arc<DrillService>,
    learners: Arc<LearnerService>,
    sessions: Arc<SessionWorkflow>,
}

impl AppServices {
    /// Open `backend` and wire the services over it.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn open(backend: &StorageBackend, clock: Clock) -> Result<Self, AppServicesError> {
        let storage = Storage::open(backend).await?;
        Ok(Self::from_storage(storage, clock))
    }

    #[must_use]
    pub fn from_storage(storage: Storage, clock: Clock) -> Self {
        let drill = Arc::new(DrillService::new(
            clock,
            Arc::clone(&storage.words),
            Arc::clone(&storage.progress),
        ));
        Self::with_drill(storage, clock, drill)
    }

    /// Same as `from_storage` with a caller-built drill service (seeded RNG, custom scheduler).
    #[must_use]
    pub fn with_drill(storage: Storage, clock: Clock, drill: Arc<DrillService>) -> Self {
        let learners = Arc::new(LearnerService::new(clock, Arc::clone(&storage.learners)));
        let sessions = Arc::new(SessionWorkflow::new(
            Arc::clone(&drill),
            Arc::new(SessionStore::new()),
        ));
        Self {
            storage,
            drill,
            learners,
            sessions,
        }
    }

    /// Load the catalog if the store is empty and seed the configured learners.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` on storage or enrichment failures.
    pub async fn bootstrap(
        &self,
        catalog: &Catalog,
        source: &dyn EnrichmentSource,
        learner_names: &[String],
    ) -> Result<PopulateReport, AppServicesError> {
        let report = populate(self.storage.words.as_ref(), catalog, source).await?;
        self.learners.seed_if_empty(learner_names).await?;
        Ok(report)
    }

    /// Push dictionary data from `source` onto words already stored.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` on storage or enrichment failures.
    pub async fn refresh_enrichment(
        &self,
        catalog: &Catalog,
        source: &dyn EnrichmentSource,
    ) -> Result<u32, AppServicesError> {
        Ok(refresh_enrichment(self.storage.words.as_ref(), catalog, source).await?)
    }

    #[must_use]
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    #[must_use]
    pub fn drill(&self) -> Arc<DrillService> {
        Arc::clone(&self.drill)
    }

    #[must_use]
    pub fn learners(&self) -> Arc<LearnerService> {
        Arc::clone(&self.learners)
    }

    #[must_use]
    pub fn sessions(&self) -> Arc<SessionWorkflow> {
        Arc::clone(&self.sessions)
    }
}
