#![forbid(unsafe_code)]

pub mod app_services;
pub mod catalog_service;
pub mod drill_service;
pub mod enrichment;
pub mod error;
pub mod learner_service;
pub mod sessions;

pub use bee_core::Clock;

pub use app_services::AppServices;
pub use catalog_service::{PopulateReport, populate, refresh_enrichment};
pub use drill_service::DrillService;
pub use error::{AppServicesError, DrillError, EnrichmentError, PopulateError};
pub use learner_service::LearnerService;
pub use sessions::{AnswerOutcome, CardView, SessionStore, SessionWorkflow};
