use std::sync::Arc;

use crate::config::Config;
use crate::recommendation::Orchestrator;
use crate::store::AssessmentStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Postgres when `DATABASE_URL` is set, in-memory otherwise.
    pub store: Arc<dyn AssessmentStore>,
    pub orchestrator: Arc<Orchestrator>,
    pub config: Config,
}
