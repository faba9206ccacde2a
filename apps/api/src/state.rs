use std::sync::Arc;

use sqlx::PgPool;

use crate::config::Config;
use crate::matching::orchestrator::MatchOrchestrator;
use crate::store::MatchStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    #[allow(dead_code)]
    pub db: PgPool,
    /// Record reads/writes at the store boundary (job/interview creation).
    pub store: Arc<dyn MatchStore>,
    /// Scoring + enhancement pipeline. Built once at startup with its
    /// injected store and completion clients.
    pub orchestrator: Arc<MatchOrchestrator>,
    #[allow(dead_code)]
    pub config: Config,
}
