use std::sync::Arc;

use crate::config::Config;
use crate::recommendation::orchestrator::SubmissionOrchestrator;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Owns the form session. One per process; nothing is persisted.
    pub orchestrator: Arc<SubmissionOrchestrator>,
}
