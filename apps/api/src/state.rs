use std::sync::Arc;

use crate::analysis::store::AnalysisStore;
use crate::config::Config;
use crate::streaming::StreamClient;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub stream: StreamClient,
    /// Where completed resume analyses are kept. Postgres in production.
    pub store: Arc<dyn AnalysisStore>,
    pub config: Config,
}
