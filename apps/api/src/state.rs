use std::sync::Arc;

use crate::config::Config;
use crate::pipeline::PipelineCoordinator;
use crate::store::AnalysisStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<PipelineCoordinator>,
    pub store: Arc<dyn AnalysisStore>,
    pub config: Config,
}
