use std::sync::Arc;

use crate::pipeline::Pipeline;

/// Shared application state injected into route handlers via Axum extractors.
///
/// The pipeline carries its own rewriter dependency; nothing here is mutable
/// across requests.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
}
