//! API module
//!
//! HTTP report endpoints and middleware.

pub mod middleware;
pub mod routes;

use std::sync::Arc;

use crate::config::IncentiveSettings;
use crate::engine::IncentiveAggregator;
use crate::snapshot::SnapshotSource;

pub use routes::create_router;

/// Shared state handed to every report handler
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn SnapshotSource>,
    pub aggregator: Arc<IncentiveAggregator>,
    pub settings: Arc<IncentiveSettings>,
}

impl AppState {
    pub fn new(source: Arc<dyn SnapshotSource>, settings: IncentiveSettings) -> Self {
        Self {
            source,
            aggregator: Arc::new(IncentiveAggregator::new(settings.rules.clone())),
            settings: Arc::new(settings),
        }
    }
}
