use std::sync::Arc;

use crate::db::JobStore;
use crate::services::dispatcher::JobDispatcher;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobStore>,
    pub dispatcher: Arc<JobDispatcher>,
}

impl AppState {
    pub fn new(store: Arc<dyn JobStore>, dispatcher: JobDispatcher) -> Self {
        Self {
            store,
            dispatcher: Arc::new(dispatcher),
        }
    }
}
