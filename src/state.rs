use crate::dataset::DashboardContext;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub ctx: Arc<DashboardContext>,
}

impl AppState {
    pub fn new(ctx: DashboardContext) -> Self {
        Self { ctx: Arc::new(ctx) }
    }
}
