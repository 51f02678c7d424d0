pub mod app;
pub mod charts;
pub mod controller;
pub mod dataset;
pub mod errors;
pub mod figure;
pub mod handlers;
pub mod models;
pub mod state;
pub mod storage;
pub mod summary;
pub mod ui;

pub use app::router;
pub use dataset::{DashboardContext, PopulationTotals};
pub use state::AppState;
pub use storage::{load_dataset, resolve_data_path};
