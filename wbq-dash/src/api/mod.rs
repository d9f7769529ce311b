//! HTTP API handlers for wbq-dash

pub mod buildinfo;
pub mod dashboard;
pub mod error;
pub mod export;
pub mod health;
pub mod stats;
pub mod ui;

pub use buildinfo::get_build_info;
pub use dashboard::get_dashboard;
pub use error::ApiError;
pub use export::get_export;
pub use health::health_routes;
pub use stats::{get_population_stats, get_user_stats};
pub use ui::{serve_app_js, serve_index};
