pub mod aggregation;
pub mod charts;
pub mod config;
pub mod error;
pub mod layout;
pub mod loader;
pub mod model;
pub mod pages;
pub mod schema;
pub mod server;
pub mod stats;
pub mod validate;

pub use config::DashboardConfig;
pub use error::DashError;
pub use loader::DataSource;
pub use server::{build_router, AppState};
