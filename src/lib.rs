//! Gumroad dashboard library
//!
//! Proxies the Gumroad API into server-rendered pages and keeps a bounded log
//! of every upstream call for inspection

pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;
pub mod views;

// Re-export common types
pub use config::{Settings, TokenConfig, TokenStore};
pub use handlers::{create_router, router_with_state, AppState};
pub use models::CallRecord;
pub use services::{CallHistory, UpstreamClient, UpstreamError};
pub use utils::error::{AppError, AppResult};

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Library description
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

/// Get version information
pub fn version_info() -> String {
    format!("{} v{} - {}", NAME, VERSION, DESCRIPTION)
}
