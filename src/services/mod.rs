//! Service layer module
//!
//! Contains the instrumented upstream client and the call history it writes to

pub mod client;
pub mod history;

pub use client::{CallKind, UpstreamClient, UpstreamError, UpstreamResponse};
pub use history::CallHistory;
