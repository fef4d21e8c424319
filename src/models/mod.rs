//! Data models module
//!
//! Defines the upstream Gumroad payloads and the logged call record

pub mod call;
pub mod gumroad;

pub use call::CallRecord;
pub use gumroad::*;
