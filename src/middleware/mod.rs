//! Middleware module
//!
//! Setup guard and request logging

pub mod logging;
pub mod setup;
