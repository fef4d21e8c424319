//! Configuration management module
//!
//! Environment settings plus the on-disk token file

pub mod file;
pub mod settings;

pub use file::{TokenConfig, TokenStore};
pub use settings::Settings;
