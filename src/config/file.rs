//! File-based token configuration
//!
//! Loads and saves the Gumroad access token from a JSON file

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tracing::{debug, info};

/// Value shipped in sample config files; never a real token
pub const PLACEHOLDER_TOKEN: &str = "YOUR_GUMROAD_ACCESS_TOKEN_HERE";

/// Token configuration stored on disk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Gumroad access token
    #[serde(default)]
    pub gumroad_token: String,
}

impl TokenConfig {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            gumroad_token: token.into(),
        }
    }

    /// Whether a real token is present
    pub fn is_configured(&self) -> bool {
        !self.gumroad_token.is_empty() && self.gumroad_token != PLACEHOLDER_TOKEN
    }

    /// Load from `path`; a missing file yields an empty token
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("No token file at {:?}, starting in setup mode", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;

        let config: TokenConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path))?;

        debug!("Loaded token file {:?} (configured: {})", path, config.is_configured());
        Ok(config)
    }

    /// Write to `path` as pretty JSON, creating parent directories
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content + "\n")
            .with_context(|| format!("Failed to write config file: {:?}", path))?;

        info!("Token saved to {:?}", path);
        Ok(())
    }

    /// Resolve the token file location
    ///
    /// Searches in order:
    /// 1. `explicit` (from `GUMDASH_CONFIG`)
    /// 2. ~/.config/gumdash/config.json, if it exists
    /// 3. ./config.json
    pub fn resolve_path(explicit: Option<&Path>) -> PathBuf {
        if let Some(path) = explicit {
            return path.to_path_buf();
        }

        if let Some(home) = dirs::home_dir() {
            let config_path = home.join(".config").join("gumdash").join("config.json");
            if config_path.exists() {
                return config_path;
            }
        }

        PathBuf::from("config.json")
    }
}

/// Current token shared by all handlers, backed by its file
#[derive(Debug)]
pub struct TokenStore {
    path: PathBuf,
    config: RwLock<TokenConfig>,
}

impl TokenStore {
    pub fn new(path: PathBuf, config: TokenConfig) -> Self {
        Self {
            path,
            config: RwLock::new(config),
        }
    }

    /// Open the store at `path`, loading whatever is there
    pub fn open(path: PathBuf) -> Result<Self> {
        let config = TokenConfig::load(&path)?;
        Ok(Self::new(path, config))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Copy of the current configuration
    pub fn current(&self) -> TokenConfig {
        self.config
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Current token
    pub fn token(&self) -> String {
        self.current().gumroad_token
    }

    pub fn is_configured(&self) -> bool {
        self.current().is_configured()
    }

    /// Persist `token`, then make it current
    ///
    /// The write lock is held across the save, so the file and the in-memory
    /// token always end on the same value. The in-memory token is left
    /// untouched if the write fails.
    pub fn replace(&self, token: impl Into<String>) -> Result<()> {
        let mut current = self
            .config
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let updated = TokenConfig::new(token);
        updated.save(&self.path)?;
        *current = updated;
        Ok(())
    }
}
