//! Configuration service implementation.
//!
//! This module provides a ConfigService that loads the root configuration
//! from the configuration file (~/.config/serene/config.toml).

use crate::paths::SerenePaths;
use serene_core::config::RootConfig;
use serene_core::error::{Result, SereneError};
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Configuration service that loads and caches the root configuration.
///
/// A missing file yields `RootConfig::default()`. A file that exists but
/// cannot be parsed, or holds out-of-range values, is reported as an error
/// by `load` and falls back to the defaults (with a warning) in `get_config`.
#[derive(Debug, Clone)]
pub struct ConfigService {
    path: Option<PathBuf>,
    /// Cached configuration loaded from file.
    config: Arc<RwLock<Option<RootConfig>>>,
}

impl ConfigService {
    /// Creates a ConfigService reading the default config file.
    pub fn new() -> Self {
        Self {
            path: None,
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Creates a ConfigService reading `path` instead of the default file.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            config: Arc::new(RwLock::new(None)),
        }
    }

    /// Resolved path of the config file.
    pub fn config_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => SerenePaths::config_file().map_err(|e| SereneError::config(e.to_string())),
        }
    }

    /// Gets the root configuration, loading from file if not cached.
    pub fn get_config(&self) -> RootConfig {
        {
            let read_lock = self.config.read().unwrap_or_else(|e| e.into_inner());
            if let Some(ref cached) = *read_lock {
                return cached.clone();
            }
        }

        let loaded = self.load().unwrap_or_else(|e| {
            if e.is_config() {
                tracing::warn!("[Config] Rejected configuration, using defaults: {}", e);
            } else {
                tracing::warn!("[Config] Falling back to defaults: {}", e);
            }
            RootConfig::default()
        });

        {
            let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
            *write_lock = Some(loaded.clone());
        }

        loaded
    }

    /// Reads and parses the config file, bypassing the cache.
    pub fn load(&self) -> Result<RootConfig> {
        let path = self.config_path()?;
        Self::load_from(&path)
    }

    /// Writes `config` to the config file and refreshes the cache.
    pub fn save(&self, config: &RootConfig) -> Result<()> {
        let path = self.config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(config)?;
        std::fs::write(&path, content)?;
        tracing::info!("[Config] Saved configuration to {}", path.display());

        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = Some(config.clone());
        Ok(())
    }

    /// Invalidates the cache, forcing a reload on next access.
    pub fn invalidate_cache(&self) {
        let mut write_lock = self.config.write().unwrap_or_else(|e| e.into_inner());
        *write_lock = None;
    }

    fn load_from(path: &Path) -> Result<RootConfig> {
        if !path.exists() {
            tracing::debug!("[Config] No config file at {}, using defaults", path.display());
            return Ok(RootConfig::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: RootConfig = toml::from_str(&content)?;
        config.validate()?;
        tracing::debug!("[Config] Loaded configuration from {}", path.display());
        Ok(config)
    }
}

impl Default for ConfigService {
    fn default() -> Self {
        Self::new()
    }
}
