//! Path management for serene configuration files.
//!
//! ```text
//! ~/.config/serene/            # Config directory
//! └── config.toml              # Application configuration
//! ```

use std::path::PathBuf;

const APP_DIR: &str = "serene";

/// Errors that can occur during path resolution.
#[derive(Debug)]
pub enum PathError {
    /// Config directory could not be determined.
    ConfigDirNotFound,
}

impl std::fmt::Display for PathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PathError::ConfigDirNotFound => write!(f, "Cannot find config directory"),
        }
    }
}

impl std::error::Error for PathError {}

pub struct SerenePaths;

impl SerenePaths {
    /// Returns the serene configuration directory (e.g. `~/.config/serene/`).
    ///
    /// # Returns
    ///
    /// - `Ok(PathBuf)`: Path to config directory
    /// - `Err(PathError::ConfigDirNotFound)`: Could not determine directory
    pub fn config_dir() -> Result<PathBuf, PathError> {
        dirs::config_dir()
            .map(|dir| dir.join(APP_DIR))
            .ok_or(PathError::ConfigDirNotFound)
    }

    /// Returns the path to the main configuration file.
    pub fn config_file() -> Result<PathBuf, PathError> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_file_lives_in_config_dir() {
        if let (Ok(dir), Ok(file)) = (SerenePaths::config_dir(), SerenePaths::config_file()) {
            assert!(dir.ends_with("serene"));
            assert_eq!(file.parent(), Some(dir.as_path()));
        }
    }
}
