//! Layered run configuration.
//!
//! Settings are merged in increasing priority:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. A TOML file (`--config PATH`, else the platform config directory)
//! 3. Environment variables prefixed with `DUPSWEEP_` (e.g. `DUPSWEEP_BLOCK_SIZE`)
//! 4. Command-line flags, applied by the caller after loading
//!
//! # Example file
//!
//! ```toml
//! algorithms = ["md5", "sha256"]
//! block_size = 1048576
//! io_threads = 4
//! keep = "first"
//! recursive = true
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::KeepPolicy;
use crate::scanner::{HashAlgorithm, WalkerConfig, DEFAULT_BLOCK_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "DUPSWEEP_";

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A setting has an unusable value.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// An explicitly requested config file does not exist.
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    /// Merging or extracting the layered configuration failed.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// Rendering the configuration as TOML failed.
    #[error("Failed to render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Hash algorithms, in signature order
    pub algorithms: Vec<HashAlgorithm>,
    /// Read block size in bytes
    pub block_size: usize,
    /// Worker threads for hashing
    pub io_threads: usize,
    /// Which member of a duplicate group is kept
    pub keep: KeepPolicy,
    /// Descend into subdirectories of every root
    pub recursive: bool,
    /// Skip hidden files and directories
    pub skip_hidden: bool,
    /// Ignore files smaller than this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_size: Option<u64>,
    /// Ignore files larger than this
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            algorithms: vec![HashAlgorithm::Md5, HashAlgorithm::Sha256],
            block_size: DEFAULT_BLOCK_SIZE,
            io_threads: 4,
            keep: KeepPolicy::First,
            recursive: false,
            skip_hidden: false,
            min_size: None,
            max_size: None,
        }
    }
}

impl Settings {
    /// Load settings from defaults, a config file and the environment.
    ///
    /// With `path = None` the platform config file is used when present.
    ///
    /// # Errors
    ///
    /// - `FileNotFound` if `path` is given but missing
    /// - `Load` if a layer cannot be parsed
    ///
    /// The result is not validated; call [`Settings::validate`] once every
    /// layer, including command-line flags, has been applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::FileNotFound(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(default_path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading config from {}", default_path.display());
                    figment = figment.merge(Toml::file(default_path));
                }
            }
        }

        Self::from_figment(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract settings from a prepared figment.
    ///
    /// # Errors
    ///
    /// Returns `Load` if extraction fails.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract::<Settings>().map_err(Box::new)?)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `Invalid` describing the first offending setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.algorithms.is_empty() {
            return Err(ConfigError::Invalid(
                "at least one hash algorithm is required".to_string(),
            ));
        }
        if self.block_size == 0 {
            return Err(ConfigError::Invalid(
                "block_size must be greater than zero".to_string(),
            ));
        }
        if self.io_threads == 0 {
            return Err(ConfigError::Invalid(
                "io_threads must be at least 1".to_string(),
            ));
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(ConfigError::Invalid(format!(
                    "min_size ({}) is larger than max_size ({})",
                    min, max
                )));
            }
        }
        Ok(())
    }

    /// Walker filters derived from these settings.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::new(self.skip_hidden, self.min_size, self.max_size)
    }

    /// Render the settings as TOML.
    ///
    /// # Errors
    ///
    /// Returns `Render` if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Platform-specific default config file path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "dupsweep", "dupsweep")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }
}
