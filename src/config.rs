//! Configuration loading for the data access layer.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors produced while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("config file not found: {}", .0.display())]
  NotFound(PathBuf),

  #[error("no configuration file found; create one at ~/.config/larder/config.yaml")]
  NoConfigFile,

  #[error("failed to read config file {}: {source}", .path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("failed to parse config file {}: {source}", .path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_yaml::Error,
  },

  #[error("API key not found; set LARDER_API_KEY or SUPABASE_ANON_KEY")]
  MissingApiKey,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
  pub store: StoreConfig,
  #[serde(default)]
  pub cache: CacheConfig,
}

/// Connection details for the remote store.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
  /// Base URL of the store, e.g. "https://myproject.supabase.co".
  pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CacheConfig {
  /// Directory for cached images (platform cache dir when unset).
  pub image_dir: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./larder.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/larder/config.yaml
  pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(ConfigError::NotFound(p.to_path_buf()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Err(ConfigError::NoConfigFile),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("larder.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("larder").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
      path: path.to_path_buf(),
      source,
    })?;

    serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
      path: path.to_path_buf(),
      source,
    })
  }

  /// Get the remote store API key from environment variables.
  ///
  /// Checks LARDER_API_KEY first, then SUPABASE_ANON_KEY as fallback.
  pub fn api_key() -> Result<String, ConfigError> {
    std::env::var("LARDER_API_KEY")
      .or_else(|_| std::env::var("SUPABASE_ANON_KEY"))
      .map_err(|_| ConfigError::MissingApiKey)
  }

  /// Access token of the signed-in session, when one is exported.
  ///
  /// Checks LARDER_ACCESS_TOKEN.
  pub fn access_token() -> Option<String> {
    std::env::var("LARDER_ACCESS_TOKEN").ok()
  }
}
