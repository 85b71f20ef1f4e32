use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::api::mock::DEFAULT_PAGE_SIZE;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub api: ApiConfig,
  /// Custom title for header (defaults to the backend description if not set)
  pub title: Option<String>,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub demo: DemoConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiConfig {
  /// Base url of the transactions API. Built-in demo data is used when unset.
  pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Memoize responses for the life of the process
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self { enabled: true }
  }
}

fn default_true() -> bool {
  true
}

/// Settings of the built-in demo backend
#[derive(Debug, Clone, Deserialize)]
pub struct DemoConfig {
  #[serde(default = "default_page_size")]
  pub page_size: usize,
  /// Simulated response time
  #[serde(default = "default_latency_ms")]
  pub latency_ms: u64,
}

impl Default for DemoConfig {
  fn default() -> Self {
    Self {
      page_size: default_page_size(),
      latency_ms: default_latency_ms(),
    }
  }
}

fn default_page_size() -> usize {
  DEFAULT_PAGE_SIZE
}

fn default_latency_ms() -> u64 {
  300
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./txview.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/txview/config.yaml
  ///
  /// Without any file the defaults apply.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    match path {
      Some(p) => Self::load_from_path(&p),
      None => Ok(Self::default()),
    }
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("txview.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("txview").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::parse(&contents).map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn parse(contents: &str) -> Result<Self> {
    Ok(serde_yaml::from_str(contents)?)
  }

  /// Get the API bearer token from the environment, if any.
  ///
  /// Checks TXVIEW_API_TOKEN.
  pub fn get_api_token() -> Option<String> {
    std::env::var("TXVIEW_API_TOKEN")
      .ok()
      .filter(|t| !t.is_empty())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_empty_file_uses_defaults() {
    let config = Config::parse("{}").unwrap();
    assert!(config.api.url.is_none());
    assert!(config.cache.enabled);
    assert_eq!(config.demo.page_size, DEFAULT_PAGE_SIZE);
    assert_eq!(config.demo.latency_ms, 300);
  }

  #[test]
  fn test_full_file() {
    let config = Config::parse(
      r#"
api:
  url: https://transactions.example.com/v1
title: Card spend
cache:
  enabled: false
demo:
  page_size: 10
  latency_ms: 0
"#,
    )
    .unwrap();

    assert_eq!(
      config.api.url.as_deref(),
      Some("https://transactions.example.com/v1")
    );
    assert_eq!(config.title.as_deref(), Some("Card spend"));
    assert!(!config.cache.enabled);
    assert_eq!(config.demo.page_size, 10);
    assert_eq!(config.demo.latency_ms, 0);
  }

  #[test]
  fn test_missing_explicit_path_fails() {
    let result = Config::load(Some(Path::new("/definitely/not/here.yaml")));
    assert!(result.is_err());
  }

  #[test]
  fn test_invalid_yaml_fails() {
    assert!(Config::parse("cache: [1, 2").is_err());
  }
}
