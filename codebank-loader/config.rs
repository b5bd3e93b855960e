//! Typed configuration, built from the built-in defaults and the user's file.

use std::path::Path;

use anyhow::{
  Context,
  Result,
};
use serde::Deserialize;

/// Built-in config.toml.
pub const BUILTIN_CONFIG: &str = include_str!("config.toml");

const MERGE_DEPTH: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
  pub api:       ApiConfig,
  pub search:    SearchConfig,
  pub render:    RenderConfig,
  pub clipboard: ClipboardConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ApiConfig {
  pub base_url:   String,
  pub timeout_ms: u64,
  #[serde(default)]
  pub token:      Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct SearchConfig {
  pub debounce_ms:   u64,
  pub min_query_len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RenderConfig {
  /// How long the "copied" acknowledgment stays up.
  pub copy_ack_ms: u64,
  /// Emit HTML instead of terminal colors.
  pub html:        bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct ClipboardConfig {
  pub provider: ClipboardSetting,
}

/// `"auto"`, `"none"`, a provider name such as `"wl-copy"`, or a custom
/// command table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ClipboardSetting {
  Named(String),
  Custom {
    command: String,
    #[serde(default)]
    args:    Vec<String>,
  },
}

/// Default built-in config.toml.
pub fn default_config() -> Result<toml::Value> {
  toml::from_str(BUILTIN_CONFIG).context("failed to parse built-in config.toml")
}

/// The built-in config with `path` merged over it. A missing file is not an
/// error; an unreadable or malformed one is.
pub fn user_config(path: &Path) -> Result<toml::Value> {
  let default = default_config()?;
  let user = match std::fs::read_to_string(path) {
    Ok(text) => {
      toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?
    },
    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
      log::debug!("no config at {}, using defaults", path.display());
      return Ok(default);
    },
    Err(err) => {
      return Err(err).with_context(|| format!("failed to read {}", path.display()));
    },
  };
  Ok(crate::merge_toml_values(default, user, MERGE_DEPTH))
}

impl Config {
  pub fn builtin() -> Result<Self> {
    Self::from_value(default_config()?)
  }

  pub fn from_value(value: toml::Value) -> Result<Self> {
    value.try_into().context("invalid configuration")
  }

  /// Loads `path` (or the default config file) and applies environment
  /// overrides.
  pub fn load(path: Option<&Path>) -> Result<Self> {
    let path = path.map_or_else(crate::config_file, Path::to_path_buf);
    let mut config = Self::from_value(user_config(&path)?)?;
    config.override_token(codebank_stdx::env::non_empty_var("CODEBANK_API_TOKEN"));
    Ok(config)
  }

  /// A token from the environment wins over the file.
  pub fn override_token(&mut self, token: Option<String>) {
    if token.is_some() {
      self.api.token = token;
    }
  }
}
