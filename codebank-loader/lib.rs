pub mod config;

use std::{
  borrow::Cow,
  path::{
    Path,
    PathBuf,
  },
  sync::OnceLock,
};

use codebank_stdx::path;
use etcetera::base_strategy::{
  BaseStrategy,
  choose_base_strategy,
};

const APP_DIR: &str = "codebank";

static CONFIG_FILE: OnceLock<PathBuf> = OnceLock::new();

static LOG_FILE: OnceLock<PathBuf> = OnceLock::new();

pub fn initialize_config_file(specified_file: Option<PathBuf>) {
  let config_file = specified_file.unwrap_or_else(default_config_file);
  ensure_parent_dir(&config_file);
  CONFIG_FILE.set(config_file).ok();
}

pub fn initialize_log_file(specified_file: Option<PathBuf>) {
  let log_file = specified_file.unwrap_or_else(default_log_file);
  ensure_parent_dir(&log_file);
  LOG_FILE.set(log_file).ok();
}

fn dir_from_env(var: &str) -> Option<PathBuf> {
  let dir = std::env::var(var).ok()?;
  Some(path::expand_tilde(Cow::Borrowed(Path::new(&dir))).into_owned())
}

/// `CODEBANK_CONFIG_DIR`, or the platform config directory.
///
/// Falls back to a directory under the system temp dir when the platform
/// gives no answer (no home directory).
pub fn config_dir() -> PathBuf {
  if let Some(dir) = dir_from_env("CODEBANK_CONFIG_DIR") {
    return dir;
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.config_dir().join(APP_DIR),
    Err(err) => {
      log::warn!("unable to find the config directory: {err}");
      std::env::temp_dir().join(APP_DIR)
    },
  }
}

/// `CODEBANK_CACHE_DIR`, or the platform cache directory.
pub fn cache_dir() -> PathBuf {
  if let Some(dir) = dir_from_env("CODEBANK_CACHE_DIR") {
    return dir;
  }
  match choose_base_strategy() {
    Ok(strategy) => strategy.cache_dir().join(APP_DIR),
    Err(err) => {
      log::warn!("unable to find the cache directory: {err}");
      std::env::temp_dir().join(APP_DIR)
    },
  }
}

pub fn config_file() -> PathBuf {
  CONFIG_FILE
    .get_or_init(|| {
      let path = default_config_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn log_file() -> PathBuf {
  LOG_FILE
    .get_or_init(|| {
      let path = default_log_file();
      ensure_parent_dir(&path);
      path
    })
    .clone()
}

pub fn default_log_file() -> PathBuf {
  cache_dir().join("codebank.log")
}

fn default_config_file() -> PathBuf {
  config_dir().join("config.toml")
}

/// Merge two TOML documents, merging values from `right` onto `left`
///
/// `merge_depth` sets the nesting depth up to which tables are merged instead
/// of overridden. Below that depth, and for every non-table value, `right`
/// wins outright.
///
/// `merge_toml_values(builtin, user, 3)` turns
///
/// ```toml
/// [api]
/// base-url   = "https://codebank-api.vercel.app"
/// timeout-ms = 10000
/// ```
///
/// merged with
///
/// ```toml
/// [api]
/// timeout-ms = 2500
/// ```
///
/// into a table that keeps the built-in `base-url` and takes the user's
/// `timeout-ms`.
pub fn merge_toml_values(left: toml::Value, right: toml::Value, merge_depth: usize) -> toml::Value {
  use toml::Value;

  match (left, right) {
    (Value::Table(mut left_map), Value::Table(right_map)) => {
      if merge_depth > 0 {
        for (rname, rvalue) in right_map {
          match left_map.remove(&rname) {
            Some(lvalue) => {
              let merged_value = merge_toml_values(lvalue, rvalue, merge_depth - 1);
              left_map.insert(rname, merged_value);
            },
            None => {
              left_map.insert(rname, rvalue);
            },
          }
        }
        Value::Table(left_map)
      } else {
        Value::Table(right_map)
      }
    },
    // Arrays and scalars are replaced wholesale.
    (_, value) => value,
  }
}

fn ensure_parent_dir(path: &Path) {
  if let Some(parent) = path.parent()
    && !parent.exists()
  {
    std::fs::create_dir_all(parent).ok();
  }
}

#[cfg(test)]
mod merge_toml_tests {
  use toml::Value;

  use super::merge_toml_values;

  #[test]
  fn user_keys_override_builtin_keys() {
    const USER: &str = r#"
        [api]
        timeout-ms = 2500
        token = "secret"
        "#;

    let base: Value = toml::from_str(crate::config::BUILTIN_CONFIG).unwrap();
    let user: Value = toml::from_str(USER).unwrap();

    let merged = merge_toml_values(base, user, 3);
    let api = merged.get("api").unwrap();
    assert_eq!(api.get("timeout-ms").unwrap().as_integer(), Some(2500));
    assert_eq!(api.get("token").unwrap().as_str(), Some("secret"));
    // untouched keys survive
    assert_eq!(
      api.get("base-url").unwrap().as_str(),
      Some("https://codebank-api.vercel.app")
    );
    assert_eq!(
      merged
        .get("search")
        .unwrap()
        .get("debounce-ms")
        .unwrap()
        .as_integer(),
      Some(300)
    );
  }

  #[test]
  fn tables_below_the_depth_are_replaced() {
    let left: Value = toml::from_str("[a.b]\nx = 1\ny = 2").unwrap();
    let right: Value = toml::from_str("[a.b]\nx = 3").unwrap();

    let shallow = merge_toml_values(left.clone(), right.clone(), 1);
    let b = shallow.get("a").unwrap().get("b").unwrap();
    assert_eq!(b.get("y"), None);

    let deep = merge_toml_values(left, right, 3);
    let b = deep.get("a").unwrap().get("b").unwrap();
    assert_eq!(b.get("x").unwrap().as_integer(), Some(3));
    assert_eq!(b.get("y").unwrap().as_integer(), Some(2));
  }

  #[test]
  fn arrays_are_replaced() {
    let left: Value = toml::from_str("args = [\"a\", \"b\"]").unwrap();
    let right: Value = toml::from_str("args = [\"c\"]").unwrap();
    let merged = merge_toml_values(left, right, 3);
    assert_eq!(
      merged.get("args").unwrap().as_array().unwrap(),
      &vec![Value::String("c".into())]
    );
  }
}
