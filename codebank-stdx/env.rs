//! Functions for working with the host environment.

use std::ffi::OsStr;

/// Checks if the given environment variable is set.
pub fn env_var_is_set(env_var_name: &str) -> bool {
  std::env::var_os(env_var_name).is_some()
}

/// Reads an environment variable, treating an empty value as unset.
pub fn non_empty_var(env_var_name: &str) -> Option<String> {
  std::env::var(env_var_name)
    .ok()
    .filter(|value| !value.trim().is_empty())
}

/// Checks if a binary with the given name exists.
pub fn binary_exists<T: AsRef<OsStr>>(binary_name: T) -> bool {
  which::which(binary_name).is_ok()
}
