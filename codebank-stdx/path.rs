//! Path helpers shared by the loader and the terminal client.

use std::{
  borrow::Cow,
  path::{
    Component,
    Path,
    PathBuf,
  },
};

/// Replaces a leading `~` with the user's home directory.
///
/// Paths that don't start with `~` (or when no home directory can be found)
/// are returned unchanged.
pub fn expand_tilde<'a>(path: Cow<'a, Path>) -> Cow<'a, Path> {
  let mut components = path.components();
  if let Some(Component::Normal(first)) = components.next()
    && first == "~"
    && let Ok(mut home) = etcetera::home_dir()
  {
    home.push(components.as_path());
    return Cow::Owned(home);
  }

  path
}

/// Lexically normalizes a path, resolving `.` and `..` without touching the
/// filesystem.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
  let mut normalized = PathBuf::new();
  for component in path.as_ref().components() {
    match component {
      Component::CurDir => {},
      Component::ParentDir => {
        if !normalized.pop() {
          normalized.push(component);
        }
      },
      other => normalized.push(other),
    }
  }
  normalized
}
