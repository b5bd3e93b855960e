//! Clipboard abstraction for `codebank-lib`.
//!
//! Only export is needed (copying a snippet), so providers are write-only.
//! Runtime hosts provide concrete implementations (see `codebank-runtime`).

use std::borrow::Cow;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClipboardError {
  #[error(transparent)]
  Io(#[from] std::io::Error),
  #[error("clipboard provider command failed")]
  CommandFailed,
  #[error("failed to write to clipboard provider's stdin")]
  StdinWriteFailed,
  #[error("no clipboard provider available")]
  Unavailable,
  #[error("clipboard error: {0}")]
  Platform(String),
}

pub type Result<T> = std::result::Result<T, ClipboardError>;

pub trait ClipboardProvider: Send + Sync {
  fn name(&self) -> Cow<'_, str>;
  fn set_contents(&self, content: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct NoClipboard;

impl ClipboardProvider for NoClipboard {
  fn name(&self) -> Cow<'_, str> {
    "none".into()
  }

  fn set_contents(&self, _content: &str) -> Result<()> {
    Err(ClipboardError::Unavailable)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn no_clipboard_refuses_writes() {
    let clipboard = NoClipboard;
    assert_eq!(clipboard.name(), "none");
    assert!(matches!(
      clipboard.set_contents("fn main() {}"),
      Err(ClipboardError::Unavailable)
    ));
  }
}
