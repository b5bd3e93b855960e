//! User-facing notifications ("toasts").
//!
//! Components never surface errors by failing; they post a message here and
//! return to a usable state. A UI shows [`MessageCenter::active`] and compares
//! [`MessageCenter::seq`] with the last value it drew to notice a new toast,
//! even one with the same text as before.

use std::collections::VecDeque;

pub const DEFAULT_HISTORY_LIMIT: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageLevel {
  Success,
  Error,
}

/// The component a message originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageSource {
  Search,
  Fetch,
  Clipboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
  pub id:        u64,
  pub level:     MessageLevel,
  pub source:    MessageSource,
  pub text:      String,
  /// The failed operation is retried by the next user action.
  pub retryable: bool,
}

#[derive(Debug, Clone)]
pub struct MessageCenter {
  active:  Option<Message>,
  history: VecDeque<Message>,
  limit:   usize,
  /// Bumped on every post and dismissal.
  seq:     u64,
}

impl Default for MessageCenter {
  fn default() -> Self {
    Self::with_history_limit(DEFAULT_HISTORY_LIMIT)
  }
}

impl MessageCenter {
  pub fn with_history_limit(limit: usize) -> Self {
    Self {
      active:  None,
      history: VecDeque::with_capacity(limit.min(DEFAULT_HISTORY_LIMIT)),
      limit:   limit.max(1),
      seq:     0,
    }
  }

  pub fn active(&self) -> Option<&Message> {
    self.active.as_ref()
  }

  /// Oldest first.
  pub fn history(&self) -> impl Iterator<Item = &Message> {
    self.history.iter()
  }

  pub fn seq(&self) -> u64 {
    self.seq
  }

  fn post(
    &mut self,
    level: MessageLevel,
    source: MessageSource,
    text: String,
    retryable: bool,
  ) -> Message {
    self.seq += 1;
    let message = Message {
      id: self.seq,
      level,
      source,
      text,
      retryable,
    };
    if self.history.len() == self.limit {
      self.history.pop_front();
    }
    self.history.push_back(message.clone());
    self.active = Some(message.clone());
    message
  }

  pub fn success(&mut self, source: MessageSource, text: impl Into<String>) -> Message {
    self.post(MessageLevel::Success, source, text.into(), false)
  }

  pub fn error(&mut self, source: MessageSource, text: impl Into<String>) -> Message {
    self.post(MessageLevel::Error, source, text.into(), false)
  }

  /// An error the user recovers from by trying again.
  pub fn retryable_error(&mut self, source: MessageSource, text: impl Into<String>) -> Message {
    self.post(MessageLevel::Error, source, text.into(), true)
  }

  pub fn dismiss(&mut self) -> Option<Message> {
    let message = self.active.take()?;
    self.seq += 1;
    Some(message)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn posting_replaces_the_active_toast() {
    let mut center = MessageCenter::default();
    assert_eq!(center.seq(), 0);
    center.success(MessageSource::Clipboard, "Code copied to clipboard!");
    let failed = center.retryable_error(MessageSource::Search, "boom");
    assert_eq!(center.active(), Some(&failed));
    assert!(failed.retryable);
    assert_eq!(failed.level, MessageLevel::Error);
    assert_eq!(center.seq(), 2);
  }

  #[test]
  fn history_is_bounded() {
    let mut center = MessageCenter::with_history_limit(2);
    for text in ["a", "b", "c"] {
      center.success(MessageSource::Clipboard, text);
    }
    let texts: Vec<_> = center.history().map(|message| message.text.as_str()).collect();
    assert_eq!(texts, ["b", "c"]);
  }

  #[test]
  fn dismiss_clears_active_once() {
    let mut center = MessageCenter::default();
    let message = center.error(MessageSource::Fetch, "Code not found.");
    assert_eq!(center.dismiss(), Some(message));
    assert_eq!(center.active(), None);
    assert_eq!(center.seq(), 2);
    assert_eq!(center.dismiss(), None);
    assert_eq!(center.seq(), 2);
  }

  #[test]
  fn same_text_still_reads_as_new() {
    let mut center = MessageCenter::default();
    let first = center.success(MessageSource::Clipboard, "Code copied to clipboard!");
    let second = center.success(MessageSource::Clipboard, "Code copied to clipboard!");
    assert_ne!(first.id, second.id);
    assert_eq!(center.history().count(), 2);
  }
}
