//! The copy button: export a snippet and briefly acknowledge it.

use std::{
  sync::{
    Arc,
    atomic::{
      AtomicBool,
      Ordering,
    },
  },
  time::Duration,
};

use codebank_event::{
  AsyncHook,
  send_blocking,
};
use tokio::{
  sync::mpsc::Sender,
  time::Instant,
};

use crate::{
  clipboard::{
    ClipboardProvider,
    Result,
  },
  messages::{
    MessageCenter,
    MessageSource,
  },
};

pub const DEFAULT_COPY_ACK: Duration = Duration::from_secs(2);

pub const COPY_SUCCEEDED: &str = "Code copied to clipboard!";
pub const COPY_FAILED: &str = "Failed to copy code.";

#[derive(Debug)]
pub struct Copied;

/// Clears the acknowledgment once the window passes without another copy.
struct CopyAckHook {
  copied: Arc<AtomicBool>,
  window: Duration,
}

impl AsyncHook for CopyAckHook {
  type Event = Copied;

  fn handle_event(&mut self, _event: Copied, _timeout: Option<Instant>) -> Option<Instant> {
    self.copied.store(true, Ordering::Release);
    Some(Instant::now() + self.window)
  }

  fn finish_debounce(&mut self) {
    self.copied.store(false, Ordering::Release);
  }
}

pub struct CopyAction {
  clipboard: Arc<dyn ClipboardProvider>,
  copied:    Arc<AtomicBool>,
  tx:        Sender<Copied>,
}

impl CopyAction {
  /// Outside a tokio runtime the acknowledgment never reverts.
  pub fn spawn(clipboard: Arc<dyn ClipboardProvider>, window: Duration) -> Self {
    let copied = Arc::new(AtomicBool::new(false));
    let tx = CopyAckHook {
      copied: Arc::clone(&copied),
      window,
    }
    .spawn();
    Self {
      clipboard,
      copied,
      tx,
    }
  }

  pub fn provider_name(&self) -> String {
    self.clipboard.name().into_owned()
  }

  /// Writes `text` verbatim to the clipboard and reports the outcome through
  /// `messages`.
  pub fn copy(&self, text: &str, messages: &mut MessageCenter) -> Result<()> {
    match self.clipboard.set_contents(text) {
      Ok(()) => {
        self.copied.store(true, Ordering::Release);
        send_blocking(&self.tx, Copied);
        messages.success(MessageSource::Clipboard, COPY_SUCCEEDED);
        Ok(())
      },
      Err(err) => {
        log::warn!("copy via {} failed: {err}", self.clipboard.name());
        messages.error(MessageSource::Clipboard, COPY_FAILED);
        Err(err)
      },
    }
  }

  pub fn is_copied(&self) -> bool {
    self.copied.load(Ordering::Acquire)
  }
}

#[cfg(test)]
mod tests {
  use std::{
    borrow::Cow,
    sync::Mutex,
  };

  use tokio::time::sleep;

  use super::*;
  use crate::{
    clipboard::NoClipboard,
    messages::MessageLevel,
  };

  #[derive(Default)]
  struct Recording {
    writes: Mutex<Vec<String>>,
  }

  impl ClipboardProvider for Recording {
    fn name(&self) -> Cow<'_, str> {
      "recording".into()
    }

    fn set_contents(&self, content: &str) -> Result<()> {
      self.writes.lock().unwrap().push(content.to_string());
      Ok(())
    }
  }

  #[tokio::test(start_paused = true)]
  async fn acknowledgment_reverts_after_the_window() {
    let clipboard = Arc::new(Recording::default());
    let action = CopyAction::spawn(clipboard.clone(), DEFAULT_COPY_ACK);
    let mut messages = MessageCenter::default();

    let source = "fn main() {\r\n\tprintln!(\"<hi>\");\n}\n";
    action.copy(source, &mut messages).unwrap();
    assert!(action.is_copied());
    assert_eq!(*clipboard.writes.lock().unwrap(), vec![source.to_string()]);
    assert_eq!(messages.active().unwrap().text, COPY_SUCCEEDED);

    sleep(Duration::from_millis(1990)).await;
    assert!(action.is_copied());
    sleep(Duration::from_millis(20)).await;
    assert!(!action.is_copied());
  }

  #[tokio::test(start_paused = true)]
  async fn copying_again_restarts_the_window() {
    let action = CopyAction::spawn(Arc::new(Recording::default()), DEFAULT_COPY_ACK);
    let mut messages = MessageCenter::default();

    action.copy("a", &mut messages).unwrap();
    sleep(Duration::from_millis(1500)).await;
    action.copy("b", &mut messages).unwrap();
    sleep(Duration::from_millis(1000)).await;
    assert!(action.is_copied());
    sleep(Duration::from_millis(1100)).await;
    assert!(!action.is_copied());
  }

  #[tokio::test(start_paused = true)]
  async fn failed_copy_is_reported() {
    let action = CopyAction::spawn(Arc::new(NoClipboard), DEFAULT_COPY_ACK);
    let mut messages = MessageCenter::default();

    assert!(action.copy("a", &mut messages).is_err());
    assert!(!action.is_copied());
    let message = messages.active().unwrap();
    assert_eq!(message.text, COPY_FAILED);
    assert_eq!(message.level, MessageLevel::Error);
    assert_eq!(action.provider_name(), "none");
  }
}
