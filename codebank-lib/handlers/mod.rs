use std::{
  sync::Arc,
  time::Duration,
};

use crate::{
  clipboard::ClipboardProvider,
  fetch::SnippetSource,
  search::SearchConfig,
};

pub mod copy;
pub mod search;

pub use copy::CopyAction;
pub use search::{
  SearchEvent,
  SearchHandle,
};

/// The background hooks a UI talks to.
pub struct Handlers {
  pub search: SearchHandle,
  pub copy:   CopyAction,
}

impl Handlers {
  /// Must be called from within a tokio runtime.
  pub fn spawn(
    source: Arc<dyn SnippetSource>,
    clipboard: Arc<dyn ClipboardProvider>,
    search: SearchConfig,
    copy_ack: Duration,
  ) -> Self {
    Self {
      search: SearchHandle::spawn(source, search),
      copy:   CopyAction::spawn(clipboard, copy_ack),
    }
  }
}
