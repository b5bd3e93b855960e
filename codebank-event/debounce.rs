//! Utilities for declaring an async (usually debounced) hook

use std::time::Duration;

use futures_executor::block_on;
use tokio::{
  sync::mpsc::{
    self,
    Sender,
    WeakSender,
    error::TrySendError,
  },
  time::Instant,
};

/// Maximum time to block when sending to a full channel.
/// Keep this very short to avoid UI freezes - better to drop a message
/// than to freeze the prompt.
const SEND_TIMEOUT_MS: u64 = 2;

/// Channel capacity for hook events. Rapid typing produces one event per
/// keystroke, so leave plenty of headroom.
const CHANNEL_CAPACITY: usize = 256;

/// Async hooks provide a convenient framework for implementing (debounced)
/// async event handlers. A hook runs as a background tokio task that waits for
/// events (usually an enum) to be sent through a channel. Each event may start,
/// extend or cancel a debounce deadline; when the deadline passes without a
/// new one being set, [`AsyncHook::finish_debounce`] runs.
pub trait AsyncHook: Sync + Send + 'static + Sized {
  type Event: Sync + Send + 'static;
  /// Called immediately whenever an event is received, this function can
  /// consume the event immediately or debounce it. In case of debouncing,
  /// it can either define a new debounce timeout or continue the current one.
  /// Returning `None` cancels any pending debounce.
  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant>;

  /// Called whenever the debounce timeline is reached
  fn finish_debounce(&mut self);

  fn spawn(self) -> mpsc::Sender<Self::Event> {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    // only spawn worker if we are inside runtime to avoid having to spawn a runtime
    // for unrelated unit tests
    if tokio::runtime::Handle::try_current().is_ok() {
      tokio::spawn(run(self, rx));
    }
    tx
  }

  /// Like [`AsyncHook::spawn`], but hands the hook a weak sender to its own
  /// channel so that work it starts can report back as regular events.
  ///
  /// The sender is weak so the worker still stops once every strong sender
  /// handed out to callers has been dropped.
  fn spawn_with<F>(build: F) -> mpsc::Sender<Self::Event>
  where
    F: FnOnce(WeakSender<Self::Event>) -> Self,
  {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    let hook = build(tx.downgrade());
    if tokio::runtime::Handle::try_current().is_ok() {
      tokio::spawn(run(hook, rx));
    }
    tx
  }
}

async fn run<Hook: AsyncHook>(mut hook: Hook, mut rx: mpsc::Receiver<Hook::Event>) {
  let mut deadline = None;
  loop {
    let event = match deadline {
      Some(deadline_) => {
        let res = tokio::time::timeout_at(deadline_, rx.recv()).await;
        match res {
          Ok(event) => event,
          Err(_) => {
            hook.finish_debounce();
            deadline = None;
            continue;
          },
        }
      },
      None => rx.recv().await,
    };
    let Some(event) = event else {
      break;
    };
    deadline = hook.handle_event(event, deadline);
  }
}

/// Send an event to a channel, blocking only briefly if the channel is full.
///
/// This function is designed to be called from synchronous code that needs to
/// communicate with async tasks. It prioritizes responsiveness over reliability:
/// - First attempts a non-blocking send (fast path)
/// - If the channel is full, blocks for at most `SEND_TIMEOUT_MS` milliseconds
/// - If still full after timeout, the message is dropped
pub fn send_blocking<T>(tx: &Sender<T>, data: T) {
  match tx.try_send(data) {
    Ok(()) => {},
    Err(TrySendError::Full(data)) => {
      let _ = block_on(tx.send_timeout(data, Duration::from_millis(SEND_TIMEOUT_MS)));
    },
    Err(TrySendError::Closed(_)) => {
      log::warn!("Attempted to send to closed channel");
    },
  }
}
