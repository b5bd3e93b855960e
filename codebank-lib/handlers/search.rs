//! Async driver for [`SearchEngine`].
//!
//! The hook task owns the engine. Keystrokes arrive as [`SearchEvent::Input`],
//! the debounce deadline lives in the hook loop, and fetches run as detached
//! tasks that report back through the hook's own channel as
//! [`SearchEvent::Resolved`]. Every state change is published on a watch
//! channel for the UI.

use std::sync::Arc;

use codebank_event::{
  AsyncHook,
  send_blocking,
};
use tokio::{
  sync::{
    mpsc::{
      Sender,
      WeakSender,
    },
    watch,
  },
  time::Instant,
};

use crate::{
  fetch::{
    SnippetSource,
    TransportError,
    fetch_catalog,
  },
  model::Catalog,
  search::{
    Dispatch,
    InputOutcome,
    SearchConfig,
    SearchEngine,
    SearchSnapshot,
  },
};

#[derive(Debug)]
pub enum SearchEvent {
  /// The search box now holds this text.
  Input(String),
  /// The clear button.
  Clear,
  Resolved {
    request_id: u64,
    outcome:    Result<Catalog, TransportError>,
  },
}

pub struct SearchHook<S: ?Sized> {
  engine:    SearchEngine,
  source:    Arc<S>,
  tx:        WeakSender<SearchEvent>,
  snapshots: watch::Sender<SearchSnapshot>,
}

impl<S> SearchHook<S>
where
  S: SnippetSource + ?Sized + 'static,
{
  fn publish(&self) {
    self.snapshots.send_replace(self.engine.snapshot());
  }

  fn start_fetch(&self, request_id: u64) {
    let source = Arc::clone(&self.source);
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let outcome = fetch_catalog(&*source).await;
      // The hook is gone if every handle was dropped; nobody is listening.
      if let Some(tx) = tx.upgrade() {
        let _ = tx.send(SearchEvent::Resolved { request_id, outcome }).await;
      }
    });
  }
}

impl<S> AsyncHook for SearchHook<S>
where
  S: SnippetSource + ?Sized + 'static,
{
  type Event = SearchEvent;

  fn handle_event(&mut self, event: Self::Event, timeout: Option<Instant>) -> Option<Instant> {
    match event {
      SearchEvent::Input(text) => {
        let outcome = self.engine.input(text);
        self.publish();
        match outcome {
          InputOutcome::Cleared => None,
          InputOutcome::Debounce(window) => Some(Instant::now() + window),
        }
      },
      SearchEvent::Clear => {
        self.engine.clear();
        self.publish();
        None
      },
      SearchEvent::Resolved {
        request_id,
        outcome,
      } => {
        if self.engine.resolve(request_id, outcome) {
          self.publish();
        }
        // A late result must not disturb a debounce that is already running.
        timeout
      },
    }
  }

  fn finish_debounce(&mut self) {
    match self.engine.dispatch() {
      Dispatch::Nothing => {},
      Dispatch::Suppressed => self.publish(),
      Dispatch::Fetch(ticket) => {
        self.publish();
        self.start_fetch(ticket.request_id);
      },
    }
  }
}

/// The UI side of a running search hook.
#[derive(Clone)]
pub struct SearchHandle {
  tx:        Sender<SearchEvent>,
  snapshots: watch::Receiver<SearchSnapshot>,
}

impl SearchHandle {
  /// Spawns the hook on the current tokio runtime.
  pub fn spawn<S>(source: Arc<S>, config: SearchConfig) -> Self
  where
    S: SnippetSource + ?Sized + 'static,
  {
    let (snapshots_tx, snapshots) = watch::channel(SearchSnapshot::default());
    let tx = SearchHook::spawn_with(|tx| {
      SearchHook {
        engine: SearchEngine::new(config),
        source,
        tx,
        snapshots: snapshots_tx,
      }
    });
    Self { tx, snapshots }
  }

  pub fn input(&self, text: impl Into<String>) {
    send_blocking(&self.tx, SearchEvent::Input(text.into()));
  }

  pub fn clear(&self) {
    send_blocking(&self.tx, SearchEvent::Clear);
  }

  /// The latest published state.
  pub fn snapshot(&self) -> SearchSnapshot {
    self.snapshots.borrow().clone()
  }

  pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
    self.snapshots.clone()
  }
}

#[cfg(test)]
mod tests {
  use std::{
    collections::VecDeque,
    sync::{
      Mutex,
      atomic::{
        AtomicUsize,
        Ordering,
      },
    },
    time::Duration,
  };

  use async_trait::async_trait;
  use tokio::time::sleep;

  use super::*;
  use crate::{
    fetch::Result,
    model::{
      Category,
      CodeSnippet,
    },
    search::{
      SEARCH_FAILED,
      SearchPhase,
    },
  };

  type Reply = (Duration, Result<Vec<CodeSnippet>>);

  /// Serves scripted `codes()` replies in order, then the default catalog.
  #[derive(Default)]
  struct Scripted {
    replies: Mutex<VecDeque<Reply>>,
    fetches: AtomicUsize,
  }

  impl Scripted {
    fn with(replies: Vec<Reply>) -> Arc<Self> {
      Arc::new(Self {
        replies: Mutex::new(replies.into()),
        fetches: AtomicUsize::new(0),
      })
    }

    fn fetches(&self) -> usize {
      self.fetches.load(Ordering::SeqCst)
    }
  }

  #[async_trait]
  impl SnippetSource for Scripted {
    async fn categories(&self) -> Result<Vec<Category>> {
      Ok(vec![Category {
        id:        "c1".into(),
        title:     "React".into(),
        image_url: None,
      }])
    }

    async fn codes(&self) -> Result<Vec<CodeSnippet>> {
      self.fetches.fetch_add(1, Ordering::SeqCst);
      let reply = self.replies.lock().unwrap().pop_front();
      match reply {
        Some((delay, reply)) => {
          sleep(delay).await;
          reply
        },
        None => Ok(vec![code("s1", "useEffect in react")]),
      }
    }

    async fn code(&self, id: &str) -> Result<CodeSnippet> {
      Err(TransportError::new(Some(404), format!("{id} not found")))
    }
  }

  fn code(id: &str, title: &str) -> CodeSnippet {
    CodeSnippet {
      id:          id.into(),
      title:       title.into(),
      body:        String::new(),
      category_id: "c1".into(),
    }
  }

  fn titles(snapshot: &SearchSnapshot) -> Vec<String> {
    snapshot
      .results
      .codes
      .iter()
      .map(|hit| hit.snippet.title.clone())
      .collect()
  }

  #[tokio::test(start_paused = true)]
  async fn typing_bursts_fetch_once() {
    let source = Scripted::with(Vec::new());
    let handle = SearchHandle::spawn(source.clone(), SearchConfig::default());

    handle.input("reac");
    sleep(Duration::from_millis(100)).await;
    handle.input("react");
    sleep(Duration::from_millis(250)).await;
    assert_eq!(source.fetches(), 0);
    assert_eq!(handle.snapshot().phase, SearchPhase::Debouncing);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.fetches(), 1);
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.query.text(), "react");
    assert_eq!(snapshot.phase, SearchPhase::Displaying);
    assert_eq!(snapshot.results.categories.len(), 1);
    assert_eq!(titles(&snapshot), vec!["useEffect in react"]);
  }

  #[tokio::test(start_paused = true)]
  async fn short_queries_never_fetch() {
    let source = Scripted::with(Vec::new());
    let handle = SearchHandle::spawn(source.clone(), SearchConfig::default());

    handle.input("r");
    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.fetches(), 0);
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Suppressed);
    assert!(snapshot.has_searched);
    assert!(snapshot.results.is_empty());
  }

  #[tokio::test(start_paused = true)]
  async fn stale_results_are_discarded() {
    let source = Scripted::with(vec![
      (Duration::from_millis(1000), Ok(vec![code("a", "beta stale")])),
      (Duration::from_millis(100), Ok(vec![code("b", "beta fresh")])),
    ]);
    let handle = SearchHandle::spawn(source.clone(), SearchConfig::default());

    // A dispatches at 300ms and answers at 1300ms.
    handle.input("bet");
    sleep(Duration::from_millis(400)).await;
    assert_eq!(source.fetches(), 1);
    assert!(handle.snapshot().is_searching());

    // B dispatches at 700ms and answers at 800ms.
    handle.input("beta");
    sleep(Duration::from_millis(450)).await;
    assert_eq!(source.fetches(), 2);
    assert_eq!(titles(&handle.snapshot()), vec!["beta fresh"]);

    sleep(Duration::from_secs(2)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.query.text(), "beta");
    assert_eq!(titles(&snapshot), vec!["beta fresh"]);
  }

  #[tokio::test(start_paused = true)]
  async fn failure_then_recovery() {
    let source = Scripted::with(vec![(
      Duration::ZERO,
      Err(TransportError::new(Some(500), "boom")),
    )]);
    let handle = SearchHandle::spawn(source.clone(), SearchConfig::default());

    handle.input("react");
    sleep(Duration::from_secs(1)).await;
    let failed = handle.snapshot();
    assert_eq!(failed.phase, SearchPhase::Failed);
    assert!(failed.results.is_empty());
    let message = failed.message.expect("failure message");
    assert_eq!(message.text, SEARCH_FAILED);
    assert!(message.retryable);

    handle.input("react ");
    sleep(Duration::from_secs(1)).await;
    let recovered = handle.snapshot();
    assert_eq!(source.fetches(), 2);
    assert_eq!(recovered.phase, SearchPhase::Displaying);
  }

  #[tokio::test(start_paused = true)]
  async fn empty_input_clears_without_waiting() {
    let source = Scripted::with(Vec::new());
    let handle = SearchHandle::spawn(source.clone(), SearchConfig::default());

    handle.input("react");
    sleep(Duration::from_secs(1)).await;
    assert_eq!(handle.snapshot().phase, SearchPhase::Displaying);

    handle.input("");
    sleep(Duration::from_millis(1)).await;
    let snapshot = handle.snapshot();
    assert_eq!(snapshot.phase, SearchPhase::Idle);
    assert!(snapshot.results.is_empty());
    assert!(!snapshot.has_searched);

    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.fetches(), 1);
  }

  #[tokio::test(start_paused = true)]
  async fn clear_cancels_pending_debounce() {
    let source = Scripted::with(Vec::new());
    let handle = SearchHandle::spawn(source.clone(), SearchConfig::default());
    let mut updates = handle.subscribe();

    handle.input("react");
    updates.changed().await.unwrap();
    assert_eq!(updates.borrow_and_update().phase, SearchPhase::Debouncing);

    handle.clear();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(source.fetches(), 0);
    assert_eq!(handle.snapshot().query.text(), "");
  }
}
