//! Incremental search over categories and snippets.
//!
//! [`SearchEngine`] is a synchronous state machine; it never sleeps or
//! performs I/O itself. A driver (see [`crate::handlers::search`]) feeds it
//! keystrokes, calls [`SearchEngine::dispatch`] once the debounce window has
//! passed in silence, runs the fetch the returned ticket asks for and hands the
//! outcome back through [`SearchEngine::resolve`].
//!
//! ```text
//! Idle -> Debouncing -> Fetching -> Displaying | Empty | Failed
//!              \-> Suppressed (query shorter than the minimum)
//! ```
//!
//! Any keystroke moves the machine back to `Debouncing` (or `Idle` when the
//! query becomes empty) and supersedes in-flight work: its result will be
//! discarded when it arrives.
//!
//! Candidates come from full-collection fetches and are filtered here, on the
//! client. That only holds up at personal-collection scale, and is meant to.

use std::{
  ops::Range,
  time::Duration,
};

use crate::{
  fetch::TransportError,
  matcher::{
    contains,
    match_spans,
  },
  messages::{
    Message,
    MessageCenter,
    MessageSource,
  },
  model::{
    Catalog,
    Category,
    CodeSnippet,
    DeepLink,
  },
  query::SearchQuery,
  request::RequestTracker,
};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);
pub const DEFAULT_MIN_QUERY_LEN: usize = 2;

pub const SEARCH_FAILED: &str = "Failed to search. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchConfig {
  pub debounce:      Duration,
  /// Shortest normalized query (in characters) that is worth a fetch.
  pub min_query_len: usize,
}

impl Default for SearchConfig {
  fn default() -> Self {
    Self {
      debounce:      DEFAULT_DEBOUNCE,
      min_query_len: DEFAULT_MIN_QUERY_LEN,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchPhase {
  #[default]
  Idle,
  Debouncing,
  /// The query was too short to search; the UI should ask for more input.
  Suppressed,
  Fetching,
  Displaying,
  Empty,
  Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryMatch {
  pub category:    Category,
  pub title_spans: Vec<Range<usize>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeMatch {
  pub snippet:     CodeSnippet,
  pub title_spans: Vec<Range<usize>>,
  pub body_spans:  Vec<Range<usize>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
  Category,
  Code,
}

/// One entry of a result set, whichever collection it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchHit<'a> {
  Category(&'a CategoryMatch),
  Code(&'a CodeMatch),
}

impl SearchHit<'_> {
  pub fn kind(&self) -> HitKind {
    match self {
      Self::Category(_) => HitKind::Category,
      Self::Code(_) => HitKind::Code,
    }
  }

  pub fn title(&self) -> &str {
    match self {
      Self::Category(hit) => &hit.category.title,
      Self::Code(hit) => &hit.snippet.title,
    }
  }

  pub fn title_spans(&self) -> &[Range<usize>] {
    match self {
      Self::Category(hit) => &hit.title_spans,
      Self::Code(hit) => &hit.title_spans,
    }
  }

  pub fn link(&self) -> DeepLink {
    match self {
      Self::Category(hit) => hit.category.link(),
      Self::Code(hit) => hit.snippet.link(),
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchResult {
  pub categories: Vec<CategoryMatch>,
  pub codes:      Vec<CodeMatch>,
}

impl SearchResult {
  /// Filters both collections, keeping their order.
  ///
  /// A category matches on its title; a snippet on its title or its body.
  pub fn filter(catalog: Catalog, query: &SearchQuery) -> Self {
    let needle = query.normalized();

    let categories = catalog
      .categories
      .into_iter()
      .filter(|category| contains(&category.title, needle))
      .map(|category| CategoryMatch {
        title_spans: match_spans(&category.title, needle),
        category,
      })
      .collect();

    let codes = catalog
      .codes
      .into_iter()
      .filter(|code| contains(&code.title, needle) || contains(&code.body, needle))
      .map(|snippet| CodeMatch {
        title_spans: match_spans(&snippet.title, needle),
        body_spans: match_spans(&snippet.body, needle),
        snippet,
      })
      .collect();

    Self { categories, codes }
  }

  pub fn total(&self) -> usize {
    self.categories.len() + self.codes.len()
  }

  pub fn is_empty(&self) -> bool {
    self.total() == 0
  }

  pub fn clear(&mut self) {
    self.categories.clear();
    self.codes.clear();
  }

  /// Categories first, then snippets.
  pub fn hits(&self) -> impl Iterator<Item = SearchHit<'_>> {
    self
      .categories
      .iter()
      .map(SearchHit::Category)
      .chain(self.codes.iter().map(SearchHit::Code))
  }
}

/// What the driver should do after an input change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
  /// The query is empty; results were cleared and nothing is scheduled.
  Cleared,
  /// (Re)start the debounce timer with this window.
  Debounce(Duration),
}

/// A fetch the driver must perform, tagged with the request it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchTicket {
  pub request_id: u64,
  pub query:      SearchQuery,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
  /// Nothing was pending.
  Nothing,
  /// The query is too short; no fetch.
  Suppressed,
  Fetch(SearchTicket),
}

/// Everything a UI needs to draw the search panel.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSnapshot {
  pub phase:        SearchPhase,
  pub query:        SearchQuery,
  pub results:      SearchResult,
  pub has_searched: bool,
  pub message:      Option<Message>,
  pub message_seq:  u64,
}

impl SearchSnapshot {
  pub fn is_searching(&self) -> bool {
    self.phase == SearchPhase::Fetching
  }
}

#[derive(Debug, Default)]
pub struct SearchEngine {
  config:   SearchConfig,
  query:    SearchQuery,
  phase:    SearchPhase,
  results:  SearchResult,
  searched: bool,
  requests: RequestTracker,
  messages: MessageCenter,
}

impl SearchEngine {
  pub fn new(config: SearchConfig) -> Self {
    Self {
      config,
      ..Self::default()
    }
  }

  pub fn config(&self) -> SearchConfig {
    self.config
  }

  pub fn phase(&self) -> SearchPhase {
    self.phase
  }

  pub fn query(&self) -> &SearchQuery {
    &self.query
  }

  pub fn results(&self) -> &SearchResult {
    &self.results
  }

  pub fn has_searched(&self) -> bool {
    self.searched
  }

  pub fn messages(&self) -> &MessageCenter {
    &self.messages
  }

  /// Records a new input value.
  pub fn input(&mut self, text: impl Into<String>) -> InputOutcome {
    self.query = SearchQuery::new(text);
    self.requests.invalidate();

    if self.query.is_empty() {
      self.reset_results();
      self.phase = SearchPhase::Idle;
      return InputOutcome::Cleared;
    }

    if self.query.len() < self.config.min_query_len {
      self.results.clear();
    }
    self.phase = SearchPhase::Debouncing;
    InputOutcome::Debounce(self.config.debounce)
  }

  /// The clear button: empties the query and everything derived from it.
  pub fn clear(&mut self) {
    self.query = SearchQuery::default();
    self.requests.invalidate();
    self.reset_results();
    self.phase = SearchPhase::Idle;
  }

  /// Called when the debounce window elapses without new input.
  pub fn dispatch(&mut self) -> Dispatch {
    if self.phase != SearchPhase::Debouncing || self.query.is_empty() {
      return Dispatch::Nothing;
    }

    self.searched = true;
    if self.query.len() < self.config.min_query_len {
      self.results.clear();
      self.phase = SearchPhase::Suppressed;
      return Dispatch::Suppressed;
    }

    let request_id = self.requests.begin();
    self.phase = SearchPhase::Fetching;
    log::debug!(
      "dispatching search #{request_id} for {:?}",
      self.query.normalized()
    );
    Dispatch::Fetch(SearchTicket {
      request_id,
      query: self.query.clone(),
    })
  }

  /// Applies the outcome of a fetch. Returns `false` when the request was
  /// superseded and the outcome was dropped.
  pub fn resolve(
    &mut self,
    request_id: u64,
    outcome: Result<Catalog, TransportError>,
  ) -> bool {
    if !self.requests.finish(request_id) {
      log::debug!(
        "discarding stale search #{request_id} (current #{})",
        self.requests.current()
      );
      return false;
    }

    match outcome {
      Ok(catalog) => {
        self.results = SearchResult::filter(catalog, &self.query);
        self.phase = if self.results.is_empty() {
          SearchPhase::Empty
        } else {
          SearchPhase::Displaying
        };
      },
      Err(err) => {
        log::warn!("search #{request_id} failed: {err}");
        self.results.clear();
        self.phase = SearchPhase::Failed;
        self
          .messages
          .retryable_error(MessageSource::Search, SEARCH_FAILED);
      },
    }
    true
  }

  pub fn snapshot(&self) -> SearchSnapshot {
    SearchSnapshot {
      phase:        self.phase,
      query:        self.query.clone(),
      results:      self.results.clone(),
      has_searched: self.searched,
      message:      self.messages.active().cloned(),
      message_seq:  self.messages.seq(),
    }
  }

  fn reset_results(&mut self) {
    self.results.clear();
    self.searched = false;
  }
}
