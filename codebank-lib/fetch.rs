//! The data-fetch capability consumed by search and the snippet view.
//!
//! Implementations live with the runtime hosts (see `codebank-runtime` for the
//! HTTP one). The core only ever sees [`TransportError`]; telling a 404 from a
//! 403 for messaging is left to whoever called [`SnippetSource::code`].

use async_trait::async_trait;
use thiserror::Error;

use crate::{
  messages::{
    MessageCenter,
    MessageSource,
  },
  model::{
    Catalog,
    Category,
    CodeSnippet,
  },
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{message}")]
pub struct TransportError {
  /// HTTP status, when the server answered at all.
  pub status:  Option<u16>,
  pub message: String,
}

impl TransportError {
  pub fn new(status: Option<u16>, message: impl Into<String>) -> Self {
    Self {
      status,
      message: message.into(),
    }
  }

  /// The request never got a response (connection, timeout, decoding).
  pub fn unreachable(message: impl Into<String>) -> Self {
    Self::new(None, message)
  }

  pub fn is_not_found(&self) -> bool {
    self.status == Some(404)
  }

  pub fn is_forbidden(&self) -> bool {
    self.status == Some(403)
  }
}

pub type Result<T> = std::result::Result<T, TransportError>;

#[async_trait]
pub trait SnippetSource: Send + Sync {
  /// Every category, in server order.
  async fn categories(&self) -> Result<Vec<Category>>;
  /// Every snippet across all categories, in server order.
  async fn codes(&self) -> Result<Vec<CodeSnippet>>;
  async fn code(&self, id: &str) -> Result<CodeSnippet>;
}

/// Requests both collections together and waits for both.
///
/// Either request failing fails the whole fetch; there are no partial
/// catalogs.
pub async fn fetch_catalog<S>(source: &S) -> Result<Catalog>
where
  S: SnippetSource + ?Sized,
{
  let (categories, codes) = tokio::try_join!(source.categories(), source.codes())?;
  Ok(Catalog { categories, codes })
}

/// The notification shown when a single snippet cannot be loaded.
pub fn code_error_message(err: &TransportError) -> String {
  match err.status {
    Some(404) => "Code not found.".to_string(),
    Some(403) => "You are not authorized to view this code.".to_string(),
    Some(_) => format!("Failed to fetch the code: {}", err.message),
    None => "An unexpected error occurred.".to_string(),
  }
}

/// Fetches one snippet for the view page, publishing a message on failure.
pub async fn load_code<S>(source: &S, id: &str, messages: &mut MessageCenter) -> Option<CodeSnippet>
where
  S: SnippetSource + ?Sized,
{
  match source.code(id).await {
    Ok(code) => Some(code),
    Err(err) => {
      log::warn!("fetching code {id} failed: {err}");
      messages.error(MessageSource::Fetch, code_error_message(&err));
      None
    },
  }
}
