//! [`SnippetSource`] over the CodeBank REST API.

use std::time::Duration;

use async_trait::async_trait;
use codebank_lib::{
  fetch::{
    Result,
    SnippetSource,
    TransportError,
  },
  model::{
    Category,
    CodeSnippet,
  },
};
use reqwest::{
  Client,
  StatusCode,
};
use serde::{
  Deserialize,
  de::DeserializeOwned,
};
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://codebank-api.vercel.app";

#[derive(Debug, Error)]
pub enum SourceError {
  #[error("invalid API base url: {0}")]
  InvalidUrl(#[from] url::ParseError),
  #[error("API base url '{0}' cannot have paths appended")]
  CannotBeABase(String),
  #[error("failed to build HTTP client: {0}")]
  Client(#[from] reqwest::Error),
}

pub struct HttpSnippetSource {
  client: Client,
  base:   Url,
  token:  Option<String>,
}

impl HttpSnippetSource {
  pub fn new(
    base_url: &str,
    timeout: Duration,
    token: Option<String>,
  ) -> std::result::Result<Self, SourceError> {
    let base = Url::parse(base_url)?;
    if base.cannot_be_a_base() {
      return Err(SourceError::CannotBeABase(base_url.to_string()));
    }
    let client = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      client,
      base,
      token,
    })
  }

  pub fn base_url(&self) -> &Url {
    &self.base
  }

  /// `segments` appended to the base path, each percent-encoded.
  fn endpoint(&self, segments: &[&str]) -> Result<Url> {
    let mut url = self.base.clone();
    url
      .path_segments_mut()
      .map_err(|()| TransportError::unreachable(format!("invalid API base url {}", self.base)))?
      .pop_if_empty()
      .extend(segments);
    Ok(url)
  }

  async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T> {
    let url = self.endpoint(segments)?;
    log::debug!("GET {url}");

    let mut request = self.client.get(url.clone());
    if let Some(token) = &self.token {
      request = request.bearer_auth(token);
    }
    let response = request.send().await.map_err(|err| request_error(&url, &err))?;

    let status = response.status();
    if !status.is_success() {
      let body = response.text().await.unwrap_or_default();
      log::warn!("GET {url} answered {status}");
      return Err(status_error(status, &body));
    }

    response.json::<T>().await.map_err(|err| {
      TransportError::new(
        Some(status.as_u16()),
        format!("invalid response from {url}: {err}"),
      )
    })
  }
}

#[async_trait]
impl SnippetSource for HttpSnippetSource {
  async fn categories(&self) -> Result<Vec<Category>> {
    self.get(&["categories"]).await
  }

  async fn codes(&self) -> Result<Vec<CodeSnippet>> {
    self.get(&["all-codes"]).await
  }

  async fn code(&self, id: &str) -> Result<CodeSnippet> {
    self.get(&["code", id]).await
  }
}

fn request_error(url: &Url, err: &reqwest::Error) -> TransportError {
  let message = if err.is_timeout() {
    format!("request to {url} timed out")
  } else if err.is_connect() {
    format!("could not connect to {}", url.host_str().unwrap_or("server"))
  } else {
    format!("request to {url} failed: {err}")
  };
  TransportError::unreachable(message)
}

#[derive(Deserialize)]
struct ErrorBody {
  message: String,
}

/// Prefers the server's `{"message": ...}`, then the raw body, then the
/// status reason.
fn status_error(status: StatusCode, body: &str) -> TransportError {
  let message = serde_json::from_str::<ErrorBody>(body)
    .map(|body| body.message)
    .ok()
    .or_else(|| {
      let body = body.trim();
      (!body.is_empty()).then(|| body.to_string())
    })
    .unwrap_or_else(|| {
      status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
    });
  TransportError::new(Some(status.as_u16()), message)
}
