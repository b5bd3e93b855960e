//! Categories, snippets and the links that point at them.
//!
//! Field names follow the API's JSON: documents carry their id as `_id`, a
//! snippet's source text lives under `code` and the category image under
//! `image`.

use std::fmt;

use serde::{
  Deserialize,
  Serialize,
};

/// Number of characters shown in a snippet preview.
pub const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
  #[serde(rename = "_id")]
  pub id:        String,
  pub title:     String,
  #[serde(rename = "image", default)]
  pub image_url: Option<String>,
}

impl Category {
  pub fn link(&self) -> DeepLink {
    DeepLink::CategoryCodes(self.id.clone())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
  #[serde(rename = "_id")]
  pub id:          String,
  pub title:       String,
  #[serde(rename = "code")]
  pub body:        String,
  #[serde(rename = "categoryId")]
  pub category_id: String,
}

impl CodeSnippet {
  pub fn link(&self) -> DeepLink {
    DeepLink::ViewCode(self.id.clone())
  }

  pub fn category_link(&self) -> DeepLink {
    DeepLink::CategoryCodes(self.category_id.clone())
  }

  /// The first [`PREVIEW_CHARS`] characters of the body, with `...` appended
  /// when the body is longer.
  pub fn preview(&self) -> String {
    match self.body.char_indices().nth(PREVIEW_CHARS) {
      Some((cut, _)) => format!("{}...", &self.body[..cut]),
      None => self.body.clone(),
    }
  }
}

/// Both candidate collections, as fetched together for one search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
  pub categories: Vec<Category>,
  pub codes:      Vec<CodeSnippet>,
}

/// A stable route to a detail view.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeepLink {
  /// The list of snippets belonging to a category.
  CategoryCodes(String),
  /// A single snippet.
  ViewCode(String),
}

impl DeepLink {
  pub fn id(&self) -> &str {
    match self {
      Self::CategoryCodes(id) | Self::ViewCode(id) => id,
    }
  }

  pub fn path(&self) -> String {
    match self {
      Self::CategoryCodes(id) => format!("/codes/{id}"),
      Self::ViewCode(id) => format!("/view-code/{id}"),
    }
  }
}

impl fmt::Display for DeepLink {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.path())
  }
}
