use crate::matcher::fold_case;

/// A search query as typed, plus the form used for matching.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
  text:       String,
  normalized: String,
}

impl SearchQuery {
  pub fn new(text: impl Into<String>) -> Self {
    let text = text.into();
    let normalized = fold_case(text.trim());
    Self { text, normalized }
  }

  /// The raw input, untrimmed.
  pub fn text(&self) -> &str {
    &self.text
  }

  /// Trimmed and case folded.
  pub fn normalized(&self) -> &str {
    &self.normalized
  }

  pub fn is_empty(&self) -> bool {
    self.normalized.is_empty()
  }

  /// Length in characters of the normalized query.
  pub fn len(&self) -> usize {
    self.normalized.chars().count()
  }
}
