//! Language detection and per-line tokenization.
//!
//! The renderer treats highlighting as an oracle behind the [`Highlighter`]
//! trait: given a whole text it names a language, given one line and that
//! language it returns styled spans. [`PlainHighlighter`] never recognizes
//! anything; [`BundledHighlighter`] (feature `bundled-syntax`) uses syntect's
//! bundled grammars.

pub mod detect;

#[cfg(feature = "bundled-syntax")]
mod bundled;

#[cfg(feature = "bundled-syntax")]
pub use bundled::BundledHighlighter;
use thiserror::Error;

/// Language id used when detection is inconclusive.
pub const PLAINTEXT: &str = "plaintext";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SyntaxError {
  #[error("unknown language '{0}'")]
  UnknownLanguage(String),
  #[error("failed to tokenize line: {0}")]
  Tokenize(String),
}

/// Coarse token categories, the common subset most grammars agree on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenClass {
  Keyword,
  String,
  Comment,
  Number,
  Constant,
  Function,
  Type,
  Variable,
  Operator,
  Punctuation,
  Tag,
  Attribute,
}

impl TokenClass {
  pub fn name(self) -> &'static str {
    match self {
      Self::Keyword => "keyword",
      Self::String => "string",
      Self::Comment => "comment",
      Self::Number => "number",
      Self::Constant => "constant",
      Self::Function => "function",
      Self::Type => "type",
      Self::Variable => "variable",
      Self::Operator => "operator",
      Self::Punctuation => "punctuation",
      Self::Tag => "tag",
      Self::Attribute => "attribute",
    }
  }

  /// CSS class used in HTML output.
  pub fn css_class(self) -> String {
    format!("hl-{}", self.name())
  }

  /// Maps a dotted TextMate scope (`keyword.control.rust`) to a class.
  ///
  /// Scopes that only describe structure (`meta.*`, `source.*`) map to `None`.
  pub fn from_scope(scope: &str) -> Option<Self> {
    let class = match scope.split('.').next()? {
      "comment" => Self::Comment,
      "string" => Self::String,
      "keyword" if scope.starts_with("keyword.operator") => Self::Operator,
      "keyword" | "storage" => {
        if scope.starts_with("storage.type") && !scope.contains("function") {
          Self::Type
        } else {
          Self::Keyword
        }
      },
      "constant" if scope.starts_with("constant.numeric") => Self::Number,
      "constant" => Self::Constant,
      "entity" => {
        if scope.starts_with("entity.name.function") {
          Self::Function
        } else if scope.starts_with("entity.name.tag") {
          Self::Tag
        } else if scope.starts_with("entity.other.attribute-name") {
          Self::Attribute
        } else {
          Self::Type
        }
      },
      "support" => {
        if scope.starts_with("support.function") {
          Self::Function
        } else {
          Self::Type
        }
      },
      "variable" if scope.starts_with("variable.function") => Self::Function,
      "variable" => Self::Variable,
      "punctuation" => Self::Punctuation,
      _ => return None,
    };
    Some(class)
  }
}

/// A run of text with at most one style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyledSpan {
  pub text:  String,
  pub class: Option<TokenClass>,
}

impl StyledSpan {
  pub fn plain(text: impl Into<String>) -> Self {
    Self {
      text:  text.into(),
      class: None,
    }
  }

  pub fn styled(text: impl Into<String>, class: TokenClass) -> Self {
    Self {
      text:  text.into(),
      class: Some(class),
    }
  }
}

/// A single unstyled span for `line`, or nothing for an empty line.
pub fn plain_line(line: &str) -> Vec<StyledSpan> {
  if line.is_empty() {
    Vec::new()
  } else {
    vec![StyledSpan::plain(line)]
  }
}

pub trait Highlighter: Send + Sync {
  /// Best guess for the language of a whole text, or `None` when unsure.
  fn detect(&self, text: &str) -> Option<String>;

  /// Tokenizes one line (without its `\n`) as a self-contained unit.
  ///
  /// The returned span texts must concatenate back to `line`.
  fn tokenize_line(&self, language: &str, line: &str) -> Result<Vec<StyledSpan>, SyntaxError>;
}

impl<H: Highlighter + ?Sized> Highlighter for &H {
  fn detect(&self, text: &str) -> Option<String> {
    (**self).detect(text)
  }

  fn tokenize_line(&self, language: &str, line: &str) -> Result<Vec<StyledSpan>, SyntaxError> {
    (**self).tokenize_line(language, line)
  }
}

impl<H: Highlighter + ?Sized> Highlighter for std::sync::Arc<H> {
  fn detect(&self, text: &str) -> Option<String> {
    (**self).detect(text)
  }

  fn tokenize_line(&self, language: &str, line: &str) -> Result<Vec<StyledSpan>, SyntaxError> {
    (**self).tokenize_line(language, line)
  }
}

/// Recognizes nothing; every line is a single unstyled span.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainHighlighter;

impl Highlighter for PlainHighlighter {
  fn detect(&self, _text: &str) -> Option<String> {
    None
  }

  fn tokenize_line(&self, _language: &str, line: &str) -> Result<Vec<StyledSpan>, SyntaxError> {
    Ok(plain_line(line))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn scope_classification() {
    assert_eq!(
      TokenClass::from_scope("keyword.control.rust"),
      Some(TokenClass::Keyword)
    );
    assert_eq!(
      TokenClass::from_scope("keyword.operator.arithmetic"),
      Some(TokenClass::Operator)
    );
    assert_eq!(
      TokenClass::from_scope("storage.type.rust"),
      Some(TokenClass::Type)
    );
    assert_eq!(
      TokenClass::from_scope("storage.type.function.python"),
      Some(TokenClass::Keyword)
    );
    assert_eq!(
      TokenClass::from_scope("constant.numeric.integer"),
      Some(TokenClass::Number)
    );
    assert_eq!(
      TokenClass::from_scope("entity.name.function.js"),
      Some(TokenClass::Function)
    );
    assert_eq!(
      TokenClass::from_scope("entity.name.tag.html"),
      Some(TokenClass::Tag)
    );
    assert_eq!(TokenClass::from_scope("meta.block.rust"), None);
    assert_eq!(TokenClass::from_scope("source.rust"), None);
    assert_eq!(TokenClass::from_scope(""), None);
  }

  #[test]
  fn css_classes_are_prefixed() {
    assert_eq!(TokenClass::Keyword.css_class(), "hl-keyword");
    assert_eq!(TokenClass::Punctuation.css_class(), "hl-punctuation");
  }

  #[test]
  fn plain_highlighter_keeps_text() {
    let highlighter = PlainHighlighter;
    assert_eq!(highlighter.detect("fn main() {}"), None);
    assert_eq!(
      highlighter.tokenize_line(PLAINTEXT, "  x  ").unwrap(),
      vec![StyledSpan::plain("  x  ")]
    );
    assert!(highlighter.tokenize_line(PLAINTEXT, "").unwrap().is_empty());
  }
}
