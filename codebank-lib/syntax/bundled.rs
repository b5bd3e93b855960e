use log::debug;
use syntect::{
  easy::ScopeRangeIterator,
  parsing::{
    ParseState,
    ScopeStack,
    SyntaxReference,
    SyntaxSet,
  },
};

use super::{
  Highlighter,
  PLAINTEXT,
  StyledSpan,
  SyntaxError,
  TokenClass,
  detect,
  plain_line,
};

/// Highlighter backed by syntect's bundled grammar set.
///
/// Loading the grammars takes a noticeable moment, so build one and share it.
pub struct BundledHighlighter {
  syntaxes: SyntaxSet,
}

impl Default for BundledHighlighter {
  fn default() -> Self {
    Self::new()
  }
}

impl std::fmt::Debug for BundledHighlighter {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("BundledHighlighter")
      .field("syntaxes", &self.syntaxes.syntaxes().len())
      .finish()
  }
}

impl BundledHighlighter {
  pub fn new() -> Self {
    Self {
      syntaxes: SyntaxSet::load_defaults_newlines(),
    }
  }

  /// Whether `language` names a grammar, by id or by file extension.
  pub fn supports(&self, language: &str) -> bool {
    language.eq_ignore_ascii_case(PLAINTEXT) || self.syntax(language).is_some()
  }

  fn syntax(&self, language: &str) -> Option<&SyntaxReference> {
    match detect::language(language) {
      Some(lang) => self.syntaxes.find_syntax_by_name(lang.syntax_name),
      None => self.syntaxes.find_syntax_by_token(language),
    }
  }
}

impl Highlighter for BundledHighlighter {
  fn detect(&self, text: &str) -> Option<String> {
    if let Some(lang) = detect::detect_language(text) {
      return Some(lang.id.to_string());
    }
    let first = text.lines().next()?;
    let syntax = self.syntaxes.find_syntax_by_first_line(first)?;
    let id = detect::language_for_syntax(&syntax.name)?.id;
    debug!("detected {id} from first line");
    Some(id.to_string())
  }

  fn tokenize_line(&self, language: &str, line: &str) -> Result<Vec<StyledSpan>, SyntaxError> {
    if language.eq_ignore_ascii_case(PLAINTEXT) {
      return Ok(plain_line(line));
    }
    let syntax = self
      .syntax(language)
      .ok_or_else(|| SyntaxError::UnknownLanguage(language.to_string()))?;

    // Every line starts from the grammar's initial state.
    let mut state = ParseState::new(syntax);
    let with_newline = format!("{line}\n");
    let ops = state
      .parse_line(&with_newline, &self.syntaxes)
      .map_err(|err| SyntaxError::Tokenize(err.to_string()))?;

    let mut stack = ScopeStack::new();
    let mut spans: Vec<StyledSpan> = Vec::new();
    for (range, op) in ScopeRangeIterator::new(&ops, &with_newline) {
      stack
        .apply(op)
        .map_err(|err| SyntaxError::Tokenize(format!("{err:?}")))?;

      let end = range.end.min(line.len());
      if range.start >= end {
        continue;
      }
      let text = &line[range.start..end];
      let class = stack
        .as_slice()
        .iter()
        .rev()
        .find_map(|scope| TokenClass::from_scope(&scope.build_string()));

      match spans.last_mut() {
        Some(last) if last.class == class => last.text.push_str(text),
        _ => {
          spans.push(StyledSpan {
            text: text.to_string(),
            class,
          })
        },
      }
    }

    Ok(spans)
  }
}
