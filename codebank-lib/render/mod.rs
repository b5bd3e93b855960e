//! Turning raw snippet text into numbered, styled lines.
//!
//! Language detection runs once per [`CodeRenderer::render`] call; each line is
//! then tokenized on its own with that language as the iterator is advanced.
//! One [`RenderedLine`] is produced per `\n`-separated segment of the source,
//! so an empty source is a single empty line and a trailing newline yields a
//! trailing empty line.

pub mod html;

use log::debug;

use crate::syntax::{
  Highlighter,
  PLAINTEXT,
  StyledSpan,
  plain_line,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedLine {
  /// 1-based.
  pub number: usize,
  pub tokens: Vec<StyledSpan>,
}

impl RenderedLine {
  /// The original line text.
  pub fn text(&self) -> String {
    self.tokens.iter().map(|span| span.text.as_str()).collect()
  }
}

#[derive(Debug, Clone)]
pub struct CodeRenderer<H> {
  highlighter: H,
}

impl<H: Highlighter> CodeRenderer<H> {
  pub fn new(highlighter: H) -> Self {
    Self { highlighter }
  }

  pub fn highlighter(&self) -> &H {
    &self.highlighter
  }

  pub fn render<'a>(&'a self, source: &'a str) -> RenderedCode<'a, H> {
    let language = self
      .highlighter
      .detect(source)
      .unwrap_or_else(|| PLAINTEXT.to_string());
    debug!("rendering {} bytes as {language}", source.len());
    RenderedCode {
      highlighter: &self.highlighter,
      source,
      language,
    }
  }

  /// Skips detection and tokenizes with `language`.
  pub fn render_as<'a>(&'a self, source: &'a str, language: &str) -> RenderedCode<'a, H> {
    RenderedCode {
      highlighter: &self.highlighter,
      source,
      language: language.to_string(),
    }
  }
}

pub struct RenderedCode<'a, H> {
  highlighter: &'a H,
  source:      &'a str,
  language:    String,
}

impl<'a, H: Highlighter> RenderedCode<'a, H> {
  pub fn language(&self) -> &str {
    &self.language
  }

  /// The unmodified input, which is what a copy action exports.
  pub fn source(&self) -> &'a str {
    self.source
  }

  pub fn line_count(&self) -> usize {
    self.source.split('\n').count()
  }

  pub fn lines(&self) -> RenderedLines<'_, H> {
    RenderedLines {
      highlighter: self.highlighter,
      language:    &self.language,
      segments:    self.source.split('\n').enumerate(),
    }
  }
}

pub struct RenderedLines<'a, H> {
  highlighter: &'a H,
  language:    &'a str,
  segments:    std::iter::Enumerate<std::str::Split<'a, char>>,
}

impl<H: Highlighter> RenderedLines<'_, H> {
  fn tokenize(&self, number: usize, line: &str) -> Vec<StyledSpan> {
    if line.trim().is_empty() {
      return plain_line(line);
    }
    match self.highlighter.tokenize_line(self.language, line) {
      Ok(tokens) if covers(&tokens, line) => tokens,
      Ok(_) => {
        debug!("line {number}: tokens do not cover the line, rendering plain");
        plain_line(line)
      },
      Err(err) => {
        debug!("line {number}: {err}, rendering plain");
        plain_line(line)
      },
    }
  }
}

fn covers(tokens: &[StyledSpan], line: &str) -> bool {
  let mut rest = line;
  for token in tokens {
    match rest.strip_prefix(token.text.as_str()) {
      Some(tail) => rest = tail,
      None => return false,
    }
  }
  rest.is_empty()
}

impl<H: Highlighter> Iterator for RenderedLines<'_, H> {
  type Item = RenderedLine;

  fn next(&mut self) -> Option<Self::Item> {
    let (index, line) = self.segments.next()?;
    let number = index + 1;
    Some(RenderedLine {
      number,
      tokens: self.tokenize(number, line),
    })
  }
}
