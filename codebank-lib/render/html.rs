//! HTML markup for rendered code and highlighted search text.

use std::{
  fmt::Write,
  ops::Range,
};

use super::{
  RenderedCode,
  RenderedLine,
};
use crate::{
  matcher::segments,
  syntax::Highlighter,
};

/// Escapes the five HTML special characters.
pub fn escape_html(text: &str) -> String {
  let mut out = String::with_capacity(text.len());
  for ch in text.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#39;"),
      _ => out.push(ch),
    }
  }
  out
}

/// One line as
/// `<div class="code-line"><span class="line-number">N</span><span class="line-content">...</span></div>`.
pub fn line_to_html(line: &RenderedLine) -> String {
  let mut out = String::new();
  let _ = write!(
    out,
    "<div class=\"code-line\"><span class=\"line-number\">{}</span><span class=\"line-content\">",
    line.number
  );
  for token in &line.tokens {
    let text = escape_html(&token.text);
    match token.class {
      Some(class) => {
        let _ = write!(out, "<span class=\"{}\">{text}</span>", class.css_class());
      },
      None => out.push_str(&text),
    }
  }
  out.push_str("</span></div>");
  out
}

/// Every line, wrapped in a block tagged with the detected language.
pub fn code_to_html<H: Highlighter>(code: &RenderedCode<'_, H>) -> String {
  let mut out = format!(
    "<div class=\"code-block\" data-language=\"{}\">\n",
    escape_html(code.language())
  );
  for line in code.lines() {
    out.push_str(&line_to_html(&line));
    out.push('\n');
  }
  out.push_str("</div>");
  out
}

/// Wraps matched byte ranges of `text` in `<mark>`.
pub fn highlight_to_html(text: &str, spans: &[Range<usize>]) -> String {
  segments(text, spans)
    .into_iter()
    .map(|segment| {
      let escaped = escape_html(segment.text);
      if segment.highlighted {
        format!("<mark>{escaped}</mark>")
      } else {
        escaped
      }
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::{
    render::CodeRenderer,
    syntax::{
      PlainHighlighter,
      StyledSpan,
      TokenClass,
    },
  };

  #[test]
  fn escapes_specials() {
    assert_eq!(
      escape_html(r#"<a href="x">Tom & 'Jerry'</a>"#),
      "&lt;a href=&quot;x&quot;&gt;Tom &amp; &#39;Jerry&#39;&lt;/a&gt;"
    );
    assert_eq!(escape_html("plain"), "plain");
  }

  #[test]
  fn line_markup() {
    let line = RenderedLine {
      number: 7,
      tokens: vec![
        StyledSpan::styled("if", TokenClass::Keyword),
        StyledSpan::plain(" a < b"),
      ],
    };
    assert_eq!(
      line_to_html(&line),
      "<div class=\"code-line\"><span class=\"line-number\">7</span><span \
       class=\"line-content\"><span class=\"hl-keyword\">if</span> a &lt; b</span></div>"
    );
  }

  #[test]
  fn empty_line_keeps_its_number() {
    let line = RenderedLine {
      number: 2,
      tokens: Vec::new(),
    };
    assert!(line_to_html(&line).contains("<span class=\"line-number\">2</span>"));
  }

  #[test]
  fn code_block_has_every_line() {
    let renderer = CodeRenderer::new(PlainHighlighter);
    let html = code_to_html(&renderer.render("a\n\nb"));
    assert!(html.starts_with("<div class=\"code-block\" data-language=\"plaintext\">"));
    assert_eq!(html.matches("class=\"code-line\"").count(), 3);
  }

  #[test]
  fn marks_matches() {
    assert_eq!(
      highlight_to_html("My Code <Snippet>", &[3..7]),
      "My <mark>Code</mark> &lt;Snippet&gt;"
    );
    assert_eq!(highlight_to_html("abc", &[]), "abc");
  }
}
