//! Printing rendered code and search results to a terminal.

use std::{
  io::{
    self,
    Write,
  },
  ops::Range,
};

use codebank_lib::{
  matcher::segments,
  messages::{
    Message,
    MessageLevel,
  },
  render::RenderedCode,
  search::{
    SearchHit,
    SearchPhase,
    SearchSnapshot,
  },
  syntax::Highlighter,
};
use crossterm::{
  queue,
  style::{
    Attribute,
    Print,
    ResetColor,
    SetAttribute,
    SetForegroundColor,
  },
};
use ratatui::style::Color;

use crate::theme;

/// Writes text, colored or not.
pub struct Printer<W> {
  out:   W,
  color: bool,
}

impl<W: Write> Printer<W> {
  pub fn new(out: W, color: bool) -> Self {
    Self { out, color }
  }

  pub fn into_inner(self) -> W {
    self.out
  }

  pub fn plain(&mut self, text: &str) -> io::Result<()> {
    self.out.write_all(text.as_bytes())
  }

  pub fn paint(&mut self, text: &str, color: Color) -> io::Result<()> {
    if !self.color {
      return self.plain(text);
    }
    queue!(
      self.out,
      SetForegroundColor(theme::to_crossterm(color)),
      Print(text),
      ResetColor
    )
  }

  pub fn emphasize(&mut self, text: &str, color: Color) -> io::Result<()> {
    if !self.color {
      return self.plain(text);
    }
    queue!(
      self.out,
      SetAttribute(Attribute::Bold),
      SetForegroundColor(theme::to_crossterm(color)),
      Print(text),
      ResetColor,
      SetAttribute(Attribute::Reset)
    )
  }

  pub fn newline(&mut self) -> io::Result<()> {
    self.plain("\n")
  }

  pub fn flush(&mut self) -> io::Result<()> {
    self.out.flush()
  }
}

pub fn print_code<W, H>(printer: &mut Printer<W>, code: &RenderedCode<'_, H>) -> io::Result<()>
where
  W: Write,
  H: Highlighter,
{
  let width = code.line_count().to_string().len();
  for line in code.lines() {
    printer.paint(&format!("{:>width$} │ ", line.number), theme::GUTTER)?;
    for token in &line.tokens {
      printer.paint(&token.text, theme::token_color(token.class))?;
    }
    printer.newline()?;
  }
  printer.flush()
}

/// `text` with the matched ranges emphasized.
pub fn print_matched<W: Write>(
  printer: &mut Printer<W>,
  text: &str,
  spans: &[Range<usize>],
) -> io::Result<()> {
  for segment in segments(text, spans) {
    if segment.highlighted {
      printer.emphasize(segment.text, theme::MATCH)?;
    } else {
      printer.paint(segment.text, theme::FOREGROUND)?;
    }
  }
  Ok(())
}

/// Fixed-width label in front of a hit's title.
pub fn hit_tag(hit: &SearchHit<'_>) -> &'static str {
  match hit {
    SearchHit::Category(_) => "[category] ",
    SearchHit::Code(_) => "[code]     ",
  }
}

/// A snippet's preview folded onto one line, indented under the title.
pub fn preview_line(hit: &SearchHit<'_>) -> Option<String> {
  let SearchHit::Code(code) = hit else {
    return None;
  };
  let preview = code.snippet.preview();
  let preview = preview.split_whitespace().collect::<Vec<_>>().join(" ");
  (!preview.is_empty()).then(|| format!("{:width$}{preview}", "", width = hit_tag(hit).len()))
}

pub fn print_hit<W: Write>(printer: &mut Printer<W>, hit: &SearchHit<'_>) -> io::Result<()> {
  printer.paint(hit_tag(hit), theme::MUTED)?;
  print_matched(printer, hit.title(), hit.title_spans())?;
  printer.paint(&format!("  {}", hit.link()), theme::GUTTER)?;

  if let Some(preview) = preview_line(hit) {
    printer.newline()?;
    printer.paint(&preview, theme::MUTED)?;
  }
  Ok(())
}

/// The line shown above the results, if any.
pub fn status_line(snapshot: &SearchSnapshot, min_query_len: usize) -> Option<(String, Color)> {
  let status = match snapshot.phase {
    SearchPhase::Idle | SearchPhase::Debouncing => return None,
    SearchPhase::Fetching => ("Searching...".to_string(), theme::MUTED),
    SearchPhase::Suppressed => {
      (
        format!("Type at least {min_query_len} characters to search."),
        theme::MUTED,
      )
    },
    SearchPhase::Empty => {
      (
        format!("No results found for \"{}\"", snapshot.query.text().trim()),
        theme::MUTED,
      )
    },
    SearchPhase::Failed => {
      let text = snapshot
        .message
        .as_ref()
        .map_or_else(|| "Search failed.".to_string(), |message| message.text.clone());
      (text, theme::ERROR)
    },
    SearchPhase::Displaying => {
      let total = snapshot.results.total();
      let plural = if total == 1 { "" } else { "s" };
      (format!("Found {total} result{plural}"), theme::SUCCESS)
    },
  };
  Some(status)
}

pub fn print_results<W: Write>(
  printer: &mut Printer<W>,
  snapshot: &SearchSnapshot,
  min_query_len: usize,
) -> io::Result<()> {
  if let Some((status, color)) = status_line(snapshot, min_query_len) {
    printer.paint(&status, color)?;
    printer.newline()?;
  }
  for hit in snapshot.results.hits() {
    print_hit(printer, &hit)?;
    printer.newline()?;
  }
  printer.flush()
}

pub fn print_message<W: Write>(printer: &mut Printer<W>, message: &Message) -> io::Result<()> {
  let color = match message.level {
    MessageLevel::Success => theme::SUCCESS,
    MessageLevel::Error => theme::ERROR,
  };
  printer.paint(&message.text, color)?;
  printer.newline()?;
  printer.flush()
}
