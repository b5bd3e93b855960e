//! `codebank view` and `codebank render`.

use std::{
  fs,
  io::{
    self,
    Read,
    Write,
  },
  sync::Arc,
};

use anyhow::{
  Context,
  Result,
  anyhow,
};
use codebank_lib::{
  fetch::load_code,
  handlers::CopyAction,
  messages::MessageCenter,
  model::CodeSnippet,
  render::{
    CodeRenderer,
    RenderedCode,
    html::code_to_html,
  },
  syntax::{
    BundledHighlighter,
    Highlighter,
    PLAINTEXT,
  },
};

use crate::{
  ctx::Ctx,
  render::{
    Printer,
    print_code,
    print_message,
  },
  theme,
};

/// Fetches a snippet and prints it highlighted, optionally copying it.
pub async fn run(ctx: &Ctx, id: &str, html: bool, copy: bool) -> Result<()> {
  let mut messages = MessageCenter::default();
  let Some(code) = load_code(ctx.source.as_ref(), id, &mut messages).await else {
    let text = messages
      .active()
      .map_or_else(|| "An unexpected error occurred.".to_string(), |message| message.text.clone());
    return Err(anyhow!(text));
  };

  let renderer = CodeRenderer::new(BundledHighlighter::new());
  let rendered = renderer.render(&code.body);
  let stdout = io::stdout().lock();
  let mut printer = Printer::new(stdout, ctx.color);

  if html || ctx.config.render.html {
    printer.plain(&code_to_html(&rendered))?;
    printer.flush()?;
  } else {
    print_header(&mut printer, &code, &rendered)?;
    print_code(&mut printer, &rendered)?;
  }

  if copy {
    let action = CopyAction::spawn(Arc::clone(&ctx.clipboard), ctx.copy_ack());
    let copied = action.copy(&code.body, &mut messages);
    if let Some(message) = messages.active() {
      // Keep stdout clean for piping; the toast goes to stderr.
      let mut notice = Printer::new(io::stderr().lock(), ctx.color);
      print_message(&mut notice, message)?;
    }
    copied.with_context(|| format!("clipboard: {}", action.provider_name()))?;
  }
  Ok(())
}

fn print_header<W, H>(
  printer: &mut Printer<W>,
  code: &CodeSnippet,
  rendered: &RenderedCode<'_, H>,
) -> io::Result<()>
where
  W: Write,
  H: Highlighter,
{
  printer.emphasize(&code.title, theme::FOREGROUND)?;
  printer.paint(&format!("  ({})", rendered.language()), theme::MUTED)?;
  printer.newline()?;
  printer.paint(&format!("in {}", code.category_link()), theme::GUTTER)?;
  printer.newline()?;
  printer.newline()
}

/// Highlights a local file, or stdin when `input` is `-`.
pub fn run_file(ctx: &Ctx, input: &str, html: bool, language: Option<&str>) -> Result<()> {
  let source = if input == "-" {
    let mut text = String::new();
    io::stdin()
      .read_to_string(&mut text)
      .context("failed to read stdin")?;
    text
  } else {
    fs::read_to_string(input).with_context(|| format!("failed to read {input}"))?
  };

  let renderer = CodeRenderer::new(BundledHighlighter::new());
  let rendered = match language {
    Some(language) => {
      let language = resolve_language(renderer.highlighter(), language);
      renderer.render_as(&source, language)
    },
    None => renderer.render(&source),
  };
  log::debug!("rendering {input} as {}", rendered.language());

  let mut printer = Printer::new(io::stdout().lock(), ctx.color);
  if html || ctx.config.render.html {
    printer.plain(&code_to_html(&rendered))?;
    printer.flush()?;
  } else {
    print_code(&mut printer, &rendered)?;
  }
  Ok(())
}

/// `requested` when the highlighter knows it, plaintext otherwise.
fn resolve_language<'a>(highlighter: &BundledHighlighter, requested: &'a str) -> &'a str {
  if highlighter.supports(requested) {
    return requested;
  }
  log::warn!("unknown language {requested:?}, rendering as {PLAINTEXT}");
  PLAINTEXT
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn unknown_language_renders_as_plaintext() {
    let renderer = CodeRenderer::new(BundledHighlighter::new());
    let language = resolve_language(renderer.highlighter(), "klingon");
    assert_eq!(language, PLAINTEXT);

    let rendered = renderer.render_as("qapla'", language);
    assert_eq!(rendered.language(), PLAINTEXT);
    assert!(code_to_html(&rendered).contains("data-language=\"plaintext\""));
  }

  #[test]
  fn known_language_is_kept() {
    let highlighter = BundledHighlighter::new();
    assert_eq!(resolve_language(&highlighter, "rust"), "rust");
    assert_eq!(resolve_language(&highlighter, "rs"), "rs");
  }
}
