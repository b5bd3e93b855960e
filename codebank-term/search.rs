//! `codebank search`: one-shot and interactive.

use std::{
  io,
  sync::Arc,
  time::Duration,
};

use anyhow::Result;
use codebank_lib::{
  fetch::SnippetSource,
  handlers::{
    Handlers,
    SearchHandle,
  },
  matcher::segments,
  messages::{
    Message,
    MessageCenter,
    MessageLevel,
  },
  model::DeepLink,
  search::{
    SearchHit,
    SearchPhase,
    SearchSnapshot,
  },
};
use crossterm::event::{
  self,
  Event,
  KeyCode,
  KeyEvent,
  KeyEventKind,
  KeyModifiers,
};
use ratatui::{
  Frame,
  layout::{
    Constraint,
    Layout,
  },
  style::{
    Modifier,
    Style,
  },
  text::{
    Line,
    Span,
  },
  widgets::{
    List,
    ListItem,
    ListState,
    Paragraph,
  },
};
use unicode_width::UnicodeWidthStr;

use crate::{
  ctx::Ctx,
  render::{
    Printer,
    hit_tag,
    preview_line,
    print_results,
    status_line,
  },
  terminal::Terminal,
  theme,
};

const PROMPT: &str = "search> ";

fn settled(snapshot: &SearchSnapshot) -> bool {
  matches!(
    snapshot.phase,
    SearchPhase::Suppressed | SearchPhase::Displaying | SearchPhase::Empty | SearchPhase::Failed
  )
}

/// Runs one search through the debounced pipeline and prints the outcome.
pub async fn run_once(ctx: &Ctx, query: &str) -> Result<()> {
  let handle = SearchHandle::spawn(ctx.source.clone(), ctx.search_config());
  let mut updates = handle.subscribe();
  handle.input(query);

  let snapshot = if query.trim().is_empty() {
    handle.snapshot()
  } else {
    updates.wait_for(settled).await?.clone()
  };

  let mut printer = Printer::new(io::stdout().lock(), ctx.color);
  print_results(&mut printer, &snapshot, ctx.search_config().min_query_len)?;
  if snapshot.phase == SearchPhase::Failed {
    anyhow::bail!("search failed");
  }
  Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PromptAction {
  Nothing,
  Edited,
  Cleared,
  Moved,
  Copy,
  Open,
  Quit,
}

#[derive(Debug, Default)]
struct Prompt {
  query:    String,
  selected: usize,
}

impl Prompt {
  fn handle_key(&mut self, key: KeyEvent, hits: usize) -> PromptAction {
    if key.kind == KeyEventKind::Release {
      return PromptAction::Nothing;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
      KeyCode::Esc => PromptAction::Quit,
      KeyCode::Char('c') if ctrl => PromptAction::Quit,
      KeyCode::Char('y') if ctrl && hits > 0 => PromptAction::Copy,
      KeyCode::Char('u') if ctrl => {
        self.query.clear();
        self.selected = 0;
        PromptAction::Cleared
      },
      KeyCode::Char(ch) if !ctrl => {
        self.query.push(ch);
        self.selected = 0;
        PromptAction::Edited
      },
      KeyCode::Backspace => {
        if self.query.pop().is_none() {
          return PromptAction::Nothing;
        }
        self.selected = 0;
        PromptAction::Edited
      },
      KeyCode::Up => {
        self.selected = self.selected.saturating_sub(1);
        PromptAction::Moved
      },
      KeyCode::Down => {
        if self.selected + 1 < hits {
          self.selected += 1;
        }
        PromptAction::Moved
      },
      KeyCode::Enter if hits > 0 => PromptAction::Open,
      _ => PromptAction::Nothing,
    }
  }
}

/// Interactive prompt. Returns the link the user opened, if any.
///
/// Must run inside a tokio runtime context (`Runtime::enter`) on a thread that
/// may block.
pub fn run_interactive(ctx: &Ctx) -> Result<Option<DeepLink>> {
  let source: Arc<dyn SnippetSource> = ctx.source.clone();
  let handlers = Handlers::spawn(
    source,
    Arc::clone(&ctx.clipboard),
    ctx.search_config(),
    ctx.copy_ack(),
  );
  let mut updates = handlers.search.subscribe();
  let mut messages = MessageCenter::default();

  let mut terminal = Terminal::new()?;
  terminal.enter_raw_mode()?;

  let mut screen = Screen {
    prompt:        Prompt::default(),
    snapshot:      handlers.search.snapshot(),
    min_query_len: ctx.search_config().min_query_len,
    copied:        false,
  };
  let mut dirty = true;

  let opened = loop {
    if event::poll(Duration::from_millis(50))? {
      if let Event::Key(key) = event::read()? {
        let hits = screen.snapshot.results.total();
        match screen.prompt.handle_key(key, hits) {
          PromptAction::Nothing | PromptAction::Moved => {},
          PromptAction::Edited => {
            messages.dismiss();
            handlers.search.input(screen.prompt.query.clone());
          },
          PromptAction::Cleared => {
            messages.dismiss();
            handlers.search.clear();
          },
          PromptAction::Copy => {
            if let Some(SearchHit::Code(code)) = screen.selected()
              && let Err(err) = handlers.copy.copy(&code.snippet.body, &mut messages)
            {
              log::debug!("copy from the prompt failed: {err}");
            }
          },
          PromptAction::Open => break screen.selected().map(|hit| hit.link()),
          PromptAction::Quit => break None,
        }
      }
      dirty = true;
    }

    if updates.has_changed().unwrap_or(false) {
      screen.snapshot = updates.borrow_and_update().clone();
      let last = screen.snapshot.results.total().saturating_sub(1);
      screen.prompt.selected = screen.prompt.selected.min(last);
      dirty = true;
    }

    let copied = handlers.copy.is_copied();
    if copied != screen.copied {
      screen.copied = copied;
      dirty = true;
    }

    if dirty {
      let toast = visible_toast(messages.active(), screen.copied);
      terminal.draw(|frame| screen.render(frame, toast))?;
      dirty = false;
    }
  };

  terminal.leave_raw_mode()?;
  Ok(opened)
}

/// The toast that belongs on screen.
///
/// A copy confirmation lasts as long as the copy acknowledgment; errors stay
/// until the next edit dismisses them.
fn visible_toast(active: Option<&Message>, copied: bool) -> Option<&Message> {
  let message = active?;
  match message.level {
    MessageLevel::Success => copied.then_some(message),
    MessageLevel::Error => Some(message),
  }
}

/// Terminal column right after the typed query.
fn cursor_column(query: &str) -> u16 {
  u16::try_from(PROMPT.width() + query.width()).unwrap_or(u16::MAX)
}

fn hit_item(hit: &SearchHit<'_>) -> ListItem<'static> {
  let mut title = vec![Span::styled(hit_tag(hit), Style::new().fg(theme::MUTED))];
  for segment in segments(hit.title(), hit.title_spans()) {
    let style = if segment.highlighted {
      Style::new().fg(theme::MATCH).add_modifier(Modifier::BOLD)
    } else {
      Style::new().fg(theme::FOREGROUND)
    };
    title.push(Span::styled(segment.text.to_string(), style));
  }
  title.push(Span::styled(
    format!("  {}", hit.link()),
    Style::new().fg(theme::GUTTER),
  ));

  let mut lines = vec![Line::from(title)];
  if let Some(preview) = preview_line(hit) {
    lines.push(Line::styled(preview, Style::new().fg(theme::MUTED)));
  }
  ListItem::new(lines)
}

struct Screen {
  prompt:        Prompt,
  snapshot:      SearchSnapshot,
  min_query_len: usize,
  /// Mirrors the copy acknowledgment so the screen redraws when it reverts.
  copied:        bool,
}

impl Screen {
  fn selected(&self) -> Option<SearchHit<'_>> {
    self.snapshot.results.hits().nth(self.prompt.selected)
  }

  fn render(&self, frame: &mut Frame<'_>, toast: Option<&Message>) {
    let [prompt_area, status_area, list_area, toast_area] = Layout::vertical([
      Constraint::Length(1),
      Constraint::Length(1),
      Constraint::Min(0),
      Constraint::Length(1),
    ])
    .areas(frame.area());

    let prompt = Line::from(vec![
      Span::styled(PROMPT, Style::new().fg(theme::MUTED)),
      Span::styled(self.prompt.query.as_str(), Style::new().fg(theme::FOREGROUND)),
    ]);
    frame.render_widget(Paragraph::new(prompt), prompt_area);

    if let Some((status, tint)) = status_line(&self.snapshot, self.min_query_len) {
      frame.render_widget(
        Paragraph::new(Span::styled(status, Style::new().fg(tint))),
        status_area,
      );
    }

    let items: Vec<_> = self.snapshot.results.hits().map(|hit| hit_item(&hit)).collect();
    let mut state = ListState::default();
    if !items.is_empty() {
      state.select(Some(self.prompt.selected));
    }
    let list = List::new(items)
      .highlight_symbol("› ")
      .highlight_style(Style::new().bg(theme::SELECTION));
    frame.render_stateful_widget(list, list_area, &mut state);

    if let Some(message) = toast {
      let tint = match message.level {
        MessageLevel::Success => theme::SUCCESS,
        MessageLevel::Error => theme::ERROR,
      };
      frame.render_widget(
        Paragraph::new(Span::styled(message.text.as_str(), Style::new().fg(tint))),
        toast_area,
      );
    }

    frame.set_cursor_position((
      prompt_area.x.saturating_add(cursor_column(&self.prompt.query)),
      prompt_area.y,
    ));
  }
}

#[cfg(test)]
mod tests {
  use codebank_lib::{
    handlers::copy::{
      COPY_FAILED,
      COPY_SUCCEEDED,
    },
    messages::MessageSource,
    model::{
      Catalog,
      Category,
      CodeSnippet,
    },
    query::SearchQuery,
    search::SearchResult,
  };
  use ratatui::backend::TestBackend;

  use super::*;

  fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
  }

  fn ctrl(ch: char) -> KeyEvent {
    KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
  }

  #[test]
  fn typing_edits_the_query() {
    let mut prompt = Prompt::default();
    assert_eq!(prompt.handle_key(key(KeyCode::Char('r')), 0), PromptAction::Edited);
    assert_eq!(prompt.handle_key(key(KeyCode::Char('s')), 0), PromptAction::Edited);
    assert_eq!(prompt.query, "rs");
    assert_eq!(prompt.handle_key(key(KeyCode::Backspace), 0), PromptAction::Edited);
    assert_eq!(prompt.query, "r");
    prompt.handle_key(key(KeyCode::Backspace), 0);
    assert_eq!(prompt.handle_key(key(KeyCode::Backspace), 0), PromptAction::Nothing);
  }

  #[test]
  fn ctrl_u_clears_and_ctrl_c_quits() {
    let mut prompt = Prompt {
      query:    "react".into(),
      selected: 2,
    };
    assert_eq!(prompt.handle_key(ctrl('u'), 5), PromptAction::Cleared);
    assert!(prompt.query.is_empty());
    assert_eq!(prompt.selected, 0);
    assert_eq!(prompt.handle_key(ctrl('c'), 5), PromptAction::Quit);
    assert_eq!(prompt.handle_key(key(KeyCode::Esc), 5), PromptAction::Quit);
  }

  #[test]
  fn selection_stays_in_bounds() {
    let mut prompt = Prompt::default();
    prompt.handle_key(key(KeyCode::Up), 2);
    assert_eq!(prompt.selected, 0);
    prompt.handle_key(key(KeyCode::Down), 2);
    prompt.handle_key(key(KeyCode::Down), 2);
    assert_eq!(prompt.selected, 1);
  }

  #[test]
  fn enter_and_copy_need_a_hit() {
    let mut prompt = Prompt::default();
    assert_eq!(prompt.handle_key(key(KeyCode::Enter), 0), PromptAction::Nothing);
    assert_eq!(prompt.handle_key(key(KeyCode::Enter), 1), PromptAction::Open);
    assert_eq!(prompt.handle_key(ctrl('y'), 0), PromptAction::Nothing);
    assert_eq!(prompt.handle_key(ctrl('y'), 1), PromptAction::Copy);
    assert!(prompt.query.is_empty());
  }

  #[test]
  fn settled_phases() {
    let mut snapshot = SearchSnapshot::default();
    assert!(!settled(&snapshot));
    snapshot.phase = SearchPhase::Fetching;
    assert!(!settled(&snapshot));
    snapshot.phase = SearchPhase::Empty;
    assert!(settled(&snapshot));
  }

  fn screen(query: &str) -> Screen {
    let catalog = Catalog {
      categories: vec![Category {
        id:        "c1".into(),
        title:     "React".into(),
        image_url: None,
      }],
      codes:      vec![CodeSnippet {
        id:          "s1".into(),
        title:       "useEffect cleanup".into(),
        body:        "// react hooks\nuseEffect(() => {});".into(),
        category_id: "c1".into(),
      }],
    };
    let query = SearchQuery::new(query);
    Screen {
      prompt:        Prompt {
        query:    query.text().to_string(),
        selected: 0,
      },
      snapshot:      SearchSnapshot {
        phase: SearchPhase::Displaying,
        results: SearchResult::filter(catalog, &query),
        query,
        has_searched: true,
        ..SearchSnapshot::default()
      },
      min_query_len: 2,
      copied:        false,
    }
  }

  fn draw(screen: &Screen, toast: Option<&Message>) -> Vec<String> {
    let mut terminal = ratatui::Terminal::new(TestBackend::new(60, 8)).unwrap();
    terminal.draw(|frame| screen.render(frame, toast)).unwrap();
    let buffer = terminal.backend().buffer();
    buffer
      .content
      .chunks(buffer.area.width as usize)
      .map(|row| row.iter().map(|cell| cell.symbol()).collect::<String>())
      .collect()
  }

  #[test]
  fn copy_confirmation_follows_the_acknowledgment() {
    let mut messages = MessageCenter::default();
    messages.success(MessageSource::Clipboard, COPY_SUCCEEDED);
    assert_eq!(
      visible_toast(messages.active(), true).map(|m| m.text.as_str()),
      Some(COPY_SUCCEEDED)
    );
    assert_eq!(visible_toast(messages.active(), false), None);
  }

  #[test]
  fn copy_failure_is_shown_without_an_acknowledgment() {
    let mut messages = MessageCenter::default();
    messages.error(MessageSource::Clipboard, COPY_FAILED);
    let toast = visible_toast(messages.active(), false);
    assert_eq!(toast.map(|m| m.text.as_str()), Some(COPY_FAILED));

    let rows = draw(&screen("react"), toast);
    assert!(rows[7].starts_with(COPY_FAILED));

    messages.dismiss();
    assert_eq!(visible_toast(messages.active(), false), None);
  }

  #[test]
  fn screen_lists_hits_under_the_prompt() {
    let rows = draw(&screen("react"), None);
    assert!(rows[0].starts_with("search> react"));
    assert!(rows[1].starts_with("Found 2 results"));
    assert!(rows[2].starts_with("› [category] React  /codes/c1"));
    assert!(rows[3].starts_with("  [code]     useEffect cleanup  /view-code/s1"));
    assert!(rows[4].contains("// react hooks useEffect"));
    assert!(rows[7].trim().is_empty());
  }

  #[test]
  fn cursor_column_counts_display_width() {
    assert_eq!(cursor_column(""), 8);
    assert_eq!(cursor_column("ab"), 10);
    assert_eq!(cursor_column("日本"), 12);
    assert_eq!(cursor_column(&"x".repeat(70_000)), u16::MAX);
  }
}
