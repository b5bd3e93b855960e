//! Terminal abstraction using ratatui + crossterm backend.

use std::io::{
  self,
  Stdout,
};

use anyhow::Result;
use crossterm::{
  execute,
  terminal::{
    EnterAlternateScreen,
    LeaveAlternateScreen,
    disable_raw_mode,
    enable_raw_mode,
  },
};
use ratatui::{
  Terminal as RatatuiTerminal,
  backend::CrosstermBackend,
};

pub struct Terminal {
  terminal: RatatuiTerminal<CrosstermBackend<Stdout>>,
  raw:      bool,
}

impl Terminal {
  pub fn new() -> Result<Self> {
    let backend = CrosstermBackend::new(io::stdout());
    let terminal = RatatuiTerminal::new(backend)?;
    Ok(Self {
      terminal,
      raw: false,
    })
  }

  pub fn enter_raw_mode(&mut self) -> Result<()> {
    enable_raw_mode()?;
    execute!(self.terminal.backend_mut(), EnterAlternateScreen)?;
    self.raw = true;
    self.terminal.clear()?;
    Ok(())
  }

  pub fn leave_raw_mode(&mut self) -> Result<()> {
    if !self.raw {
      return Ok(());
    }
    execute!(self.terminal.backend_mut(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    self.terminal.show_cursor()?;
    self.raw = false;
    Ok(())
  }

  pub fn draw<F>(&mut self, f: F) -> Result<()>
  where
    F: for<'a> FnOnce(&mut ratatui::Frame<'a>),
  {
    self.terminal.draw(f)?;
    Ok(())
  }
}

impl Drop for Terminal {
  fn drop(&mut self) {
    // Never leave the user's shell in raw mode, even on an error path.
    let _ = self.leave_raw_mode();
  }
}
