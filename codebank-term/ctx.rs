use std::{
  io::IsTerminal,
  sync::Arc,
  time::Duration,
};

use anyhow::{
  Context,
  Result,
  bail,
};
use codebank_lib::{
  clipboard::ClipboardProvider,
  search::SearchConfig,
};
use codebank_loader::config::{
  ClipboardSetting,
  Config,
};
use codebank_runtime::{
  HttpSnippetSource,
  OsClipboard,
  clipboard::Command,
};

/// Everything the commands share, built once from the config.
pub struct Ctx {
  pub config:    Config,
  pub source:    Arc<HttpSnippetSource>,
  pub clipboard: Arc<dyn ClipboardProvider>,
  /// Write escape codes to stdout.
  pub color:     bool,
}

impl Ctx {
  pub fn new(config: Config) -> Result<Self> {
    let source = HttpSnippetSource::new(
      &config.api.base_url,
      Duration::from_millis(config.api.timeout_ms),
      config.api.token.clone(),
    )
    .context("failed to set up the API client")?;
    let clipboard = clipboard_from(&config.clipboard.provider)?;
    log::info!(
      "api {}, clipboard {}",
      source.base_url(),
      clipboard.name()
    );

    Ok(Self {
      source: Arc::new(source),
      clipboard: Arc::new(clipboard),
      color: std::io::stdout().is_terminal(),
      config,
    })
  }

  pub fn search_config(&self) -> SearchConfig {
    SearchConfig {
      debounce:      Duration::from_millis(self.config.search.debounce_ms),
      min_query_len: self.config.search.min_query_len,
    }
  }

  pub fn copy_ack(&self) -> Duration {
    Duration::from_millis(self.config.render.copy_ack_ms)
  }
}

fn clipboard_from(setting: &ClipboardSetting) -> Result<OsClipboard> {
  match setting {
    ClipboardSetting::Named(name) => {
      match OsClipboard::from_name(name) {
        Some(provider) => Ok(provider),
        None => bail!("unknown clipboard provider '{name}'"),
      }
    },
    ClipboardSetting::Custom { command, args } => {
      Ok(OsClipboard::Custom(Command::new(command.clone(), args.clone())))
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn clipboard_settings_resolve() {
    assert_eq!(
      clipboard_from(&ClipboardSetting::Named("none".into())).unwrap(),
      OsClipboard::None
    );
    assert!(clipboard_from(&ClipboardSetting::Named("clippy".into())).is_err());
    let custom = clipboard_from(&ClipboardSetting::Custom {
      command: "clip.exe".into(),
      args:    Vec::new(),
    })
    .unwrap();
    assert_eq!(custom.name(), "custom (clip.exe)");
  }

  #[test]
  fn durations_come_from_the_config() {
    let ctx = Ctx::new(Config::builtin().unwrap()).unwrap();
    assert_eq!(ctx.search_config(), SearchConfig::default());
    assert_eq!(ctx.copy_ack(), Duration::from_secs(2));
  }
}
