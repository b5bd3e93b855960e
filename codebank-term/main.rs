use std::process::ExitCode;

use anyhow::{
  Context,
  Result,
};
use clap::Parser;
use codebank_lib::model::DeepLink;
use codebank_loader::config::Config;

use crate::{
  cli::{
    Cli,
    Command,
  },
  ctx::Ctx,
};

mod cli;
mod ctx;
mod render;
mod search;
mod terminal;
mod theme;
mod view;

fn setup_logging(verbosity: u8) -> Result<()> {
  let level = match verbosity {
    0 => log::LevelFilter::Warn,
    1 => log::LevelFilter::Info,
    2 => log::LevelFilter::Debug,
    _ => log::LevelFilter::Trace,
  };

  // Stdout belongs to the results; logs only ever go to the file.
  fern::Dispatch::new()
    .format(|out, message, record| {
      out.finish(format_args!(
        "{} {} [{}] {}",
        chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
        record.target(),
        record.level(),
        message
      ))
    })
    .level(level)
    .chain(fern::log_file(codebank_loader::log_file())?)
    .apply()?;
  Ok(())
}

fn main() -> ExitCode {
  match run() {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::FAILURE
    },
  }
}

fn run() -> Result<()> {
  let cli = Cli::parse();

  codebank_loader::initialize_config_file(cli.config_file.clone());
  codebank_loader::initialize_log_file(cli.log_file.clone());
  setup_logging(cli.verbosity).context("failed to initialize logging")?;

  let config = Config::load(cli.config_file.as_deref()).context("failed to load the config")?;
  let ctx = Ctx::new(config)?;

  let runtime = tokio::runtime::Builder::new_multi_thread()
    .enable_all()
    .build()
    .context("failed to start the async runtime")?;

  match cli.command {
    Command::Search { query: Some(query) } => runtime.block_on(search::run_once(&ctx, &query)),
    Command::Search { query: None } => {
      let opened = {
        let _guard = runtime.enter();
        search::run_interactive(&ctx)?
      };
      match opened {
        Some(DeepLink::ViewCode(id)) => runtime.block_on(view::run(&ctx, &id, false, false)),
        Some(link @ DeepLink::CategoryCodes(_)) => {
          println!("{link}");
          Ok(())
        },
        None => Ok(()),
      }
    },
    Command::View { id, html, copy } => runtime.block_on(view::run(&ctx, &id, html, copy)),
    Command::Render {
      input,
      html,
      language,
    } => view::run_file(&ctx, &input, html, language.as_deref()),
  }
}
