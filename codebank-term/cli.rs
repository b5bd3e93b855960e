use std::{
  borrow::Cow,
  path::{
    Path,
    PathBuf,
  },
};

use clap::{
  ArgAction,
  Parser,
  Subcommand,
};

#[derive(Parser, Debug)]
#[command(name = "codebank", about, long_about = None, version)]
pub struct Cli {
  /// Increase logging verbosity (repeat for more detail)
  #[arg(short = 'v', action = ArgAction::Count, global = true)]
  pub verbosity: u8,

  /// Save logs to a specific file
  #[arg(long = "log", value_name = "FILE", value_parser = parse_pathbuf, global = true)]
  pub log_file: Option<PathBuf>,

  /// Load configuration from a specific file
  #[arg(
    short = 'c',
    long = "config",
    value_name = "FILE",
    value_parser = parse_pathbuf,
    global = true
  )]
  pub config_file: Option<PathBuf>,

  #[command(subcommand)]
  pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
  /// Search categories and snippets (interactive without a query)
  Search {
    /// Run a single search and print the results
    query: Option<String>,
  },
  /// Fetch a snippet by id and print it highlighted
  View {
    id:   String,
    /// Print HTML markup instead of terminal colors
    #[arg(long)]
    html: bool,
    /// Copy the raw snippet to the clipboard
    #[arg(long)]
    copy: bool,
  },
  /// Highlight a local file, or stdin with `-`
  Render {
    #[arg(value_name = "FILE")]
    input:    String,
    /// Print HTML markup instead of terminal colors
    #[arg(long)]
    html:     bool,
    /// Skip detection and use this language
    #[arg(long, value_name = "LANG")]
    language: Option<String>,
  },
}

fn parse_pathbuf(value: &str) -> Result<PathBuf, String> {
  let path = codebank_stdx::path::expand_tilde(Cow::Borrowed(Path::new(value)));
  Ok(codebank_stdx::path::normalize(path))
}
