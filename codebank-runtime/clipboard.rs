//! Clipboard provider implementations for runtime hosts.
//!
//! Copying only ever exports text, so each provider is reduced to the command
//! that writes the clipboard.

use std::borrow::Cow;

use codebank_lib::clipboard::{
  ClipboardError,
  ClipboardProvider,
  Result,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
  command: Cow<'static, str>,
  args:    Cow<'static, [Cow<'static, str>]>,
}

impl Command {
  pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      command: Cow::Owned(command.into()),
      args:    args.into_iter().map(Cow::Owned).collect(),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OsClipboard {
  Pasteboard,
  Wayland,
  XClip,
  XSel,
  Win32Yank,
  Tmux,
  #[cfg(windows)]
  Windows,
  Termux,
  Custom(Command),
  None,
}

impl OsClipboard {
  pub fn detect() -> Self {
    Self::default()
  }

  /// Looks up a provider by the name used in config files.
  pub fn from_name(name: &str) -> Option<Self> {
    let provider = match name {
      "auto" => Self::detect(),
      "pasteboard" | "pbcopy" => Self::Pasteboard,
      "wayland" | "wl-copy" => Self::Wayland,
      "xclip" | "x-clip" => Self::XClip,
      "xsel" | "x-sel" => Self::XSel,
      "win32yank" | "win-32-yank" => Self::Win32Yank,
      "tmux" => Self::Tmux,
      "termux" => Self::Termux,
      #[cfg(windows)]
      "windows" => Self::Windows,
      "none" => Self::None,
      _ => return None,
    };
    Some(provider)
  }
}

impl Default for OsClipboard {
  #[cfg(windows)]
  fn default() -> Self {
    use codebank_stdx::env::binary_exists;

    if binary_exists("win32yank.exe") {
      Self::Win32Yank
    } else {
      Self::Windows
    }
  }

  #[cfg(target_os = "macos")]
  fn default() -> Self {
    use codebank_stdx::env::{
      binary_exists,
      env_var_is_set,
    };

    if env_var_is_set("TMUX") && binary_exists("tmux") {
      Self::Tmux
    } else if binary_exists("pbcopy") {
      Self::Pasteboard
    } else {
      Self::None
    }
  }

  #[cfg(not(any(windows, target_os = "macos")))]
  fn default() -> Self {
    use codebank_stdx::env::{
      binary_exists,
      env_var_is_set,
    };

    if env_var_is_set("WAYLAND_DISPLAY") && binary_exists("wl-copy") {
      Self::Wayland
    } else if env_var_is_set("DISPLAY") && binary_exists("xclip") {
      Self::XClip
    } else if env_var_is_set("DISPLAY") && binary_exists("xsel") {
      Self::XSel
    } else if binary_exists("termux-clipboard-set") {
      Self::Termux
    } else if env_var_is_set("TMUX") && binary_exists("tmux") {
      Self::Tmux
    } else if binary_exists("win32yank.exe") {
      Self::Win32Yank
    } else {
      Self::None
    }
  }
}

impl ClipboardProvider for OsClipboard {
  fn name(&self) -> Cow<'_, str> {
    fn builtin_name<'a>(name: &'static str, command: &'static Command) -> Cow<'a, str> {
      Cow::Owned(format!("{} ({})", name, command.command))
    }

    match self {
      Self::Pasteboard => builtin_name("pasteboard", &PASTEBOARD),
      Self::Wayland => builtin_name("wayland", &WL_COPY),
      Self::XClip => builtin_name("x-clip", &XCLIP),
      Self::XSel => builtin_name("x-sel", &XSEL),
      Self::Win32Yank => builtin_name("win-32-yank", &WIN32),
      Self::Tmux => builtin_name("tmux", &TMUX),
      Self::Termux => builtin_name("termux", &TERMUX),
      #[cfg(windows)]
      Self::Windows => "windows".into(),
      Self::Custom(command) => Cow::Owned(format!("custom ({})", command.command)),
      Self::None => "none".into(),
    }
  }

  fn set_contents(&self, content: &str) -> Result<()> {
    match self {
      Self::Pasteboard => execute_command(&PASTEBOARD, content),
      Self::Wayland => execute_command(&WL_COPY, content),
      Self::XClip => execute_command(&XCLIP, content),
      Self::XSel => execute_command(&XSEL, content),
      Self::Win32Yank => execute_command(&WIN32, content),
      Self::Tmux => execute_command(&TMUX, content),
      Self::Termux => execute_command(&TERMUX, content),
      #[cfg(windows)]
      Self::Windows => {
        clipboard_win::set_clipboard(clipboard_win::formats::Unicode, content)
          .map_err(|err| ClipboardError::Platform(err.to_string()))
      },
      Self::Custom(command) => execute_command(command, content),
      Self::None => Err(ClipboardError::Unavailable),
    }
  }
}

macro_rules! copy_command {
  ($name:ident => $cmd:literal $( , $arg:literal )* ) => {
    const $name: Command = Command {
      command: Cow::Borrowed($cmd),
      args:    Cow::Borrowed(&[ $( Cow::Borrowed($arg) ),* ]),
    };
  };
}

copy_command!(TMUX => "tmux", "load-buffer", "-w", "-");
copy_command!(PASTEBOARD => "pbcopy");
copy_command!(WL_COPY => "wl-copy", "--type", "text/plain");
copy_command!(XCLIP => "xclip", "-i", "-selection", "clipboard");
copy_command!(XSEL => "xsel", "-i", "-b");
copy_command!(WIN32 => "win32yank.exe", "-i", "--crlf");
copy_command!(TERMUX => "termux-clipboard-set");

/// Runs `cmd` with `input` on stdin, detached from the terminal session.
fn execute_command(cmd: &Command, input: &str) -> Result<()> {
  use std::{
    io::Write,
    process::{
      Command as ProcessCommand,
      Stdio,
    },
  };

  let mut command = ProcessCommand::new(cmd.command.as_ref());
  let mut command = command
    .args(cmd.args.iter().map(AsRef::as_ref))
    .stdin(Stdio::piped())
    .stdout(Stdio::null())
    .stderr(Stdio::null());

  // Providers like xclip fork a server that must outlive our process group.
  #[cfg(unix)]
  {
    use std::os::unix::process::CommandExt;

    unsafe {
      command = command.pre_exec(|| match libc::setsid() {
        -1 => Err(std::io::Error::last_os_error()),
        _ => Ok(()),
      });
    }
  }

  let mut child = command.spawn()?;

  {
    let mut stdin = child.stdin.take().ok_or(ClipboardError::StdinWriteFailed)?;
    stdin
      .write_all(input.as_bytes())
      .map_err(|_| ClipboardError::StdinWriteFailed)?;
  }

  let status = child.wait()?;
  if !status.success() {
    return Err(ClipboardError::CommandFailed);
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn names_resolve() {
    assert_eq!(OsClipboard::from_name("wl-copy"), Some(OsClipboard::Wayland));
    assert_eq!(OsClipboard::from_name("none"), Some(OsClipboard::None));
    assert_eq!(OsClipboard::from_name("clippy"), None);
    assert_eq!(OsClipboard::XClip.name(), "x-clip (xclip)");
    let custom = OsClipboard::Custom(Command::new("clip.exe", Vec::new()));
    assert_eq!(custom.name(), "custom (clip.exe)");
  }

  #[test]
  fn none_refuses_writes() {
    assert!(matches!(
      OsClipboard::None.set_contents("x"),
      Err(ClipboardError::Unavailable)
    ));
  }

  #[cfg(unix)]
  #[test]
  fn custom_commands_receive_the_text() {
    let ok = OsClipboard::Custom(Command::new("cat", Vec::new()));
    assert!(ok.set_contents("fn main() {}\n").is_ok());

    let failing = OsClipboard::Custom(Command::new("sh", vec![
      "-c".into(),
      "cat >/dev/null; exit 3".into(),
    ]));
    assert!(matches!(
      failing.set_contents("x"),
      Err(ClipboardError::CommandFailed)
    ));

    let missing = OsClipboard::Custom(Command::new("codebank-no-such-binary", Vec::new()));
    assert!(matches!(
      missing.set_contents("x"),
      Err(ClipboardError::Io(_))
    ));
  }
}
