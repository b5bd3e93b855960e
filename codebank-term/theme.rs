//! Hardcoded Nord syntax theme.

use codebank_lib::syntax::TokenClass;
use crossterm::style::Color as CrosstermColor;
use ratatui::style::Color;

const fn rgb(hex: u32) -> Color {
  Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

pub const FOREGROUND: Color = rgb(0xd8dee9);
pub const GUTTER: Color = rgb(0x4c566a);
pub const MATCH: Color = rgb(0xebcb8b);
pub const ERROR: Color = rgb(0xbf616a);
pub const SUCCESS: Color = rgb(0xa3be8c);
pub const MUTED: Color = rgb(0x616e88);
pub const SELECTION: Color = rgb(0x3b4252);

pub fn token_color(class: Option<TokenClass>) -> Color {
  let Some(class) = class else {
    return FOREGROUND;
  };

  match class {
    TokenClass::Keyword => rgb(0x81a1c1),
    TokenClass::Operator => rgb(0x81a1c1),
    TokenClass::String => rgb(0xa3be8c),
    TokenClass::Comment => rgb(0x616e88),
    TokenClass::Number | TokenClass::Constant => rgb(0xb48ead),
    TokenClass::Function => rgb(0x88c0d0),
    TokenClass::Type => rgb(0x8fbcbb),
    TokenClass::Variable => FOREGROUND,
    TokenClass::Punctuation => rgb(0xeceff4),
    TokenClass::Tag => rgb(0x81a1c1),
    TokenClass::Attribute => rgb(0x8fbcbb),
  }
}

/// For output written with crossterm commands instead of a ratatui frame.
pub fn to_crossterm(color: Color) -> CrosstermColor {
  match color {
    Color::Rgb(r, g, b) => CrosstermColor::Rgb { r, g, b },
    _ => CrosstermColor::Reset,
  }
}
