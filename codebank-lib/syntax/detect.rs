//! Marker-based language guessing.
//!
//! Each known language lists substrings that are characteristic of it, with a
//! weight. A text scores the sum of the weights of the markers it contains
//! (each marker counts once). The best score wins if it clears
//! [`MIN_SCORE`] and is not tied; anything else is inconclusive.

/// Lowest score accepted as a detection.
pub const MIN_SCORE: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageSpec {
  /// Stable identifier reported to the UI (`rust`, `python`, ...).
  pub id:          &'static str,
  /// Grammar name in the bundled syntax set.
  pub syntax_name: &'static str,
  markers:         &'static [(&'static str, u32)],
}

impl LanguageSpec {
  pub fn score(&self, text: &str) -> u32 {
    self
      .markers
      .iter()
      .filter(|(marker, _)| text.contains(marker))
      .map(|(_, weight)| weight)
      .sum()
  }
}

macro_rules! language {
  ($id:literal, $syntax:literal, [$( $marker:literal => $weight:literal ),* $(,)?]) => {
    LanguageSpec {
      id:          $id,
      syntax_name: $syntax,
      markers:     &[$( ($marker, $weight) ),*],
    }
  };
}

pub const LANGUAGES: &[LanguageSpec] = &[
  language!("rust", "Rust", [
    "fn " => 2, "let mut " => 3, "impl " => 2, "pub fn " => 3, "use std::" => 3,
    "println!" => 3, "&str" => 2, "#[derive" => 3, "Vec<" => 2, "-> " => 1,
  ]),
  language!("python", "Python", [
    "def " => 2, "elif " => 3, "print(" => 2, "__init__" => 3, "self." => 1,
    "import " => 1, "lambda " => 2, "None" => 1, "True" => 1,
  ]),
  language!("javascript", "JavaScript", [
    "function " => 2, "const " => 2, "=> " => 2, "console.log" => 3, "require(" => 3,
    "document." => 3, "===" => 3, "undefined" => 2, "export " => 1, "let " => 1,
  ]),
  language!("java", "Java", [
    "public class " => 3, "public static void main" => 4, "System.out.println" => 4,
    "import java." => 4, "@Override" => 3, "String[]" => 2, "private " => 1,
  ]),
  language!("c", "C", [
    "#include <stdio.h>" => 4, "#include <stdlib.h>" => 4, "printf(" => 2,
    "int main(" => 2, "malloc(" => 2, "#include" => 1, "sizeof(" => 1,
  ]),
  language!("cpp", "C++", [
    "#include <iostream>" => 4, "std::" => 3, "cout <<" => 3, "template<" => 3,
    "template <" => 3, "nullptr" => 3, "namespace " => 1, "#include" => 1,
  ]),
  language!("csharp", "C#", [
    "using System" => 4, "Console.WriteLine" => 4, "{ get; set; }" => 4,
    "namespace " => 2, "public class " => 1,
  ]),
  language!("go", "Go", [
    "package main" => 4, "func " => 2, "fmt." => 3, ":= " => 2, "import (" => 3,
    "go func" => 3, "chan " => 2,
  ]),
  language!("ruby", "Ruby", [
    "puts " => 3, "attr_accessor" => 4, ".each do" => 4, "elsif " => 3, "do |" => 3,
    "require '" => 2, "end\n" => 1,
  ]),
  language!("php", "PHP", [
    "<?php" => 6, "$this->" => 4, "echo " => 1, "function " => 1,
  ]),
  language!("html", "HTML", [
    "<!DOCTYPE html" => 6, "<html" => 4, "<div" => 3, "</div>" => 3, "<body" => 3,
    "<head" => 3, "<p>" => 2, "class=\"" => 1,
  ]),
  language!("css", "CSS", [
    "color:" => 3, "margin:" => 3, "padding:" => 3, "display:" => 3,
    "font-size:" => 3, "@media" => 4, "px;" => 2,
  ]),
  language!("sql", "SQL", [
    "SELECT " => 3, "select " => 2, " FROM " => 3, " from " => 1, "WHERE " => 2,
    "INSERT INTO" => 4, "CREATE TABLE" => 4, "GROUP BY" => 3, "JOIN " => 2,
  ]),
  language!("bash", "Bourne Again Shell (bash)", [
    "#!/bin/bash" => 6, "#!/bin/sh" => 6, "esac" => 4, "fi\n" => 3, "$1" => 2,
    "sudo " => 3, "apt-get " => 3, "[ -" => 3, "echo " => 1, "done" => 1,
  ]),
  language!("yaml", "YAML", [
    "apiVersion:" => 4, "- name:" => 3, "---\n" => 2, "version:" => 1,
  ]),
  language!("markdown", "Markdown", [
    "```" => 3, "## " => 2, "](http" => 3, "# " => 1, "**" => 1,
  ]),
  language!("xml", "XML", [
    "<?xml" => 6, "xmlns" => 3, "</" => 1,
  ]),
  language!("json", "JSON", []),
];

pub fn language(id: &str) -> Option<&'static LanguageSpec> {
  LANGUAGES
    .iter()
    .find(|lang| lang.id.eq_ignore_ascii_case(id))
}

pub fn language_for_syntax(syntax_name: &str) -> Option<&'static LanguageSpec> {
  LANGUAGES
    .iter()
    .find(|lang| lang.syntax_name == syntax_name)
}

/// Guesses from the first line alone (shebangs and document preambles).
pub fn from_first_line(text: &str) -> Option<&'static LanguageSpec> {
  let first = text.lines().next()?.trim();
  let id = if let Some(shebang) = first.strip_prefix("#!") {
    let interpreter = shebang.rsplit(['/', ' ']).next()?;
    match interpreter {
      "bash" | "sh" | "zsh" => "bash",
      "python" | "python3" => "python",
      "node" => "javascript",
      "ruby" => "ruby",
      "php" => "php",
      _ => return None,
    }
  } else if first.starts_with("<?php") {
    "php"
  } else if first.starts_with("<?xml") {
    "xml"
  } else if first.to_ascii_lowercase().starts_with("<!doctype html") {
    "html"
  } else {
    return None;
  };
  language(id)
}

fn looks_like_json(text: &str) -> bool {
  let trimmed = text.trim();
  let object = trimmed.starts_with('{') && trimmed.ends_with('}');
  let array = trimmed.starts_with('[') && trimmed.ends_with(']');
  (object || array) && trimmed.contains("\":")
}

/// Best guess for `text`, or `None` when inconclusive.
pub fn detect_language(text: &str) -> Option<&'static LanguageSpec> {
  if text.trim().is_empty() {
    return None;
  }
  if let Some(lang) = from_first_line(text) {
    return Some(lang);
  }
  if looks_like_json(text) {
    return language("json");
  }

  let mut best: Option<(&'static LanguageSpec, u32)> = None;
  let mut tied = false;
  for lang in LANGUAGES {
    let score = lang.score(text);
    match best {
      Some((_, top)) if score == top => tied = true,
      Some((_, top)) if score < top => {},
      _ => {
        best = Some((lang, score));
        tied = false;
      },
    }
  }

  match best {
    Some((lang, score)) if score >= MIN_SCORE && !tied => Some(lang),
    _ => None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detected(text: &str) -> Option<&'static str> {
    detect_language(text).map(|lang| lang.id)
  }

  #[test]
  fn detects_common_languages() {
    assert_eq!(
      detected("fn main() {\n    let mut x = 1;\n    println!(\"{x}\");\n}"),
      Some("rust")
    );
    assert_eq!(
      detected("def greet(name):\n    print(f\"hi {name}\")\n"),
      Some("python")
    );
    assert_eq!(
      detected("const add = (a, b) => a + b;\nconsole.log(add(1, 2));"),
      Some("javascript")
    );
    assert_eq!(
      detected("package main\n\nimport \"fmt\"\n\nfunc main() { fmt.Println(1) }"),
      Some("go")
    );
    assert_eq!(
      detected("SELECT id, name FROM users WHERE id = 1;"),
      Some("sql")
    );
  }

  #[test]
  fn first_line_wins() {
    assert_eq!(detected("#!/usr/bin/env python3\nx = 1"), Some("python"));
    assert_eq!(detected("#!/bin/bash\necho hi"), Some("bash"));
    assert_eq!(detected("<?php echo 'hi';"), Some("php"));
    assert_eq!(detected("<!DOCTYPE html>\n<p>x</p>"), Some("html"));
    assert_eq!(detected("<?xml version=\"1.0\"?>\n<a/>"), Some("xml"));
  }

  #[test]
  fn json_documents() {
    assert_eq!(detected("{\n  \"name\": \"codebank\"\n}"), Some("json"));
    assert_eq!(detected("[{\"a\": 1}]"), Some("json"));
  }

  #[test]
  fn prose_is_inconclusive() {
    assert_eq!(detected("just some words here"), None);
    assert_eq!(detected(""), None);
    assert_eq!(detected("   \n  "), None);
  }

  #[test]
  fn lookups() {
    assert_eq!(language("Rust").map(|lang| lang.syntax_name), Some("Rust"));
    assert_eq!(language("cobol"), None);
    assert_eq!(language_for_syntax("C++").map(|lang| lang.id), Some("cpp"));
  }

  #[test]
  fn detection_is_deterministic() {
    let text = "fn main() { println!(\"x\"); }";
    assert_eq!(detect_language(text), detect_language(text));
  }
}
