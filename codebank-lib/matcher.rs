//! Case-insensitive substring matching with highlight spans.
//!
//! Spans are half-open byte ranges into the *original* text, so they can be
//! used to slice the field for rendering. Lowercasing can change the byte
//! length of a character, which is why matching runs on a lowered copy that
//! remembers where each of its bytes came from.

use std::ops::Range;

/// Case folding used on both sides of a match.
///
/// Lowers one char at a time, so context rules of `str::to_lowercase` (the
/// final sigma) never apply, and maps `ς` to `σ` so a needle folded elsewhere
/// still lines up.
fn fold_char(ch: char) -> impl Iterator<Item = char> {
  ch.to_lowercase()
    .map(|lower| if lower == 'ς' { 'σ' } else { lower })
}

/// Folds `text` the way matching does.
pub fn fold_case(text: &str) -> String {
  text.chars().flat_map(fold_char).collect()
}

/// All non-overlapping, left-to-right occurrences of `needle` in `haystack`.
///
/// `needle` should already be normalized (see [`fold_case`]). An empty needle
/// yields no spans.
pub fn match_spans(haystack: &str, needle: &str) -> Vec<Range<usize>> {
  if needle.is_empty() || haystack.is_empty() {
    return Vec::new();
  }

  let needle = fold_case(needle);
  let (lowered, origin) = lowercase_with_origin(haystack);
  let mut spans: Vec<Range<usize>> = Vec::new();
  for (at, matched) in lowered.match_indices(needle.as_str()) {
    let start = origin[at];
    let last = origin[at + matched.len() - 1];
    let end = last + haystack[last..].chars().next().map_or(0, char::len_utf8);
    // a multi-char lowercase expansion can make two matches share a source char
    if spans.last().is_some_and(|prev| start < prev.end) {
      continue;
    }
    spans.push(start..end);
  }
  spans
}

/// Whether `haystack` contains the normalized `needle`, ignoring case.
pub fn contains(haystack: &str, needle: &str) -> bool {
  if needle.is_empty() {
    return true;
  }
  let (lowered, _) = lowercase_with_origin(haystack);
  lowered.contains(fold_case(needle).as_str())
}

fn lowercase_with_origin(text: &str) -> (String, Vec<usize>) {
  let mut lowered = String::with_capacity(text.len());
  let mut origin = Vec::with_capacity(text.len());
  for (start, ch) in text.char_indices() {
    for lower in fold_char(ch) {
      lowered.push(lower);
      origin.extend(std::iter::repeat_n(start, lower.len_utf8()));
    }
  }
  (lowered, origin)
}

/// A piece of a field, either inside a match span or between spans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
  pub text:        &'a str,
  pub highlighted: bool,
}

/// Splits `text` into alternating plain and highlighted segments.
///
/// Spans must be sorted and non-overlapping, as produced by [`match_spans`].
/// Empty segments are skipped.
pub fn segments<'a>(text: &'a str, spans: &[Range<usize>]) -> Vec<Segment<'a>> {
  let mut out = Vec::with_capacity(spans.len() * 2 + 1);
  let mut cursor = 0;
  for span in spans {
    let start = span.start.min(text.len());
    let end = span.end.min(text.len());
    if start > cursor {
      out.push(Segment {
        text:        &text[cursor..start],
        highlighted: false,
      });
    }
    if end > start {
      out.push(Segment {
        text:        &text[start..end],
        highlighted: true,
      });
    }
    cursor = cursor.max(end);
  }
  if cursor < text.len() {
    out.push(Segment {
      text:        &text[cursor..],
      highlighted: false,
    });
  }
  out
}
