// src/extractors/text.rs
// Small text helpers shared by every parser in the pipeline.

use once_cell::sync::Lazy;
use regex::Regex;

/// Bullet or list-number prefix at the start of a line: `*`, `-`, `+`, `•`, `1.`, `2)`.
pub(crate) static BULLET_PREFIX_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:[-*+•]|\d{1,3}[.)])[ \t]+").expect("Failed to compile BULLET_PREFIX_RE")
});

static WHITESPACE_RUN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("Failed to compile WHITESPACE_RUN_RE"));

/// Unifies line endings and drops a leading byte-order mark.
pub fn normalize(text: &str) -> String {
    text.trim_start_matches('\u{feff}')
        .replace("\r\n", "\n")
        .replace('\r', "\n")
}

/// Leading indentation in columns; a tab counts as four.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|c| *c == ' ' || *c == '\t')
        .map(|c| if c == '\t' { 4 } else { 1 })
        .sum()
}

pub fn is_bullet(line: &str) -> bool {
    BULLET_PREFIX_RE.is_match(line)
}

/// The line without its bullet/number prefix (or the trimmed line if it has none).
pub fn strip_bullet(line: &str) -> &str {
    match BULLET_PREFIX_RE.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Removes markdown-style emphasis (`**`, `__`, stray edge `*`/`_`).
pub fn strip_emphasis(s: &str) -> String {
    let without = s.replace("**", "").replace("__", "");
    without
        .trim_matches(|c: char| c == '*' || c == '_' || c.is_whitespace())
        .to_string()
}

/// Emphasis stripped and inner whitespace collapsed to single spaces.
pub fn clean_value(s: &str) -> String {
    let stripped = strip_emphasis(s);
    WHITESPACE_RUN_RE.replace_all(&stripped, " ").trim().to_string()
}

/// `---`, `***`, `___`, `===` and spaced variants.
pub fn is_horizontal_rule(line: &str) -> bool {
    let compact: String = line.chars().filter(|c| !c.is_whitespace()).collect();
    compact.len() >= 3 && compact.chars().all(|c| matches!(c, '-' | '*' | '_' | '='))
}

/// Iterates lines together with the byte offset each one starts at.
pub fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut offset = 0;
    text.split('\n').map(move |line| {
        let start = offset;
        offset += line.len() + 1;
        (start, line)
    })
}

/// Byte offset of the start of the line containing `pos`.
pub fn line_start(text: &str, pos: usize) -> usize {
    text[..pos].rfind('\n').map(|i| i + 1).unwrap_or(0)
}

/// Content of a bulleted or numbered line, emphasis removed. Also accepts a list
/// marker hidden inside emphasis (`**1. Financial Statements**`).
pub fn list_item(line: &str) -> Option<String> {
    if is_bullet(line) {
        return Some(clean_value(strip_bullet(line)));
    }
    let unwrapped = line.replace("**", "").replace("__", "");
    if is_bullet(&unwrapped) {
        return Some(clean_value(strip_bullet(&unwrapped)));
    }
    None
}

/// Splits at the earliest separator that sits outside parentheses or brackets.
/// A separator without trailing whitespace (`":"`) only counts when followed by
/// whitespace or the end of the text.
pub fn split_outside_parens<'s>(s: &'s str, separators: &[&str]) -> Option<(&'s str, &'s str)> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            _ => {}
        }
        if depth > 0 {
            continue;
        }
        for sep in separators {
            if !s[i..].starts_with(sep) {
                continue;
            }
            let rest = &s[i + sep.len()..];
            let needs_gap = !sep.ends_with(char::is_whitespace);
            if needs_gap && !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
                continue;
            }
            return Some((s[..i].trim(), rest.trim()));
        }
    }
    None
}
