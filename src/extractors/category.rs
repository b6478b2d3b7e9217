// src/extractors/category.rs

use crate::extractors::fields::is_label_line;
use crate::extractors::text::{clean_value, indent_width};
use once_cell::sync::Lazy;
use regex::Regex;

// --- Regex Patterns (Lazy Static) ---
// Standalone emphasized line: `**General Issues**`, `**Risk Factor Issues:**`, `__Capital Structure__:`.
static EMPHASIZED_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)(?:#{1,6}[ \t]*)?(?:\*\*|__)[ \t]*([^*_\n]{2,80}?)[ \t]*:?[ \t]*(?:\*\*|__)[ \t]*:?[ \t]*$")
        .expect("Failed to compile EMPHASIZED_HEADING_RE")
});

// Markdown heading without emphasis: `### Use of Proceeds Validation`.
static MARKDOWN_HEADING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^([ \t]*)#{1,6}[ \t]+([^*_#\n]{2,80}?)[ \t]*:?[ \t]*$")
        .expect("Failed to compile MARKDOWN_HEADING_RE")
});

/// A grouping of issues within the amendments section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category<'a> {
    /// Heading text, empty for the ungrouped bucket.
    pub label: String,
    pub body: &'a str,
    /// Indentation of the heading line; issue blocks sit at or below it.
    pub indent: usize,
}

struct CategoryAnchor {
    start: usize,
    end: usize,
    label: String,
    indent: usize,
}

fn collect_anchors(text: &str) -> Vec<CategoryAnchor> {
    let mut anchors: Vec<CategoryAnchor> = [&*EMPHASIZED_HEADING_RE, &*MARKDOWN_HEADING_RE]
        .iter()
        .flat_map(|re| re.captures_iter(text))
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let label = clean_value(caps.get(2)?.as_str());
            if !label.chars().any(char::is_alphabetic) {
                return None;
            }
            // A standalone `**Issue description:**` is a field label waiting for its value.
            if is_label_line(whole.as_str()) {
                return None;
            }
            let indent = caps.get(1).map(|m| indent_width(m.as_str())).unwrap_or(0);
            Some(CategoryAnchor { start: whole.start(), end: whole.end(), label, indent })
        })
        .collect();

    anchors.sort_by_key(|a| a.start);
    anchors.dedup_by_key(|a| a.start);
    anchors
}

/// True for a standalone heading line that could open a category.
pub(crate) fn is_heading_line(line: &str) -> bool {
    (EMPHASIZED_HEADING_RE.is_match(line) || MARKDOWN_HEADING_RE.is_match(line)) && !is_label_line(line)
}

/// Splits the amendments text into its categories, in document order.
///
/// Text before the first heading becomes an unlabeled category when it holds anything.
/// Without headings the whole text is one unlabeled category; blank text has none.
pub fn locate_categories(text: &str) -> Vec<Category<'_>> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let anchors = collect_anchors(text);
    if anchors.is_empty() {
        return vec![Category { label: String::new(), body: text, indent: 0 }];
    }

    let mut categories = Vec::with_capacity(anchors.len() + 1);
    let preamble = &text[..anchors[0].start];
    if !preamble.trim().is_empty() {
        categories.push(Category { label: String::new(), body: preamble, indent: 0 });
    }

    for (idx, anchor) in anchors.iter().enumerate() {
        let end = anchors.get(idx + 1).map(|next| next.start).unwrap_or(text.len());
        tracing::trace!("Category '{}' spans {}..{}", anchor.label, anchor.end, end);
        categories.push(Category {
            label: anchor.label.clone(),
            body: &text[anchor.end..end],
            indent: anchor.indent,
        });
    }

    categories
}
