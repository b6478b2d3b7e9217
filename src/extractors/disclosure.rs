// src/extractors/disclosure.rs

use crate::extractors::options::ParseOptions;
use crate::extractors::text::{clean_value, list_item, split_outside_parens};
use crate::report::{DisclosureItem, DisclosureStatus};
use once_cell::sync::Lazy;
use regex::Regex;

// Lines longer than this without a list marker are prose, even if they cite a rule.
const MAX_UNLISTED_LINE_LEN: usize = 120;

const LABEL_SEPARATORS: &[&str] = &[":", " - ", " – ", " — "];

// `(Rule 201(b))`, `(Rule 201(a), (b))`, `(§ 227.201(t))`
static CITATION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\(\s*((?:Rule|§)\s*\d{1,4}(?:\.\d+)?(?:\([a-z0-9]{1,4}\))*(?:\s*(?:,|and|&)\s*\([a-z0-9]{1,4}\))*)\s*\)",
    )
    .expect("Failed to compile CITATION_RE")
});

fn trim_separators(s: &str) -> &str {
    s.trim_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '–' | '—' | ',' | '.'))
}

/// Label part of a disclosure line: text up to the first label/value separator.
fn label_of(text: &str) -> String {
    let head = match split_outside_parens(text, LABEL_SEPARATORS) {
        Some((left, _)) if !left.is_empty() => left,
        _ => text,
    };
    clean_value(trim_separators(head))
}

fn parse_line(content: &str, options: &ParseOptions) -> Option<DisclosureItem> {
    let status = if content.to_lowercase().contains("needs review") {
        DisclosureStatus::NeedsReview
    } else {
        DisclosureStatus::Compliant
    };

    let (label, rule_citation) = match CITATION_RE.captures(content) {
        Some(caps) => {
            let whole = caps.get(0)?;
            let citation = clean_value(caps.get(1)?.as_str());
            let before = trim_separators(&content[..whole.start()]);
            let after = trim_separators(&content[whole.end()..]);
            let source = if before.is_empty() { after } else { before };
            (label_of(source), citation)
        }
        None => (label_of(content), options.default_rule_citation.clone()),
    };

    if label.is_empty() {
        return None;
    }
    Some(DisclosureItem { label, rule_citation, status })
}

/// Parses the compliant-disclosures section. Presence in the section counts as
/// compliance unless the line says it needs review.
pub fn parse_disclosures(text: &str, options: &ParseOptions) -> Vec<DisclosureItem> {
    let items: Vec<DisclosureItem> = text
        .lines()
        .filter_map(|line| {
            let content = match list_item(line) {
                Some(content) => content,
                None => {
                    let content = clean_value(line);
                    let cites_rule = CITATION_RE.is_match(&content);
                    if !cites_rule || content.len() > MAX_UNLISTED_LINE_LEN || content.ends_with(':') {
                        return None;
                    }
                    content
                }
            };
            parse_line(&content, options)
        })
        .collect();

    tracing::debug!("Parsed {} disclosure items", items.len());
    items
}
