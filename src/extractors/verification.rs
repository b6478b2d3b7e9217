// src/extractors/verification.rs

use crate::extractors::text::{list_item, split_outside_parens};
use crate::report::{VerificationItem, VerificationStatus};
use once_cell::sync::Lazy;
use regex::Regex;

const LABEL_SEPARATORS: &[&str] = &[":", " - ", " – ", " — "];

// `Status: Needs Review` style sub-fields that belong to the item above them.
static SUBFIELD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(status|notes?|details|comments?)\s*:\s*(.*)$").expect("Failed to compile SUBFIELD_RE")
});

static EXPLICIT_STATUS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bstatus\s*:\s*([a-z][a-z ]{0,30})").expect("Failed to compile EXPLICIT_STATUS_RE")
});

/// Status from an explicit `Status:` value; keyword inference still applies to the value.
fn explicit_status(value: &str) -> VerificationStatus {
    let lower = value.to_lowercase();
    if lower.starts_with("pending") || lower.starts_with("incomplete") || lower.starts_with("open") {
        VerificationStatus::Pending
    } else if lower.contains("review") {
        VerificationStatus::NeedsReview
    } else {
        VerificationStatus::infer(value)
    }
}

fn status_for_line(content: &str) -> VerificationStatus {
    match EXPLICIT_STATUS_RE.captures(content).and_then(|c| c.get(1)) {
        Some(value) => explicit_status(value.as_str()),
        None => VerificationStatus::infer(content),
    }
}

/// Parses the internal reviewer verification section.
///
/// Every numbered or bulleted line is an item. `Status:`/`Note:` sub-bullets refine
/// the item before them instead of opening a new one.
pub fn parse_verifications(text: &str) -> Vec<VerificationItem> {
    let mut items: Vec<VerificationItem> = Vec::new();

    for line in text.lines() {
        let Some(content) = list_item(line) else { continue };
        if content.is_empty() {
            continue;
        }

        if let Some(caps) = SUBFIELD_RE.captures(&content) {
            if let Some(item) = items.last_mut() {
                let key = caps.get(1).map(|m| m.as_str().to_lowercase()).unwrap_or_default();
                let value = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
                if key == "status" {
                    item.status = explicit_status(value);
                } else if !value.is_empty() {
                    if item.note == item.name {
                        item.note = value.to_string();
                    } else {
                        item.note = format!("{} {}", item.note, value);
                    }
                }
                continue;
            }
        }

        let status = status_for_line(&content);
        let item = match split_outside_parens(&content, LABEL_SEPARATORS) {
            Some((name, note)) if !name.is_empty() => VerificationItem {
                name: name.to_string(),
                status,
                note: if note.is_empty() { name.to_string() } else { note.to_string() },
            },
            _ => VerificationItem { name: content.clone(), status, note: content.clone() },
        };
        items.push(item);
    }

    tracing::debug!("Parsed {} verification items", items.len());
    items
}
