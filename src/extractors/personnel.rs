// src/extractors/personnel.rs

use crate::extractors::text::{clean_value, list_item, split_outside_parens};
use crate::report::{PersonnelEntry, RoleCategory};
use once_cell::sync::Lazy;
use regex::Regex;

const NAME_TITLE_SEPARATORS: &[&str] = &[" — ", " – ", " - ", ":", ", "];
const MAX_NAME_LEN: usize = 80;
const NULL_MARKERS: &[&str] = &["none", "n/a", "na", "none identified", "none disclosed", "none listed", "not disclosed", "not applicable"];

static OFFICER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:officer|chief|ceo|cfo|coo|cto|cmo|president|vice[ -]president|vp|secretary|treasurer|co-founder|founder|managing member|general partner)\b",
    )
    .expect("Failed to compile OFFICER_RE")
});

// Group labels such as "Officers", "20%+ Owners", "Control Persons" introduce entries.
static GROUP_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:officers|directors|owners|holders|control persons|personnel|management)\b")
        .expect("Failed to compile GROUP_LABEL_RE")
});

static PAREN_TITLE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([^()]+?)\s*\(([^()]+)\)$").expect("Failed to compile PAREN_TITLE_RE")
});

/// Director wins over officer keywords ("CEO and Director" is a Director).
pub fn infer_role(title: &str) -> RoleCategory {
    if title.to_lowercase().contains("director") {
        RoleCategory::Director
    } else if OFFICER_RE.is_match(title) {
        RoleCategory::Officer
    } else {
        RoleCategory::Other
    }
}

fn is_null_marker(value: &str) -> bool {
    let lower = value.trim().trim_end_matches('.').to_lowercase();
    NULL_MARKERS.contains(&lower.as_str())
}

fn plausible_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LEN && name.chars().any(char::is_alphabetic)
}

fn entry(name: &str, title: Option<&str>) -> Option<PersonnelEntry> {
    let name = clean_value(name);
    if !plausible_name(&name) {
        return None;
    }
    let title = title.map(clean_value).filter(|t| !t.is_empty());
    let role_category = title.as_deref().map(infer_role).unwrap_or(RoleCategory::Other);
    Some(PersonnelEntry { name, role_category, title })
}

/// One `name <sep> title` line. `listed` lines may stand alone as a bare name.
fn parse_entry(content: &str, listed: bool, allow_group: bool) -> Option<PersonnelEntry> {
    match split_outside_parens(content, NAME_TITLE_SEPARATORS) {
        Some((left, right)) => {
            if right.is_empty() || is_null_marker(right) {
                return None;
            }
            if allow_group && GROUP_LABEL_RE.is_match(left) {
                return parse_entry(right, true, false);
            }
            entry(left, Some(right))
        }
        None if listed => match PAREN_TITLE_RE.captures(content) {
            Some(caps) => entry(caps.get(1)?.as_str(), caps.get(2).map(|m| m.as_str())),
            None => entry(content, None),
        },
        None => None,
    }
}

/// Parses the key personnel section, one entry per bulleted or colon-delimited line.
pub fn parse_personnel(text: &str) -> Vec<PersonnelEntry> {
    let entries: Vec<PersonnelEntry> = text
        .lines()
        .filter_map(|line| match list_item(line) {
            Some(content) => parse_entry(&content, true, true),
            None => {
                let content = clean_value(line);
                if content.contains(':') {
                    parse_entry(&content, false, true)
                } else {
                    None
                }
            }
        })
        .collect();

    tracing::debug!("Parsed {} personnel entries", entries.len());
    entries
}
