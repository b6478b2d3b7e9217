// src/extractors/section.rs

// --- Imports ---
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Anchor building blocks ---
// A section heading may be wrapped as `## **II. ✅ Internal Reviewer Verification (Oversight Tasks)**`.
// Every piece before the title is optional. The emphasis opener must touch what follows it,
// otherwise a plain `* Key Personnel ...` bullet would read as a heading.
const HEADING_HASHES: &str = r"(?P<hash>#{1,6}[ \t]*)?";
const EMPHASIS_OPEN: &str = r"(?P<emph>\*{1,2}|__)?";
const ORDINAL: &str = r"(?:[IVXLC]{1,6}|\d{1,2})[.):][ \t]*";
// Symbols and emoji, including ZWJ sequences and the emoji variation selector.
// Bullet characters are excluded for the same reason as above.
const MARKER: &str = r"(?P<marker>(?:[^\w\s*+\-#•]|[\x{200D}\x{FE0F}])+[ \t]*)?";

// What may follow the title on a heading line: a parenthetical, closing emphasis, a colon.
static HEADING_TAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:\([^\n]*\))?[ \t]*[*_]*[ \t]*:?[ \t]*[*_]*[ \t]*$")
        .expect("Failed to compile HEADING_TAIL_RE")
});

static NUMBERED_ITEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[ \t]*(?:\*{1,2}|__)?\d{1,3}[.)][ \t]").expect("Failed to compile NUMBERED_ITEM_RE")
});

// --- Data Structures ---

/// The four top-level groupings of a generated report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionKey {
    Amendments,
    Verifications,
    Disclosures,
    Personnel,
}

impl SectionKey {
    pub const ALL: [SectionKey; 4] = [
        SectionKey::Amendments,
        SectionKey::Verifications,
        SectionKey::Disclosures,
        SectionKey::Personnel,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SectionKey::Amendments => "amendments",
            SectionKey::Verifications => "verifications",
            SectionKey::Disclosures => "disclosures",
            SectionKey::Personnel => "personnel",
        }
    }

    /// Canonical headings in title case, most specific first.
    fn headings(self) -> &'static [&'static str] {
        match self {
            SectionKey::Amendments => &["Required Issuer Amendments", "Required Amendments"],
            SectionKey::Verifications => &["Internal Reviewer Verification", "Reviewer Verification"],
            SectionKey::Disclosures => &["Required Disclosures Present and Compliant", "Required Disclosures"],
            SectionKey::Personnel => &["Key Personnel and Significant Ownership", "Key Personnel"],
        }
    }
}

/// How strongly a matched line looks like a section heading, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum HeadingShape {
    /// `3. Key Personnel`: a numbered line that does not continue a numbered list.
    Numbered,
    /// The bare title on its own line.
    Plain,
    /// Carries `#`, emphasis, a roman ordinal or an emoji marker.
    Marked,
}

/// One heading match, in byte offsets of the searched text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorMatch {
    pub key: SectionKey,
    pub start: usize,
    pub end: usize,
    pub shape: HeadingShape,
}

/// Result of partitioning a report into its sections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedSections<'a> {
    sections: Vec<(SectionKey, &'a str)>,
    whole_text_fallback: bool,
}

impl<'a> LocatedSections<'a> {
    pub fn get(&self, key: SectionKey) -> Option<&'a str> {
        self.sections.iter().find(|(k, _)| *k == key).map(|(_, body)| *body)
    }

    /// Keys that were found, in document order.
    pub fn keys(&self) -> Vec<SectionKey> {
        self.sections.iter().map(|(k, _)| *k).collect()
    }

    /// True when no heading matched and the whole text was handed to amendments.
    pub fn whole_text_fallback(&self) -> bool {
        self.whole_text_fallback
    }
}

// --- Regex Patterns (Lazy Static) ---
static SECTION_ANCHOR_RE: Lazy<Vec<(SectionKey, Regex)>> = Lazy::new(|| {
    SectionKey::ALL
        .iter()
        .map(|key| {
            let re = build_anchor_regex(key.headings());
            (*key, re)
        })
        .collect()
});

fn title_pattern(title: &str) -> String {
    title
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"[ \t]+")
}

fn build_anchor_regex(headings: &[&str]) -> Regex {
    // Only the two spellings the generator actually produces: Title Case and UPPER CASE.
    let titles = headings
        .iter()
        .flat_map(|h| [title_pattern(h), title_pattern(&h.to_uppercase())])
        .collect::<Vec<_>>()
        .join("|");
    let pattern = format!(
        r"(?m)^[ \t]*{HEADING_HASHES}{EMPHASIS_OPEN}(?P<ord>{ORDINAL})?{MARKER}(?P<ord2>{ORDINAL})?(?:{titles})(?P<tail>[^\n]*)"
    );
    Regex::new(&pattern).expect("Failed to compile section anchor pattern")
}

/// Last non-blank line before byte offset `start`.
fn previous_line(text: &str, start: usize) -> Option<&str> {
    text[..start].lines().rev().find(|line| !line.trim().is_empty())
}

/// Heading shape of one anchor match, or `None` when the line is prose or a list entry.
fn classify(text: &str, caps: &regex::Captures<'_>) -> Option<HeadingShape> {
    let whole = caps.get(0)?;
    let ordinal = caps.name("ord").or_else(|| caps.name("ord2")).map(|m| m.as_str());
    let roman = ordinal.map_or(false, |o| o.starts_with(|c: char| c.is_ascii_alphabetic()));
    let emoji = caps.name("marker").map_or(false, |m| !m.as_str().trim().is_ascii());

    if caps.name("hash").is_some() || caps.name("emph").is_some() || roman || emoji {
        return Some(HeadingShape::Marked);
    }
    let tail = caps.name("tail").map_or("", |m| m.as_str());
    if !HEADING_TAIL_RE.is_match(tail) {
        return None;
    }
    if ordinal.is_none() {
        return Some(HeadingShape::Plain);
    }
    // `2. Key Personnel (Rule 201(e))` inside a numbered disclosure list is an entry, not a heading.
    match previous_line(text, whole.start()) {
        Some(prev) if NUMBERED_ITEM_RE.is_match(prev) => None,
        _ => Some(HeadingShape::Numbered),
    }
}

fn candidates<'t>(key: SectionKey, re: &'t Regex, text: &'t str) -> impl Iterator<Item = AnchorMatch> + 't {
    re.captures_iter(text).filter_map(move |caps| {
        let whole = caps.get(0)?;
        let shape = classify(text, &caps)?;
        Some(AnchorMatch { key, start: whole.start(), end: whole.end(), shape })
    })
}

// --- Locator ---

/// Every heading-shaped match for every key, sorted by position. Used for debug annotation.
pub fn anchor_matches(text: &str) -> Vec<AnchorMatch> {
    let mut matches: Vec<AnchorMatch> = SECTION_ANCHOR_RE
        .iter()
        .flat_map(|(key, re)| candidates(*key, re, text))
        .collect();
    matches.sort_by_key(|m| (m.start, m.key));
    matches
}

/// Splits the report into its sections.
///
/// Per key, the most heading-like match wins, the earliest among equals. A body runs from
/// the end of its heading line to the next later heading of any key, or to the end of the
/// text. When no heading matches at all, the whole text becomes the amendments section so
/// nothing is dropped.
pub fn locate_sections(text: &str) -> LocatedSections<'_> {
    let mut anchors: Vec<AnchorMatch> = SECTION_ANCHOR_RE
        .iter()
        .filter_map(|(key, re)| {
            candidates(*key, re, text).fold(None, |best: Option<AnchorMatch>, candidate| match best {
                Some(b) if b.shape >= candidate.shape => Some(b),
                _ => Some(candidate),
            })
        })
        .collect();
    anchors.sort_by_key(|a| a.start);

    // A later key can only match a line already claimed if headings are fused on one line.
    let mut kept: Vec<AnchorMatch> = Vec::with_capacity(anchors.len());
    for anchor in anchors {
        match kept.last() {
            Some(prev) if anchor.start < prev.end => {
                tracing::trace!("Dropping overlapping {:?} anchor at {}", anchor.key, anchor.start);
            }
            _ => kept.push(anchor),
        }
    }

    if kept.is_empty() {
        tracing::debug!("No section anchors found; treating entire text as amendments");
        return LocatedSections {
            sections: vec![(SectionKey::Amendments, text)],
            whole_text_fallback: true,
        };
    }

    let sections = kept
        .iter()
        .enumerate()
        .map(|(idx, anchor)| {
            let end = kept.get(idx + 1).map(|next| next.start).unwrap_or(text.len());
            tracing::debug!("Located {:?} section: bytes {}..{}", anchor.key, anchor.end, end);
            (anchor.key, &text[anchor.end..end])
        })
        .collect();

    LocatedSections { sections, whole_text_fallback: false }
}
