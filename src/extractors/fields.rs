// src/extractors/fields.rs
// Label-driven field extraction for a single issue block.

use crate::extractors::options::ParseOptions;
use crate::extractors::text::{clean_value, is_horizontal_rule, strip_bullet};
use crate::report::{Issue, Severity};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

// --- Pattern building blocks ---
const LINE_PREFIX: &str = r"^[ \t]*(?:(?:[-*+•]|\d{1,3}[.)])[ \t]+)?";
const EMPH_OPEN: &str = r"(?:\*{1,2}|__)";
// The colon may sit inside (`**Severity:**`) or outside (`**Severity**:`) the emphasis.
const EMPH_CLOSE: &str = r"[ \t]*(?::[ \t]*(?:\*{1,2}|__)|(?:\*{1,2}|__)[ \t]*:)";
// Trailing phrases the prompt template tends to echo: "Page number where found",
// "Specific explanation with details from the document", "Rule citation (e.g., Rule 201(f))".
// Only these shapes qualify a label; free text before a colon is prose.
const QUALIFIER: &str = concat!(
    r"(?:[ \t]+(?:where[ \t]+(?:found|located|it[ \t]+appears)",
    r"|with[ \t]+details\b[a-z0-9 ,'/.-]{0,50}?",
    r"|(?:explaining|describing|detailing|showing)\b[a-z0-9 ,'/.-]{0,60}?",
    r"|of[ \t]+the[ \t]+(?:problem|issue|gap|finding|deficiency)))?",
    r"(?:[ \t]*\([^\n:]{0,40}?\))?",
);

/// The fields an issue block can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum IssueField {
    Description,
    RuleCitation,
    Severity,
    PageNumber,
    Explanation,
    Rationale,
}

impl IssueField {
    pub const ALL: [IssueField; 6] = [
        IssueField::Description,
        IssueField::RuleCitation,
        IssueField::Severity,
        IssueField::PageNumber,
        IssueField::Explanation,
        IssueField::Rationale,
    ];

    fn label_names(self) -> &'static [&'static str] {
        match self {
            IssueField::Description => &["Issue description", "Issue summary", "Description", "Finding", "Issue"],
            IssueField::RuleCitation => &["Rule citation", "Rule reference", "Regulation", "Citation", "Rule"],
            IssueField::Severity => &["Severity level", "Risk level", "Severity", "Priority"],
            IssueField::PageNumber => &["Page references", "Page reference", "Page numbers", "Page number", "Pages", "Page"],
            IssueField::Explanation => &["Specific explanation", "Detailed explanation", "Explanation", "Details"],
            IssueField::Rationale => &["AI reasoning", "AI rationale", "AI analysis", "Reasoning", "Rationale"],
        }
    }

    /// Multi-line fields keep collecting lines until the next label. A description is
    /// one line; prose after it is not part of the finding.
    pub fn is_multiline(self) -> bool {
        matches!(self, IssueField::Explanation | IssueField::Rationale)
    }
}

/// Label variants, most specific first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LabelTier {
    Emphasized,
    Plain,
    EmphasizedQualified,
    PlainQualified,
    EmphasizedInline,
}

impl LabelTier {
    const ORDER: [LabelTier; 5] = [
        LabelTier::Emphasized,
        LabelTier::Plain,
        LabelTier::EmphasizedQualified,
        LabelTier::PlainQualified,
        LabelTier::EmphasizedInline,
    ];

    fn is_line_anchored(self) -> bool {
        !matches!(self, LabelTier::EmphasizedInline)
    }

    fn pattern(self, names: &str) -> String {
        match self {
            LabelTier::Emphasized => format!(r"(?im){LINE_PREFIX}{EMPH_OPEN}[ \t]*(?:{names}){EMPH_CLOSE}[ \t]*"),
            LabelTier::Plain => format!(r"(?im){LINE_PREFIX}(?:{names})[ \t]*:[ \t]*"),
            LabelTier::EmphasizedQualified => {
                format!(r"(?im){LINE_PREFIX}{EMPH_OPEN}[ \t]*(?:{names}){QUALIFIER}{EMPH_CLOSE}[ \t]*")
            }
            LabelTier::PlainQualified => format!(r"(?im){LINE_PREFIX}(?:{names}){QUALIFIER}[ \t]*:[ \t]*"),
            LabelTier::EmphasizedInline => format!(r"(?i){EMPH_OPEN}[ \t]*(?:{names}){EMPH_CLOSE}[ \t]*"),
        }
    }
}

struct LabelVariant {
    field: IssueField,
    tier: LabelTier,
    re: Regex,
}

fn names_alternation(names: &[&str]) -> String {
    names
        .iter()
        .map(|name| name.split_whitespace().map(regex::escape).collect::<Vec<_>>().join(r"[ \t]+"))
        .collect::<Vec<_>>()
        .join("|")
}

// --- Regex Patterns (Lazy Static) ---
// Ordered by tier, then by field, so scans that stop at the first hit prefer exact labels.
static LABEL_VARIANTS: Lazy<Vec<LabelVariant>> = Lazy::new(|| {
    LabelTier::ORDER
        .iter()
        .flat_map(|tier| {
            IssueField::ALL.iter().map(move |field| {
                let pattern = tier.pattern(&names_alternation(field.label_names()));
                let re = Regex::new(&pattern).expect("Failed to compile issue field label pattern");
                LabelVariant { field: *field, tier: *tier, re }
            })
        })
        .collect()
});

// Any emphasized label of any field, used to cut same-line values short.
static ANY_INLINE_LABEL_RE: Lazy<Regex> = Lazy::new(|| {
    let all: Vec<&str> = IssueField::ALL.iter().flat_map(|f| f.label_names().iter().copied()).collect();
    Regex::new(&LabelTier::EmphasizedInline.pattern(&names_alternation(&all)))
        .expect("Failed to compile ANY_INLINE_LABEL_RE")
});

static RULE_TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bRule\s+\d{1,4}(?:\.\d+)?(?:\([a-z0-9]{1,4}\))*").expect("Failed to compile RULE_TOKEN_RE")
});

static PAGE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("Failed to compile PAGE_NUMBER_RE"));

static WORD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[A-Za-z]+").expect("Failed to compile WORD_RE"));

// --- Label lookups ---

fn variant(field: IssueField, tier: LabelTier) -> &'static Regex {
    &LABEL_VARIANTS
        .iter()
        .find(|v| v.field == field && v.tier == tier)
        .expect("every field has every tier")
        .re
}

/// Line-anchored description label regex, with or without emphasis.
/// These are the split points for issue blocks.
pub(crate) fn description_anchor(emphasized: bool) -> &'static Regex {
    let tier = if emphasized { LabelTier::Emphasized } else { LabelTier::Plain };
    variant(IssueField::Description, tier)
}

/// Matches a label at the start of a line. Returns the field and the byte offset where
/// its value begins.
pub fn match_label_line(line: &str) -> Option<(IssueField, usize)> {
    LABEL_VARIANTS
        .iter()
        .filter(|v| v.tier.is_line_anchored())
        .find_map(|v| v.re.find(line).map(|m| (v.field, m.end())))
}

pub fn is_label_line(line: &str) -> bool {
    match_label_line(line).is_some()
}

/// First match for `field` in the block across all tiers; returns the value offset.
fn find_field(block: &str, field: IssueField) -> Option<usize> {
    LabelTier::ORDER.iter().find_map(|tier| {
        let end = variant(field, *tier).find(block)?.end();
        tracing::trace!("Field {:?} matched via {:?}", field, tier);
        Some(end)
    })
}

/// Value text following a label: the rest of the label line, then (for multi-line
/// fields) every following line up to the next label, rule, or end of block.
fn capture_value(block: &str, value_start: usize, multiline: bool) -> String {
    let rest = &block[value_start..];
    let mut lines = rest.split('\n');
    let mut first = lines.next().unwrap_or("");
    if let Some(next_label) = ANY_INLINE_LABEL_RE.find(first) {
        first = &first[..next_label.start()];
    }

    let mut parts: Vec<String> = Vec::new();
    let first_clean = clean_value(first);
    if !first_clean.is_empty() {
        parts.push(first_clean);
        if !multiline {
            return parts.join(" ");
        }
    }

    for line in lines {
        if is_label_line(line) || is_horizontal_rule(line) {
            break;
        }
        let cleaned = clean_value(strip_bullet(line));
        if cleaned.is_empty() {
            continue;
        }
        parts.push(cleaned);
        if !multiline {
            break;
        }
    }
    parts.join(" ")
}

// --- Partial issue ---

/// Why a candidate issue was not accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Discard {
    MissingDescription,
    DescriptionTooShort { len: usize },
}

/// Raw field values of one issue candidate, before defaults are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IssueFields {
    pub description: Option<String>,
    pub rule_citation: Option<String>,
    pub severity: Option<String>,
    pub page: Option<String>,
    pub explanation: Option<String>,
    pub rationale: Option<String>,
}

impl IssueFields {
    fn slot(&mut self, field: IssueField) -> &mut Option<String> {
        match field {
            IssueField::Description => &mut self.description,
            IssueField::RuleCitation => &mut self.rule_citation,
            IssueField::Severity => &mut self.severity,
            IssueField::PageNumber => &mut self.page,
            IssueField::Explanation => &mut self.explanation,
            IssueField::Rationale => &mut self.rationale,
        }
    }

    pub fn get(&self, field: IssueField) -> Option<&str> {
        let value = match field {
            IssueField::Description => &self.description,
            IssueField::RuleCitation => &self.rule_citation,
            IssueField::Severity => &self.severity,
            IssueField::PageNumber => &self.page,
            IssueField::Explanation => &self.explanation,
            IssueField::Rationale => &self.rationale,
        };
        value.as_deref()
    }

    /// Stores a cleaned value; blank values leave the field empty.
    pub fn set(&mut self, field: IssueField, raw: &str) {
        let value = clean_value(raw);
        *self.slot(field) = if value.is_empty() { None } else { Some(value) };
    }

    /// Adds a continuation line to a field.
    pub fn append(&mut self, field: IssueField, raw: &str) {
        let value = clean_value(raw);
        if value.is_empty() {
            return;
        }
        let slot = self.slot(field);
        match slot {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(&value);
            }
            None => *slot = Some(value),
        }
    }

    pub fn is_empty(&self) -> bool {
        IssueField::ALL.iter().all(|f| self.get(*f).is_none())
    }

    /// Anything beyond the description itself.
    pub fn has_detail(&self) -> bool {
        self.explanation.is_some() || self.severity.is_some() || self.rule_citation.is_some() || self.page.is_some()
    }

    /// Applies defaults and validation. Candidates without a usable description are
    /// discarded; nothing else can reject a candidate.
    pub fn into_issue(self, category: &str, options: &ParseOptions) -> Result<Issue, Discard> {
        let description = self.description.ok_or(Discard::MissingDescription)?;
        let len = description.chars().count();
        if len < options.min_description_len {
            return Err(Discard::DescriptionTooShort { len });
        }

        let severity = self
            .severity
            .as_deref()
            .and_then(|v| WORD_RE.find(v))
            .map(|m| Severity::from_token(m.as_str()))
            .unwrap_or_default();

        let page_numbers = self.page.as_deref().map(parse_pages).unwrap_or_default();
        let page_number = page_numbers.first().copied().unwrap_or(1);

        let rule_citation = self
            .rule_citation
            .or_else(|| {
                [self.explanation.as_deref(), Some(description.as_str()), self.rationale.as_deref()]
                    .into_iter()
                    .flatten()
                    .find_map(|text| RULE_TOKEN_RE.find(text).map(|m| m.as_str().to_string()))
            })
            .unwrap_or_else(|| options.default_rule_citation.clone());

        let explanation = self.explanation.unwrap_or_else(|| description.clone());

        Ok(Issue {
            description,
            rule_citation,
            severity,
            page_number,
            page_numbers,
            explanation,
            ai_rationale: self.rationale,
            category: category.to_string(),
        })
    }
}

/// Every positive integer in a page value, in order, without repeats.
pub fn parse_pages(value: &str) -> Vec<u32> {
    let mut pages: Vec<u32> = Vec::new();
    for token in PAGE_NUMBER_RE.find_iter(value) {
        if let Ok(page) = token.as_str().parse::<u32>() {
            if page > 0 && !pages.contains(&page) {
                pages.push(page);
            }
        }
    }
    pages
}

/// Extracts every recognized field from one issue block. Fields are searched
/// independently, so each may be found through a different label variant.
pub fn extract_fields(block: &str) -> IssueFields {
    let mut fields = IssueFields::default();
    for field in IssueField::ALL {
        if let Some(value_start) = find_field(block, field) {
            let value = capture_value(block, value_start, field.is_multiline());
            fields.set(field, &value);
        }
    }
    fields
}
