// src/report/models.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Citation used whenever a record carries no recognizable rule reference.
pub const DEFAULT_RULE_CITATION: &str = "Rule 201";

// --- Enumerations ---

/// Issue severity as reported by the upstream generator.
/// Anything outside the three known levels collapses to `Medium`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Severity {
    Critical,
    High,
    Medium,
}

impl Severity {
    /// Maps a free-form token ("CRITICAL", "high", "Low", ...) onto a severity.
    pub fn from_token(token: &str) -> Self {
        match token.trim().to_ascii_lowercase().as_str() {
            "critical" => Severity::Critical,
            "high" => Severity::High,
            _ => Severity::Medium,
        }
    }
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "Critical",
            Severity::High => "High",
            Severity::Medium => "Medium",
        };
        f.write_str(s)
    }
}

static NEEDS_REVIEW_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\bneeds?[ \t]+(?:further[ \t]+)?review\b").expect("Failed to compile NEEDS_REVIEW_RE")
});

static AFFIRMED_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)(?P<neg>\b(?:not|never|cannot|can't|un-)[ \t]*(?:(?:yet|been|be|fully)[ \t]+)*)?\b(?:verified|confirmed)\b",
    )
    .expect("Failed to compile AFFIRMED_RE")
});

static NEEDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(?:needs?|requires?|required)\b").expect("Failed to compile NEEDS_RE"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    Pending,
    #[serde(rename = "Needs Review")]
    NeedsReview,
}

impl VerificationStatus {
    /// Keyword inference over a line of text.
    ///
    /// "needs review" decides first. Otherwise a whole-word `verified`/`confirmed` that is not
    /// negated ("not verified", "un-verified") wins over `needs`/`require`. Everything else
    /// is still pending.
    pub fn infer(text: &str) -> Self {
        if NEEDS_REVIEW_RE.is_match(text) {
            return VerificationStatus::NeedsReview;
        }
        let affirmed = AFFIRMED_RE.captures_iter(text).any(|caps| caps.name("neg").is_none());
        if affirmed {
            VerificationStatus::Verified
        } else if NEEDS_RE.is_match(text) {
            VerificationStatus::NeedsReview
        } else {
            VerificationStatus::Pending
        }
    }
}

impl Default for VerificationStatus {
    fn default() -> Self {
        VerificationStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DisclosureStatus {
    Compliant,
    #[serde(rename = "Needs Review")]
    NeedsReview,
}

impl Default for DisclosureStatus {
    fn default() -> Self {
        DisclosureStatus::Compliant
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RoleCategory {
    Officer,
    Director,
    Other,
}

// --- Records ---

/// One required amendment found in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub description: String,
    pub rule_citation: String,
    pub severity: Severity,
    pub page_number: u32,
    /// Every page listed for the issue, in source order. Empty when no page was given.
    pub page_numbers: Vec<u32>,
    pub explanation: String,
    pub ai_rationale: Option<String>,
    /// Category heading the issue was listed under, empty when ungrouped.
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationItem {
    pub name: String,
    pub status: VerificationStatus,
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureItem {
    pub label: String,
    pub rule_citation: String,
    pub status: DisclosureStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonnelEntry {
    pub name: String,
    pub role_category: RoleCategory,
    pub title: Option<String>,
}

/// Issue totals per severity level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
}

// --- Top-level output ---

/// Structured form of one generated compliance report.
///
/// Built once by the assembler; the sequences keep source order and are only
/// reachable through read-only accessors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredReport {
    amendments: Vec<Issue>,
    verifications: Vec<VerificationItem>,
    disclosures: Vec<DisclosureItem>,
    personnel: Vec<PersonnelEntry>,
}

impl StructuredReport {
    pub(crate) fn new(
        amendments: Vec<Issue>,
        verifications: Vec<VerificationItem>,
        disclosures: Vec<DisclosureItem>,
        personnel: Vec<PersonnelEntry>,
    ) -> Self {
        Self { amendments, verifications, disclosures, personnel }
    }

    pub fn amendments(&self) -> &[Issue] {
        &self.amendments
    }

    pub fn verifications(&self) -> &[VerificationItem] {
        &self.verifications
    }

    pub fn disclosures(&self) -> &[DisclosureItem] {
        &self.disclosures
    }

    pub fn personnel(&self) -> &[PersonnelEntry] {
        &self.personnel
    }

    /// True when none of the four sections produced a record.
    pub fn is_empty(&self) -> bool {
        self.amendments.is_empty()
            && self.verifications.is_empty()
            && self.disclosures.is_empty()
            && self.personnel.is_empty()
    }

    pub fn issues_by_severity(&self, severity: Severity) -> Vec<&Issue> {
        self.amendments.iter().filter(|i| i.severity == severity).collect()
    }

    /// Issues whose citation contains `rule`, e.g. `"201(t)"` or `"Rule 303"`.
    pub fn issues_by_rule(&self, rule: &str) -> Vec<&Issue> {
        let needle = rule.to_lowercase();
        self.amendments
            .iter()
            .filter(|i| i.rule_citation.to_lowercase().contains(&needle))
            .collect()
    }

    pub fn severity_counts(&self) -> SeverityCounts {
        self.amendments.iter().fold(SeverityCounts::default(), |mut acc, issue| {
            match issue.severity {
                Severity::Critical => acc.critical += 1,
                Severity::High => acc.high += 1,
                Severity::Medium => acc.medium += 1,
            }
            acc
        })
    }
}
