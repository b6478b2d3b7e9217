// src/extractors/trace.rs
use crate::extractors::issue_block::SplitStrategy;
use crate::extractors::section::SectionKey;
use serde::Serialize;

/// What the parser did with one amendments category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTrace {
    pub label: String,
    /// `None` when no strategy found any block.
    pub strategy: Option<SplitStrategy>,
    pub blocks: usize,
    pub accepted: usize,
    pub discarded: usize,
    /// The heading itself titled the one issue its body describes.
    pub heading_as_description: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineScanTrace {
    pub candidates: usize,
    pub accepted: usize,
    pub discarded: usize,
}

/// Diagnostic record returned next to every parsed report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseTrace {
    /// Section headings found, in document order.
    pub sections_found: Vec<SectionKey>,
    /// No heading matched; the whole text was parsed as amendments.
    pub whole_text_fallback: bool,
    pub categories: Vec<CategoryTrace>,
    /// Present only when the structured path found no issues and the line scan ran.
    pub line_scan: Option<LineScanTrace>,
    pub verifications: usize,
    pub disclosures: usize,
    pub personnel: usize,
}

impl ParseTrace {
    /// Issues accepted through block splitting, across all categories.
    pub fn structured_issues(&self) -> usize {
        self.categories.iter().map(|c| c.accepted).sum()
    }

    pub fn discarded_candidates(&self) -> usize {
        let structured: usize = self.categories.iter().map(|c| c.discarded).sum();
        structured + self.line_scan.as_ref().map(|l| l.discarded).unwrap_or(0)
    }
}
