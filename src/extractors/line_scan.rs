// src/extractors/line_scan.rs
// Last-resort issue parser: one pass over lines, keyed on field labels only.

use crate::extractors::category::is_heading_line;
use crate::extractors::fields::{match_label_line, IssueField, IssueFields};
use crate::extractors::options::ParseOptions;
use crate::extractors::text::{is_horizontal_rule, strip_bullet};
use crate::report::Issue;

/// Issues recovered by the line scan plus candidate bookkeeping for the trace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineScanResult {
    pub issues: Vec<Issue>,
    pub candidates: usize,
    pub discarded: usize,
}

struct Scanner<'o> {
    options: &'o ParseOptions,
    current: IssueFields,
    /// Field that continuation lines are appended to.
    open: Option<IssueField>,
    result: LineScanResult,
}

impl<'o> Scanner<'o> {
    fn new(options: &'o ParseOptions) -> Self {
        Self { options, current: IssueFields::default(), open: None, result: LineScanResult::default() }
    }

    fn close(&mut self, at_end: bool) {
        let candidate = std::mem::take(&mut self.current);
        self.open = None;
        if candidate.is_empty() {
            return;
        }
        self.result.candidates += 1;

        // Mid-stream, a bare description followed by another description is noise.
        if !at_end && !candidate.has_detail() {
            tracing::trace!("Line scan dropped candidate without detail: {:?}", candidate.description);
            self.result.discarded += 1;
            return;
        }

        match candidate.into_issue("", self.options) {
            Ok(issue) => self.result.issues.push(issue),
            Err(reason) => {
                tracing::trace!("Line scan discarded candidate: {:?}", reason);
                self.result.discarded += 1;
            }
        }
    }

    fn label(&mut self, field: IssueField, value: &str) {
        if field == IssueField::Description && self.current.description.is_some() {
            self.close(false);
        }
        // First value wins, as in block extraction.
        if self.current.get(field).is_none() {
            self.current.set(field, value);
        }
        let blank = value.trim().is_empty();
        self.open = if field.is_multiline() || blank { Some(field) } else { None };
    }

    fn continuation(&mut self, line: &str) {
        let Some(field) = self.open else { return };
        if line.trim().is_empty() {
            return;
        }
        self.current.append(field, strip_bullet(line));
        if !field.is_multiline() {
            self.open = None;
        }
    }

    fn feed(&mut self, line: &str) {
        if is_horizontal_rule(line) || is_heading_line(line) {
            self.open = None;
            return;
        }
        match match_label_line(line) {
            Some((field, offset)) => self.label(field, &line[offset..]),
            None => self.continuation(line),
        }
    }

    fn finish(mut self) -> LineScanResult {
        self.close(true);
        self.result
    }
}

/// Walks `text` line by line, collecting issues from whatever labels it finds.
pub fn scan_issues(text: &str, options: &ParseOptions) -> LineScanResult {
    let mut scanner = Scanner::new(options);
    for line in text.lines() {
        scanner.feed(line);
    }
    let result = scanner.finish();
    tracing::debug!(
        "Line scan recovered {} issues ({} candidates, {} discarded)",
        result.issues.len(),
        result.candidates,
        result.discarded
    );
    result
}
