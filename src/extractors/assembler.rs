// src/extractors/assembler.rs

// --- Imports ---
use crate::extractors::category::{locate_categories, Category};
use crate::extractors::disclosure::parse_disclosures;
use crate::extractors::fields::{extract_fields, Discard};
use crate::extractors::issue_block::{bullet_headline, split_issue_blocks, SplitStrategy};
use crate::extractors::line_scan::scan_issues;
use crate::extractors::options::ParseOptions;
use crate::extractors::personnel::parse_personnel;
use crate::extractors::section::{locate_sections, SectionKey};
use crate::extractors::text::{clean_value, normalize, strip_bullet};
use crate::extractors::trace::{CategoryTrace, LineScanTrace, ParseTrace};
use crate::extractors::verification::parse_verifications;
use crate::report::{Issue, StructuredReport};

/// A parsed report together with the trace of how it was parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutcome {
    pub report: StructuredReport,
    pub trace: ParseTrace,
}

// --- Main Parser Structure ---

/// Turns generated report text into a [`StructuredReport`].
///
/// Parsing never fails: unrecognized structure yields defaults or empty sections.
/// The parser holds only its options, so one instance can serve any number of
/// threads.
#[derive(Debug, Clone, Default)]
pub struct ReportParser {
    options: ParseOptions,
}

impl ReportParser {
    pub fn new(options: ParseOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parses one report. Strategy order is fixed: sections, then categories, then
    /// block splitting with field extraction, then the line scan if nothing was found.
    pub fn parse(&self, raw_text: &str) -> ParseOutcome {
        let text = normalize(raw_text);
        let mut trace = ParseTrace::default();

        // 1. Partition into sections
        let sections = locate_sections(&text);
        trace.sections_found = if sections.whole_text_fallback() { Vec::new() } else { sections.keys() };
        trace.whole_text_fallback = sections.whole_text_fallback();

        // 2. Amendments: structured path first, line scan as last resort
        let amendments_text = sections.get(SectionKey::Amendments).unwrap_or("");
        let mut amendments = self.parse_amendments(amendments_text, &mut trace);
        if amendments.is_empty() && !amendments_text.trim().is_empty() {
            tracing::debug!("Structured issue extraction found nothing; running line scan");
            let scan = scan_issues(amendments_text, &self.options);
            trace.line_scan = Some(LineScanTrace {
                candidates: scan.candidates,
                accepted: scan.issues.len(),
                discarded: scan.discarded,
            });
            amendments = scan.issues;
        }

        // 3. The simple sections
        let verifications = sections.get(SectionKey::Verifications).map(parse_verifications).unwrap_or_default();
        let disclosures = sections
            .get(SectionKey::Disclosures)
            .map(|body| parse_disclosures(body, &self.options))
            .unwrap_or_default();
        let personnel = sections.get(SectionKey::Personnel).map(parse_personnel).unwrap_or_default();

        trace.verifications = verifications.len();
        trace.disclosures = disclosures.len();
        trace.personnel = personnel.len();

        tracing::info!(
            "Parsed report: {} amendments, {} verifications, {} disclosures, {} personnel",
            amendments.len(),
            verifications.len(),
            disclosures.len(),
            personnel.len()
        );

        ParseOutcome {
            report: StructuredReport::new(amendments, verifications, disclosures, personnel),
            trace,
        }
    }

    /// Category → issue block → fields, with strategy selection per category.
    fn parse_amendments(&self, text: &str, trace: &mut ParseTrace) -> Vec<Issue> {
        let mut issues = Vec::new();
        // Label of the last heading that grouped issues, used for headings that title one issue.
        let mut group = String::new();

        for category in locate_categories(text) {
            let mut category_trace = CategoryTrace { label: category.label.clone(), ..Default::default() };
            let mut missing_description = 0;

            if let Some((strategy, blocks)) = split_issue_blocks(category.body, category.indent) {
                category_trace.strategy = Some(strategy);
                category_trace.blocks = blocks.len();

                for block in blocks {
                    let mut fields = extract_fields(block);
                    if strategy == SplitStrategy::Bullet && fields.description.is_none() {
                        fields.description = bullet_headline(block);
                    }
                    match fields.into_issue(&category.label, &self.options) {
                        Ok(issue) => {
                            category_trace.accepted += 1;
                            issues.push(issue);
                        }
                        Err(reason) => {
                            tracing::trace!("Discarded issue candidate in '{}': {:?}", category.label, reason);
                            if reason == Discard::MissingDescription {
                                missing_description += 1;
                            }
                            category_trace.discarded += 1;
                        }
                    }
                }
            } else {
                tracing::trace!("No issue blocks found in category '{}'", category.label);
            }

            // `**1. Physical address missing**` over bare field bullets: the heading is the issue.
            let titled = if category_trace.accepted == 0 && missing_description == category_trace.blocks {
                self.titled_issue(&category, &group)
            } else {
                None
            };
            match titled {
                Some(issue) => {
                    category_trace.heading_as_description = true;
                    category_trace.accepted = 1;
                    category_trace.discarded = 0;
                    issues.push(issue);
                }
                None if !category.label.is_empty() => group = category.label.clone(),
                None => {}
            }

            tracing::debug!(
                "Category '{}': strategy {:?}, {} blocks, {} accepted, {} discarded",
                category_trace.label,
                category_trace.strategy,
                category_trace.blocks,
                category_trace.accepted,
                category_trace.discarded
            );
            trace.categories.push(category_trace);
        }

        issues
    }

    /// One issue from a whole category body, described by the category heading.
    /// Needs at least one field besides the description.
    fn titled_issue(&self, category: &Category<'_>, group: &str) -> Option<Issue> {
        if category.label.is_empty() {
            return None;
        }
        let mut fields = extract_fields(category.body);
        if !fields.has_detail() {
            return None;
        }
        if fields.description.is_none() {
            fields.description = Some(clean_value(strip_bullet(&category.label)));
        }
        fields.into_issue(group, &self.options).ok()
    }
}

/// Parses with default options, discarding the trace.
pub fn parse_report(text: &str) -> StructuredReport {
    ReportParser::default().parse(text).report
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{Severity, VerificationStatus};
    use pretty_assertions::assert_eq;

    const CATEGORIZED: &str = "**I. 🛑 Required Issuer Amendments (External Actions)**

**General Issues**

*   **Issue description:** Physical address missing
    *   **Rule citation:** Rule 201(a)
    *   **Severity:** Critical
    *   **Page number:** 3, 12
    *   **Specific explanation:** Only a P.O. box is listed.
*   **Issue description:** Website not listed
    *   **Rule citation:** Rule 201(a)
    *   **Severity:** Medium

**Risk Factor Issues**

*   Risk factors are boilerplate
    *   Severity: High
    *   Page: 8
*   Dilution risk not discussed

**II. ✅ Internal Reviewer Verification (Oversight Tasks)**

1. **Financial Statements (Rule 201(t))**: Verified
";

    #[test]
    fn test_strategy_selected_per_category() {
        let outcome = ReportParser::default().parse(CATEGORIZED);
        let issues = outcome.report.amendments();
        assert_eq!(issues.len(), 4);

        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].page_number, 3);
        assert_eq!(issues[0].page_numbers, vec![3, 12]);
        assert_eq!(issues[0].category, "General Issues");
        assert_eq!(issues[1].severity, Severity::Medium);
        assert_eq!(issues[1].page_number, 1);

        assert_eq!(issues[2].description, "Risk factors are boilerplate");
        assert_eq!(issues[2].severity, Severity::High);
        assert_eq!(issues[2].page_number, 8);
        assert_eq!(issues[3].description, "Dilution risk not discussed");
        assert_eq!(issues[3].category, "Risk Factor Issues");

        let strategies: Vec<Option<SplitStrategy>> = outcome.trace.categories.iter().map(|c| c.strategy).collect();
        assert_eq!(strategies, vec![Some(SplitStrategy::EmphasizedLabel), Some(SplitStrategy::Bullet)]);
        assert!(outcome.trace.line_scan.is_none());
        assert_eq!(outcome.trace.sections_found, vec![SectionKey::Amendments, SectionKey::Verifications]);
        assert_eq!(outcome.report.verifications()[0].status, VerificationStatus::Verified);
    }

    #[test]
    fn test_plain_label_block_skips_line_scan() {
        let text = "Model notes.\nThe first finding.\nIssue description:\n  No escrow agent identified\nSeverity: High\n";
        let outcome = ReportParser::default().parse(text);
        assert!(outcome.trace.whole_text_fallback);
        assert!(outcome.trace.line_scan.is_none());
        assert_eq!(outcome.report.amendments()[0].description, "No escrow agent identified");
    }

    #[test]
    fn test_line_scan_runs_when_no_block_is_found() {
        // A qualified label is not a split point, so only the line scan picks it up.
        let text = "Description of the gap: Escrow agent not named\nSeverity: High\n";
        let outcome = ReportParser::default().parse(text);
        assert_eq!(outcome.trace.categories[0].strategy, None);
        assert_eq!(
            outcome.trace.line_scan,
            Some(LineScanTrace { candidates: 1, accepted: 1, discarded: 0 })
        );
        let issue = &outcome.report.amendments()[0];
        assert_eq!(issue.description, "Escrow agent not named");
        assert_eq!(issue.severity, Severity::High);
    }

    #[test]
    fn test_bold_issue_title_over_field_bullets() {
        let text = "Required Issuer Amendments\n\n\
**General Issues**\n\n\
**1. Physical address missing**\n\
* Severity: Critical\n\
* Page: 3\n\n\
**2. Website not listed**\n\
* Severity: Medium\n";
        let outcome = ReportParser::default().parse(text);
        let issues = outcome.report.amendments();
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].description, "Physical address missing");
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].page_number, 3);
        assert_eq!(issues[0].category, "General Issues");
        assert_eq!(issues[1].description, "Website not listed");
        assert_eq!(issues[1].severity, Severity::Medium);
        assert_eq!(issues[1].category, "General Issues");

        let titled: Vec<bool> = outcome.trace.categories.iter().map(|c| c.heading_as_description).collect();
        assert_eq!(titled, vec![false, true, true]);
        assert!(outcome.trace.line_scan.is_none());
    }

    #[test]
    fn test_discarded_candidates_are_counted() {
        let text = "Required Issuer Amendments\n* Issue description: N/A\n* Issue description: Deadline not specified\n";
        let outcome = ReportParser::default().parse(text);
        assert_eq!(outcome.report.amendments().len(), 1);
        assert_eq!(outcome.trace.discarded_candidates(), 1);
        assert_eq!(outcome.trace.structured_issues(), 1);
    }

    #[test]
    fn test_options_are_applied() {
        let parser = ReportParser::new(ParseOptions {
            min_description_len: 30,
            default_rule_citation: "Reg CF".to_string(),
        });
        let text = "Issue description: Short one\nSeverity: High\nIssue description: A description long enough to pass the bar\n";
        let report = parser.parse(text).report;
        assert_eq!(report.amendments().len(), 1);
        assert_eq!(report.amendments()[0].rule_citation, "Reg CF");
    }

    #[test]
    fn test_crlf_input() {
        let text = "Required Issuer Amendments\r\nIssue description: Bonus share details absent\r\nSeverity: High\r\n";
        let report = parse_report(text);
        assert_eq!(report.amendments()[0].description, "Bonus share details absent");
        assert_eq!(report.amendments()[0].severity, Severity::High);
    }
}
