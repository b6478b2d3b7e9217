// tests/report_scenarios.rs
use formc_extractor::extractors::issue_block::SplitStrategy;
use formc_extractor::extractors::line_scan::scan_issues;
use formc_extractor::extractors::{ParseOptions, ReportParser, SectionKey};
use formc_extractor::report::{DisclosureItem, DisclosureStatus, RoleCategory, Severity, VerificationStatus};
use formc_extractor::parse_report;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

const FULL_REPORT: &str = "Here is the compliance review of the Form C.

**I. 🛑 Required Issuer Amendments (External Actions)**

**General Issues**

*   **Issue description:** Physical address missing
    *   **Rule citation:** Rule 201(a)
    *   **Severity:** Critical
    *   **Page number:** 3, 12
    *   **Specific explanation:** Only a P.O. box is listed on the cover page.
        The issuer must provide a street address.
    *   **AI reasoning:** Cover page and Item 1 were compared.
*   **Issue description:** Website not listed
    *   **Rule citation:** Rule 201(a)
    *   **Severity:** Medium
    *   **Specific explanation:** No issuer website appears in the filing.

**Use of Proceeds Validation**

*   Use of proceeds table does not sum to the target amount
    *   Severity: High
    *   Page: 14
*   Minimum and maximum scenarios not separated

---

**II. ✅ Internal Reviewer Verification (Oversight Tasks)**

1. **Financial Statements (Rule 201(t))**: Verified - reviewed financials attached
2. **Investor Limits**: Confirmed against Rule 100(a)(2)
3. **Intermediary Compensation (Rule 201(l))**: Needs Review - percentage not stated

**III. 👍 Required Disclosures Present and Compliant**

*   Business description (Rule 201(b))
*   **Risk Factors (Rule 201(f)):** Specific to the issuer
*   Ownership and capital structure

**IV. 🧑\u{200D}💼 Key Personnel and Significant Ownership**

*   **Jane Doe** — Chief Executive Officer and Director
*   John Roe - CFO
*   Ann Lee: Head of Product
*   20%+ Owners: None
";

#[test]
fn empty_input_yields_empty_report() {
    for text in ["", "   \n\n\t", "\u{FEFF}"] {
        let report = parse_report(text);
        assert!(report.is_empty());
        assert!(report.amendments().is_empty());
        assert!(report.verifications().is_empty());
        assert!(report.disclosures().is_empty());
        assert!(report.personnel().is_empty());
    }
}

#[test]
fn full_report_is_normalized() {
    let outcome = ReportParser::default().parse(FULL_REPORT);
    let report = &outcome.report;

    assert_eq!(outcome.trace.sections_found, SectionKey::ALL.to_vec());
    assert!(!outcome.trace.whole_text_fallback);

    let issues = report.amendments();
    assert_eq!(issues.len(), 4);

    assert_eq!(issues[0].description, "Physical address missing");
    assert_eq!(issues[0].rule_citation, "Rule 201(a)");
    assert_eq!(issues[0].severity, Severity::Critical);
    assert_eq!(issues[0].page_number, 3);
    assert_eq!(issues[0].page_numbers, vec![3, 12]);
    assert_eq!(
        issues[0].explanation,
        "Only a P.O. box is listed on the cover page. The issuer must provide a street address."
    );
    assert_eq!(issues[0].ai_rationale.as_deref(), Some("Cover page and Item 1 were compared."));

    assert_eq!(issues[1].severity, Severity::Medium);
    assert_eq!(issues[1].page_number, 1);
    assert!(issues[1].page_numbers.is_empty());

    assert_eq!(issues[2].description, "Use of proceeds table does not sum to the target amount");
    assert_eq!(issues[2].severity, Severity::High);
    assert_eq!(issues[2].page_number, 14);
    assert_eq!(issues[2].category, "Use of Proceeds Validation");
    assert_eq!(issues[3].rule_citation, "Rule 201");

    let statuses: Vec<VerificationStatus> = report.verifications().iter().map(|v| v.status).collect();
    assert_eq!(
        statuses,
        vec![VerificationStatus::Verified, VerificationStatus::Verified, VerificationStatus::NeedsReview]
    );

    assert_eq!(report.disclosures().len(), 3);
    assert_eq!(report.disclosures()[1].label, "Risk Factors");
    assert_eq!(report.disclosures()[1].rule_citation, "Rule 201(f)");
    assert_eq!(report.disclosures()[2].rule_citation, "Rule 201");

    let people = report.personnel();
    assert_eq!(people.len(), 3);
    assert_eq!(people[0].name, "Jane Doe");
    assert_eq!(people[0].role_category, RoleCategory::Director);
    assert_eq!(people[1].role_category, RoleCategory::Officer);
    assert_eq!(people[2].role_category, RoleCategory::Other);

    let counts = report.severity_counts();
    assert_eq!((counts.critical, counts.high, counts.medium), (1, 1, 2));
    assert_eq!(report.issues_by_rule("201(a)").len(), 2);
    assert_eq!(report.issues_by_severity(Severity::Critical)[0].description, "Physical address missing");
}

#[test]
fn strategy_priority_is_scoped_per_category() {
    let outcome = ReportParser::default().parse(FULL_REPORT);
    let strategies: Vec<(String, Option<SplitStrategy>)> = outcome
        .trace
        .categories
        .iter()
        .map(|c| (c.label.clone(), c.strategy))
        .collect();
    assert_eq!(
        strategies,
        vec![
            ("General Issues".to_string(), Some(SplitStrategy::EmphasizedLabel)),
            ("Use of Proceeds Validation".to_string(), Some(SplitStrategy::Bullet)),
        ]
    );
}

#[test]
fn verification_only_report() {
    let text = "## Internal Reviewer Verification\n\
1. Escrow arrangement: Verified with the intermediary\n\
2. Financial statements certified: Verified\n\
3. Related party transactions: Needs Review\n";
    let report = parse_report(text);
    assert!(report.amendments().is_empty());
    let statuses: Vec<VerificationStatus> = report.verifications().iter().map(|v| v.status).collect();
    assert_eq!(
        statuses,
        vec![VerificationStatus::Verified, VerificationStatus::Verified, VerificationStatus::NeedsReview]
    );
    assert_eq!(report.verifications()[0].name, "Escrow arrangement");
}

#[test]
fn disclosure_line_with_parenthetical_rule() {
    let report = parse_report("Required Disclosures\nBusiness description (Rule 201(b))\n");
    assert_eq!(
        report.disclosures(),
        &[DisclosureItem {
            label: "Business description".to_string(),
            rule_citation: "Rule 201(b)".to_string(),
            status: DisclosureStatus::Compliant,
        }]
    );
}

#[test]
fn scattered_labels_without_anchors_are_recovered() {
    let text = "The model produced loose notes.\n\
Issue description: Escrow agent not identified\n\
Some commentary in between.\n\
Severity: Critical\n";

    let report = parse_report(text);
    assert_eq!(report.amendments().len(), 1);
    assert_eq!(report.amendments()[0].description, "Escrow agent not identified");
    assert_eq!(report.amendments()[0].severity, Severity::Critical);

    // The line scan alone finds the same issue.
    let scanned = scan_issues(text, &ParseOptions::default());
    assert_eq!(scanned.issues, report.amendments().to_vec());
}

#[test]
fn line_scan_handles_qualified_labels() {
    let text = "Description of the problem: Offering deadline not specified\n\
Severity level (Critical/High/Medium): High\n\
Explanation: The Form C omits the target date.\n";
    let outcome = ReportParser::default().parse(text);
    assert!(outcome.trace.line_scan.is_some());
    let issue = &outcome.report.amendments()[0];
    assert_eq!(issue.description, "Offering deadline not specified");
    assert_eq!(issue.severity, Severity::High);
    assert_eq!(issue.explanation, "The Form C omits the target date.");
}

const NUMBERED_LISTS_REPORT: &str = "**I. Required Issuer Amendments**

**General Issues**

**1. Physical address missing**
*   Severity: Critical
*   Page: 3
*   Explanation: Only a P.O. box is listed.
    Details on the cover page: the street line is blank.

**II. Internal Reviewer Verification**

1. Escrow agreement: unverified
2. Use of proceeds: Needs Review - figures not verified
3. Investor limits: Confirmed

**III. Required Disclosures Present and Compliant**

1. Business description (Rule 201(b))
2. Key Personnel (Rule 201(e))
3. Use of proceeds (Rule 201(i))

**IV. Key Personnel and Significant Ownership**

*   Jane Doe - CEO
";

#[test]
fn numbered_disclosure_repeating_a_section_title_stays_a_disclosure() {
    let outcome = ReportParser::default().parse(NUMBERED_LISTS_REPORT);
    let report = &outcome.report;
    assert_eq!(outcome.trace.sections_found, SectionKey::ALL.to_vec());

    let labels: Vec<&str> = report.disclosures().iter().map(|d| d.label.as_str()).collect();
    assert_eq!(labels, vec!["Business description", "Key Personnel", "Use of proceeds"]);
    assert_eq!(report.disclosures()[1].rule_citation, "Rule 201(e)");

    let people = report.personnel();
    assert_eq!(people.len(), 1);
    assert_eq!(people[0].name, "Jane Doe");
    assert_eq!(people[0].role_category, RoleCategory::Officer);
}

#[test]
fn bold_issue_title_keeps_its_fields() {
    let outcome = ReportParser::default().parse(NUMBERED_LISTS_REPORT);
    let issues = outcome.report.amendments();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].description, "Physical address missing");
    assert_eq!(issues[0].category, "General Issues");
    assert_eq!(issues[0].severity, Severity::Critical);
    assert_eq!(issues[0].page_number, 3);
    assert_eq!(
        issues[0].explanation,
        "Only a P.O. box is listed. Details on the cover page: the street line is blank."
    );
    assert!(outcome.trace.line_scan.is_none());
}

#[test]
fn negated_verification_keywords() {
    let report = parse_report(NUMBERED_LISTS_REPORT);
    let statuses: Vec<VerificationStatus> = report.verifications().iter().map(|v| v.status).collect();
    assert_eq!(
        statuses,
        vec![VerificationStatus::Pending, VerificationStatus::NeedsReview, VerificationStatus::Verified]
    );
}

#[test]
fn label_like_prose_stays_in_the_explanation() {
    // Structured path: bold labels split the block.
    let structured = "Required Issuer Amendments\n\
* **Issue description:** Offering price unclear\n\
    * **Specific explanation:** The terms section is incomplete.\n\
      Issue price per share: is never stated in the offering terms\n\
    * **Severity:** High\n";
    let report = parse_report(structured);
    assert_eq!(report.amendments().len(), 1);
    assert_eq!(
        report.amendments()[0].explanation,
        "The terms section is incomplete. Issue price per share: is never stated in the offering terms"
    );
    assert_eq!(report.amendments()[0].severity, Severity::High);

    // Line scan: only a qualified description label is present.
    let scanned = "Description of the gap: Escrow agent not named\n\
Explanation: The escrow section is blank.\n\
Issue price per share: is never stated in the offering terms\n";
    let outcome = ReportParser::default().parse(scanned);
    assert!(outcome.trace.line_scan.is_some());
    let issues = outcome.report.amendments();
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].description, "Escrow agent not named");
    assert_eq!(
        issues[0].explanation,
        "The escrow section is blank. Issue price per share: is never stated in the offering terms"
    );
}

#[test]
fn report_serializes_in_camel_case() {
    let report = parse_report(FULL_REPORT);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["amendments"][0]["pageNumber"], 3);
    assert_eq!(json["amendments"][0]["ruleCitation"], "Rule 201(a)");
    assert_eq!(json["verifications"][2]["status"], "Needs Review");
    assert_eq!(json["personnel"][0]["roleCategory"], "Director");
}

#[test]
fn parser_is_shareable_across_threads() {
    let parser = std::sync::Arc::new(ReportParser::default());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let parser = std::sync::Arc::clone(&parser);
            std::thread::spawn(move || parser.parse(FULL_REPORT).report)
        })
        .collect();
    let expected = parse_report(FULL_REPORT);
    for handle in handles {
        assert_eq!(handle.join().unwrap(), expected);
    }
}

// --- Properties ---

fn report_line() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("**Required Issuer Amendments**".to_string()),
        Just("## Internal Reviewer Verification".to_string()),
        Just("Required Disclosures".to_string()),
        Just("Key Personnel".to_string()),
        Just("**General Issues**".to_string()),
        Just("---".to_string()),
        Just(String::new()),
        "[a-zA-Z ]{0,40}".prop_map(|s| format!("* **Issue description:** {}", s)),
        "[a-zA-Z ]{0,40}".prop_map(|s| format!("Issue description: {}", s)),
        "(Critical|High|Medium|Low)?".prop_map(|s| format!("    * Severity: {}", s)),
        "[0-9, ]{0,12}".prop_map(|s| format!("    * **Page number:** {}", s)),
        "[a-zA-Z ().0-9]{0,40}".prop_map(|s| format!("- {}", s)),
        "[a-zA-Z ]{0,20}".prop_map(|s| format!("1. {}: Verified", s)),
        Just("2. Key Personnel (Rule 201(e))".to_string()),
        Just("Issue price per share: is never stated".to_string()),
        Just("    Details on the cover page: only a P.O. box".to_string()),
        Just("**1. Physical address missing**".to_string()),
        Just("Escrow agreement: unverified".to_string()),
        ".{0,60}",
    ]
}

proptest! {
    #[test]
    fn never_panics_on_arbitrary_text(text in "\\PC{0,400}") {
        let _ = parse_report(&text);
    }

    #[test]
    fn issues_always_satisfy_invariants(lines in prop::collection::vec(report_line(), 0..40)) {
        let text = lines.join("\n");
        let report = parse_report(&text);
        for issue in report.amendments() {
            prop_assert!(!issue.description.trim().is_empty());
            prop_assert!(issue.page_number >= 1);
            prop_assert!(matches!(issue.severity, Severity::Critical | Severity::High | Severity::Medium));
            if let Some(first) = issue.page_numbers.first() {
                prop_assert_eq!(*first, issue.page_number);
            }
        }
    }

    #[test]
    fn parsing_is_deterministic(lines in prop::collection::vec(report_line(), 0..40)) {
        let text = lines.join("\n");
        let parser = ReportParser::default();
        prop_assert_eq!(parser.parse(&text), parser.parse(&text));
    }
}
