// src/lib.rs
//! Normalizes generated Form C compliance report text into a [`StructuredReport`].
pub mod extractors;
pub mod report;
pub mod storage;
pub mod utils;

pub use extractors::{parse_report, ParseOptions, ParseOutcome, ReportParser};
pub use report::StructuredReport;
