// src/extractors/mod.rs
pub mod assembler;
pub mod category;
pub mod disclosure;
pub mod fields;
pub mod issue_block;
pub mod line_scan;
pub mod options;
pub mod personnel;
pub mod section;
pub mod text;
pub mod trace;
pub mod verification;

// Re-export the parser surface for convenience
pub use assembler::{parse_report, ParseOutcome, ReportParser};
pub use options::ParseOptions;
pub use section::{anchor_matches, locate_sections, AnchorMatch, LocatedSections, SectionKey};
pub use trace::{CategoryTrace, LineScanTrace, ParseTrace};
