// src/report/mod.rs
pub mod models;

pub use models::{
    DisclosureItem,
    DisclosureStatus,
    Issue,
    PersonnelEntry,
    RoleCategory,
    Severity,
    SeverityCounts,
    StructuredReport,
    VerificationItem,
    VerificationStatus,
    DEFAULT_RULE_CITATION,
};
