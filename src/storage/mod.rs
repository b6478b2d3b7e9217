// src/storage/mod.rs
use crate::extractors::trace::ParseTrace;
use crate::report::StructuredReport;
use crate::utils::error::StorageError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Folder and file prefix used when no issuer name is known.
const FALLBACK_SLUG: &str = "report";

/// Persisted shape of one parsed report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportDocument {
    pub issuer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub raw_analysis: Option<String>,
    pub structured_analysis: StructuredReport,
    /// RFC 3339 timestamp of the parse.
    pub parsed_at: String,
}

impl ReportDocument {
    pub fn new(issuer_name: Option<String>, raw_analysis: Option<String>, report: StructuredReport) -> Self {
        Self {
            issuer_name,
            raw_analysis,
            structured_analysis: report,
            parsed_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Lowercase ASCII slug for folder and file names: "Acme Widgets, Inc." becomes "acme-widgets-inc".
pub fn issuer_slug(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| part.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        FALLBACK_SLUG.to_string()
    } else {
        slug
    }
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    /// `<base>/<slug>/`, created on demand.
    fn target_dir(&self, slug: &str) -> Result<PathBuf, StorageError> {
        let target_dir = self.base_dir.join(slug);
        if !target_dir.exists() {
            fs::create_dir_all(&target_dir).map_err(StorageError::IoError)?;
        }
        Ok(target_dir)
    }

    fn write_json<T: Serialize>(&self, slug: &str, suffix: &str, value: &T) -> Result<PathBuf, StorageError> {
        let file_path = self.target_dir(slug)?.join(format!("{}_{}.json", slug, suffix));

        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;

        let mut file = fs::File::create(&file_path).map_err(StorageError::IoError)?;
        file.write_all(json.as_bytes()).map_err(StorageError::IoError)?;

        Ok(file_path)
    }

    /// Path where annotated debug text for `slug` belongs.
    pub fn annotated_path(&self, slug: &str) -> Result<PathBuf, StorageError> {
        Ok(self.target_dir(slug)?.join(format!("{}_annotated.txt", slug)))
    }

    /// Saves the report document as `<slug>_report.json`.
    pub fn save_report(&self, slug: &str, document: &ReportDocument) -> Result<PathBuf, StorageError> {
        let path = self.write_json(slug, "report", document)?;
        tracing::info!("Saved report to {}", path.display());
        Ok(path)
    }

    /// Saves summary counts about the report in `<slug>_report_meta.json`.
    pub fn save_report_metadata(
        &self,
        slug: &str,
        document: &ReportDocument,
        source: &str,
    ) -> Result<PathBuf, StorageError> {
        let report = &document.structured_analysis;
        let metadata = serde_json::json!({
            "issuer_name": document.issuer_name,
            "source": source,
            "amendment_count": report.amendments().len(),
            "verification_count": report.verifications().len(),
            "disclosure_count": report.disclosures().len(),
            "personnel_count": report.personnel().len(),
            "severity_counts": report.severity_counts(),
            "parsed_at": document.parsed_at,
            "saved_at": chrono::Utc::now().to_rfc3339(),
        });

        let path = self.write_json(slug, "report_meta", &metadata)?;
        tracing::info!("Saved metadata to {}", path.display());
        Ok(path)
    }

    /// Saves the parse trace as `<slug>_trace.json`.
    pub fn save_trace(&self, slug: &str, trace: &ParseTrace) -> Result<PathBuf, StorageError> {
        let path = self.write_json(slug, "trace", trace)?;
        tracing::info!("Saved parse trace to {}", path.display());
        Ok(path)
    }
}
