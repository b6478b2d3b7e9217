// src/utils/annotate.rs
use crate::extractors::section::anchor_matches;
use crate::utils::error::AppError;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Wraps each highlighted span of `text` in `[[>>kind@start-end]]` / `[[<<kind]]` markers.
/// Spans overlapping an earlier one, or not on char boundaries, are left unmarked.
pub fn annotate(text: &str, highlights: &[(usize, usize, &str)]) -> String {
    let mut sorted = highlights.to_vec();
    sorted.sort_by_key(|h| h.0); // Sort by position

    let mut out = String::with_capacity(text.len() + sorted.len() * 32);
    let mut last_pos = 0;

    for (start, end, kind) in sorted {
        if start < last_pos || end < start {
            tracing::trace!("Skipping overlapping highlight {}-{} ({})", start, end, kind);
            continue;
        }
        let (Some(before), Some(span)) = (text.get(last_pos..start), text.get(start..end)) else {
            continue;
        };
        out.push_str(before);
        out.push_str(&format!("[[>>{}@{}-{}]]", kind, start, end));
        out.push_str(span);
        out.push_str(&format!("[[<<{}]]", kind));
        last_pos = end;
    }

    out.push_str(&text[last_pos..]);
    out
}

/// Marks every section heading match in the report text.
pub fn annotate_sections(text: &str) -> String {
    let matches = anchor_matches(text);
    let highlights: Vec<(usize, usize, &str)> =
        matches.iter().map(|m| (m.start, m.end, m.key.as_str())).collect();
    annotate(text, &highlights)
}

/// Writes the section-annotated copy of `text` to `path`.
pub fn save_annotated_text(text: &str, path: &Path) -> Result<(), AppError> {
    let mut file = File::create(path)?;
    file.write_all(annotate_sections(text).as_bytes())?;
    tracing::info!("Saved annotated report text to {}", path.display());
    Ok(())
}
