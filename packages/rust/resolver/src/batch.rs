//! Batch application of the resolver over milestone documents.
//!
//! A document is rewritten only when at least one milestone gained a
//! `min_plugin_version`, which makes repeated runs idempotent: populated
//! fields are never recomputed or overwritten.

use std::path::Path;

use tracing::{debug, info, instrument};

use relchron_shared::{CatalogEntry, MilestoneDoc, RelchronError, Result};

use crate::resolve;

/// Counts from one resolution pass over a document.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    /// Milestones that gained a `min_plugin_version` this pass.
    pub resolved: usize,
    /// Milestones skipped because the field was already populated.
    pub already_set: usize,
    /// Milestones with no qualifying release (or an unparsable date);
    /// left untouched, eligible again next run.
    pub unmatched: usize,
}

impl BatchSummary {
    /// Whether the pass changed the document.
    pub fn dirty(&self) -> bool {
        self.resolved > 0
    }
}

/// Resolve every unpopulated milestone under surfaces named `surface`.
///
/// Pure in-memory mutation; file I/O lives in [`resolve_document_file`].
pub fn apply_to_document(
    doc: &mut MilestoneDoc,
    versions: &[CatalogEntry],
    surface: &str,
) -> BatchSummary {
    let mut summary = BatchSummary::default();

    for entry in doc.surfaces.iter_mut().filter(|s| s.name == surface) {
        for milestone in &mut entry.milestones {
            if milestone.min_plugin_version.is_some() {
                summary.already_set += 1;
                continue;
            }
            match resolve(versions, &milestone.start_date) {
                Some(version) => {
                    debug!(start_date = %milestone.start_date, version, "milestone resolved");
                    milestone.min_plugin_version = Some(version.to_string());
                    summary.resolved += 1;
                }
                None => {
                    debug!(start_date = %milestone.start_date, "no release within window");
                    summary.unmatched += 1;
                }
            }
        }
    }

    summary
}

/// Run one resolution pass over the milestone document at `path`.
///
/// The file is rewritten wholesale only if the pass changed anything.
/// Returns `true` when it was rewritten.
#[instrument(skip(versions), fields(path = %path.display()))]
pub fn resolve_document_file(
    path: &Path,
    versions: &[CatalogEntry],
    surface: &str,
) -> Result<bool> {
    let content = std::fs::read_to_string(path).map_err(|e| RelchronError::io(path, e))?;
    let mut doc: MilestoneDoc = serde_json::from_str(&content).map_err(|e| {
        RelchronError::validation(format!("failed to parse {}: {e}", path.display()))
    })?;

    let summary = apply_to_document(&mut doc, versions, surface);

    info!(
        resolved = summary.resolved,
        already_set = summary.already_set,
        unmatched = summary.unmatched,
        "resolution pass complete"
    );

    if !summary.dirty() {
        return Ok(false);
    }

    let mut json = serde_json::to_string_pretty(&doc)
        .map_err(|e| RelchronError::validation(format!("failed to serialize document: {e}")))?;
    json.push('\n');
    std::fs::write(path, json).map_err(|e| RelchronError::io(path, e))?;

    Ok(true)
}
