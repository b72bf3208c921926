//! Catalog document file I/O.
//!
//! Catalogs are wholly regenerated on each build; the new document replaces
//! the old one, there is no incremental merge.

use std::path::Path;

use tracing::info;

use relchron_shared::{CATALOG_SCHEMA_VERSION, RelchronError, Result, VersionCatalog};

/// Write a catalog document as pretty JSON, creating parent directories.
pub fn write_catalog(path: &Path, catalog: &VersionCatalog) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| RelchronError::io(parent, e))?;
    }

    let mut json = serde_json::to_string_pretty(catalog)
        .map_err(|e| RelchronError::validation(format!("failed to serialize catalog: {e}")))?;
    json.push('\n');

    std::fs::write(path, json).map_err(|e| RelchronError::io(path, e))?;
    info!(path = %path.display(), entries = catalog.versions.len(), "catalog written");

    Ok(())
}

/// Load a catalog document and check its schema marker.
pub fn read_catalog(path: &Path) -> Result<VersionCatalog> {
    let content = std::fs::read_to_string(path).map_err(|e| RelchronError::io(path, e))?;

    let catalog: VersionCatalog = serde_json::from_str(&content).map_err(|e| {
        RelchronError::validation(format!("failed to parse {}: {e}", path.display()))
    })?;

    if catalog.schema_version != CATALOG_SCHEMA_VERSION {
        return Err(RelchronError::validation(format!(
            "{}: unsupported catalog schema_version {:?} (expected {CATALOG_SCHEMA_VERSION:?})",
            path.display(),
            catalog.schema_version
        )));
    }

    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use relchron_shared::{CatalogEntry, Channel};

    fn temp_path(name: &str) -> std::path::PathBuf {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("relchron-store-{nanos}-{name}"))
    }

    fn sample_catalog() -> VersionCatalog {
        VersionCatalog {
            schema_version: CATALOG_SCHEMA_VERSION.into(),
            source: "https://github.com/acme/widget".into(),
            last_updated_utc: Utc.with_ymd_and_hms(2025, 6, 30, 0, 0, 0).unwrap(),
            notes: "test catalog".into(),
            versions: vec![CatalogEntry {
                version: "1.0.0".into(),
                released_at: Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap(),
                channel: Channel::Stable,
                anchors: vec!["https://github.com/acme/widget/releases/tag/v1.0.0".into()],
            }],
        }
    }

    #[test]
    fn write_then_read_roundtrip() {
        let dir = temp_path("roundtrip");
        let path = dir.join("catalog").join("widget.json");

        write_catalog(&path, &sample_catalog()).expect("write");
        let loaded = read_catalog(&path).expect("read");

        assert_eq!(loaded.versions.len(), 1);
        assert_eq!(loaded.versions[0].version, "1.0.0");

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.ends_with('\n'));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn unknown_schema_version_is_rejected() {
        let dir = temp_path("schema");
        let path = dir.join("widget.json");

        let mut catalog = sample_catalog();
        catalog.schema_version = "99".into();
        write_catalog(&path, &catalog).expect("write");

        let err = read_catalog(&path).unwrap_err();
        assert!(err.to_string().contains("schema_version"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = read_catalog(Path::new("/nonexistent/relchron/catalog.json")).unwrap_err();
        assert!(matches!(err, RelchronError::Io { .. }));
    }
}
