//! Core domain types for relchron catalogs and milestone documents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Current schema version for the catalog document format.
pub const CATALOG_SCHEMA_VERSION: &str = "1";

// ---------------------------------------------------------------------------
// Channel
// ---------------------------------------------------------------------------

/// Release channel of a catalog entry. Only stable releases survive the
/// builder's filtering, so persisted catalogs contain `stable` exclusively.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
}

// ---------------------------------------------------------------------------
// CatalogEntry / VersionCatalog
// ---------------------------------------------------------------------------

/// A single normalized release in the version catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Normalized version identifier (tag with any leading `v`/`V` stripped).
    /// Unique within a catalog.
    pub version: String,
    /// Publish time of the release. Required; candidates without a
    /// resolvable timestamp are discarded before persistence.
    pub released_at: DateTime<Utc>,
    /// Release channel; always [`Channel::Stable`] for persisted entries.
    pub channel: Channel,
    /// Reference URIs pointing at the originating release record. At least one.
    pub anchors: Vec<String>,
}

/// The persisted catalog document.
///
/// Invariant: `versions` is sorted ascending by `released_at` and contains
/// no duplicate `version` values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionCatalog {
    /// Schema version marker for forward compatibility.
    pub schema_version: String,
    /// URL of the upstream release feed this catalog was built from.
    pub source: String,
    /// When this catalog was generated.
    pub last_updated_utc: DateTime<Utc>,
    /// Free-form provenance note.
    pub notes: String,
    /// The version history, ascending by `released_at`.
    pub versions: Vec<CatalogEntry>,
}

// ---------------------------------------------------------------------------
// Milestone documents
// ---------------------------------------------------------------------------

/// A milestone document owned by an external collaborator.
///
/// Read and rewritten wholesale; fields this tool does not model are
/// preserved across the rewrite via flattened maps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneDoc {
    /// Feature surfaces, each carrying its own milestone list.
    #[serde(default)]
    pub surfaces: Vec<SurfaceEntry>,
    /// Collaborator-owned fields we pass through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// One named surface within a milestone document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceEntry {
    /// Surface name; only surfaces matching the configured target are
    /// candidates for resolution.
    pub name: String,
    /// Feature milestones recorded against this surface.
    #[serde(default)]
    pub milestones: Vec<MilestoneEntry>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A recorded feature-availability event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MilestoneEntry {
    /// When the feature began rolling out (ISO date or RFC 3339 timestamp).
    pub start_date: String,
    /// The earliest plausible release that shipped the feature. Once set,
    /// never recomputed or overwritten.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_plugin_version: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry(version: &str, secs: i64) -> CatalogEntry {
        CatalogEntry {
            version: version.into(),
            released_at: Utc.timestamp_opt(secs, 0).unwrap(),
            channel: Channel::Stable,
            anchors: vec![format!("https://github.com/acme/widget/releases/tag/v{version}")],
        }
    }

    #[test]
    fn channel_serializes_lowercase() {
        let json = serde_json::to_string(&Channel::Stable).expect("serialize");
        assert_eq!(json, "\"stable\"");
    }

    #[test]
    fn catalog_serialization_roundtrip() {
        let catalog = VersionCatalog {
            schema_version: CATALOG_SCHEMA_VERSION.into(),
            source: "https://github.com/acme/widget".into(),
            last_updated_utc: Utc::now(),
            notes: "stable releases only".into(),
            versions: vec![entry("1.0.0", 1_000), entry("1.1.0", 2_000)],
        };

        let json = serde_json::to_string_pretty(&catalog).expect("serialize");
        let parsed: VersionCatalog = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(parsed.schema_version, CATALOG_SCHEMA_VERSION);
        assert_eq!(parsed.versions.len(), 2);
        assert_eq!(parsed.versions[0].version, "1.0.0");
        assert_eq!(parsed.versions[0].channel, Channel::Stable);
    }

    #[test]
    fn milestone_doc_preserves_unknown_fields() {
        let raw = serde_json::json!({
            "generated_by": "upstream-tool",
            "surfaces": [{
                "name": "editor",
                "owner_team": "core",
                "milestones": [{
                    "start_date": "2025-03-01",
                    "rollout_stage": "ga"
                }]
            }]
        });

        let mut doc: MilestoneDoc = serde_json::from_value(raw).expect("deserialize");
        doc.surfaces[0].milestones[0].min_plugin_version = Some("1.4.0".into());

        let back = serde_json::to_value(&doc).expect("serialize");
        assert_eq!(back["generated_by"], "upstream-tool");
        assert_eq!(back["surfaces"][0]["owner_team"], "core");
        assert_eq!(back["surfaces"][0]["milestones"][0]["rollout_stage"], "ga");
        assert_eq!(
            back["surfaces"][0]["milestones"][0]["min_plugin_version"],
            "1.4.0"
        );
    }

    #[test]
    fn absent_min_version_is_not_serialized() {
        let entry = MilestoneEntry {
            start_date: "2025-01-15".into(),
            min_plugin_version: None,
            extra: serde_json::Map::new(),
        };
        let json = serde_json::to_string(&entry).expect("serialize");
        assert!(!json.contains("min_plugin_version"));
    }

    #[test]
    fn catalog_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/catalog.fixture.json")
            .expect("read fixture");
        let parsed: VersionCatalog =
            serde_json::from_str(&fixture).expect("deserialize fixture catalog");
        assert_eq!(parsed.schema_version, CATALOG_SCHEMA_VERSION);
        assert_eq!(parsed.versions.len(), 3);
        // Fixture honors the sortedness invariant.
        for pair in parsed.versions.windows(2) {
            assert!(pair[0].released_at <= pair[1].released_at);
        }
    }

    #[test]
    fn milestones_fixture_validates() {
        let fixture = std::fs::read_to_string("../../../fixtures/json/milestones.fixture.json")
            .expect("read fixture");
        let parsed: MilestoneDoc =
            serde_json::from_str(&fixture).expect("deserialize fixture milestones");
        assert_eq!(parsed.surfaces.len(), 2);
        assert_eq!(parsed.surfaces[0].name, "editor");
        assert!(parsed.surfaces[0].milestones[0].min_plugin_version.is_none());
    }
}
