//! Date-windowed nearest-version resolution.
//!
//! Maps a milestone's start date to the latest catalog entry released at or
//! before `start_date + 7 days`, modeling typical packaging/announcement
//! lag. The resolver is pure and synchronous; [`apply_to_document`] and
//! [`resolve_document_file`] apply it idempotently over milestone documents.

mod batch;

pub use batch::{BatchSummary, apply_to_document, resolve_document_file};

use chrono::{DateTime, Duration, NaiveDate, Utc};

use relchron_shared::CatalogEntry;

/// Fixed forward tolerance when matching a start date to a release.
/// Independent of the catalog build window.
pub const RESOLVE_WINDOW_DAYS: i64 = 7;

/// Resolve an event date against a catalog.
///
/// `versions` must be ascending by `released_at` (the catalog invariant).
/// Returns the version of the **latest** entry with
/// `released_at <= start_date + 7 days` — the last element of the filtered
/// ascending prefix — or `None` when the date fails to parse or no entry
/// qualifies. When several releases fall inside the window this
/// deliberately prefers the newest one.
pub fn resolve<'a>(versions: &'a [CatalogEntry], start_date: &str) -> Option<&'a str> {
    let start = parse_start_date(start_date)?;
    let deadline = start + Duration::days(RESOLVE_WINDOW_DAYS);

    versions
        .iter()
        .rev()
        .find(|entry| entry.released_at <= deadline)
        .map(|entry| entry.version.as_str())
}

/// Parse a milestone start date: RFC 3339, else a bare `YYYY-MM-DD` taken
/// at midnight UTC.
fn parse_start_date(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ndt| ndt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use relchron_shared::Channel;

    /// Catalog with entries on day 0, day 5, and day 10 of June 2025.
    fn catalog() -> Vec<CatalogEntry> {
        [("1.0", 1), ("1.1", 6), ("1.2", 11)]
            .into_iter()
            .map(|(version, day)| CatalogEntry {
                version: version.into(),
                released_at: Utc.with_ymd_and_hms(2025, 6, day, 0, 0, 0).unwrap(),
                channel: Channel::Stable,
                anchors: vec![format!("https://github.com/acme/widget/releases/tag/v{version}")],
            })
            .collect()
    }

    #[test]
    fn picks_latest_entry_within_forward_window() {
        // Start day 3 → deadline day 10: all three qualify, latest wins.
        assert_eq!(resolve(&catalog(), "2025-06-04"), Some("1.2"));
    }

    #[test]
    fn start_after_all_releases_falls_back_to_latest() {
        // Start day 20 → deadline day 27: every entry precedes it.
        assert_eq!(resolve(&catalog(), "2025-06-21"), Some("1.2"));
    }

    #[test]
    fn no_entry_within_window_yields_none() {
        // Deadline before the first release.
        let early = vec![CatalogEntry {
            version: "1.0".into(),
            released_at: Utc.with_ymd_and_hms(2025, 6, 20, 0, 0, 0).unwrap(),
            channel: Channel::Stable,
            anchors: vec!["https://example.com".into()],
        }];
        assert_eq!(resolve(&early, "2025-06-01"), None);
    }

    #[test]
    fn boundary_release_exactly_at_deadline_qualifies() {
        // Start day 4 → deadline day 11 00:00, exactly the 1.2 release time.
        assert_eq!(resolve(&catalog(), "2025-06-04T00:00:00Z"), Some("1.2"));
    }

    #[test]
    fn malformed_start_date_yields_none() {
        assert_eq!(resolve(&catalog(), "soon"), None);
        assert_eq!(resolve(&catalog(), "2025-13-45"), None);
        assert_eq!(resolve(&catalog(), ""), None);
    }

    #[test]
    fn empty_catalog_yields_none() {
        assert_eq!(resolve(&[], "2025-06-04"), None);
    }

    #[test]
    fn rfc3339_start_dates_are_accepted() {
        assert_eq!(resolve(&catalog(), "2025-06-03T15:30:00+02:00"), Some("1.2"));
    }
}
