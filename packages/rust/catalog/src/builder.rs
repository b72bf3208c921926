//! The catalog build algorithm: bounded, cutoff-aware pagination with
//! stable-only filtering, dedup by normalized version, and ascending sort.

use chrono::{DateTime, Duration, Utc};
use tracing::{debug, info, instrument};

use relchron_feed::{FeedClient, MAX_PAGE_SIZE, ReleaseRecord};
use relchron_shared::{CATALOG_SCHEMA_VERSION, CatalogEntry, Channel, Result, VersionCatalog};

/// Fixed batch size for feed requests.
const PAGE_SIZE: u32 = MAX_PAGE_SIZE;

/// A normalized release candidate, pre-dedup. `released_at` stays optional
/// until after dedup so the tie-break can prefer a timestamped duplicate.
#[derive(Debug, Clone)]
struct Candidate {
    version: String,
    released_at: Option<DateTime<Utc>>,
    anchors: Vec<String>,
}

// ---------------------------------------------------------------------------
// Build pipeline
// ---------------------------------------------------------------------------

/// Build a version catalog for `owner/repo` covering at least the trailing
/// `window_days` before `now`.
///
/// Pages are requested strictly one at a time. Paging stops after the first
/// page whose oldest (last) raw record precedes the cutoff — every later
/// page is older still — or when the feed signals no further pages. The
/// window is therefore a minimum lookback: the catalog may reach up to one
/// page past the cutoff but never stops short of it.
///
/// A non-success feed response aborts the whole build; no partial catalog
/// is produced.
#[instrument(skip(client, now))]
pub async fn build_catalog(
    client: &FeedClient,
    owner: &str,
    repo: &str,
    window_days: i64,
    now: DateTime<Utc>,
) -> Result<VersionCatalog> {
    let cutoff = now - Duration::days(window_days);
    let mut candidates: Vec<Candidate> = Vec::new();
    let mut page = 1u32;
    let mut pages_fetched = 0u32;

    loop {
        let feed_page = client.list_releases(owner, repo, page, PAGE_SIZE).await?;
        pages_fetched += 1;

        let before = candidates.len();
        candidates.extend(page_candidates(&feed_page.records, cutoff, owner, repo));
        debug!(
            page,
            raw = feed_page.records.len(),
            kept = candidates.len() - before,
            "page filtered"
        );

        // Oldest record on a newest-first page decides whether anything
        // further back can still be inside the window.
        if page_exhausts_window(&feed_page.records, cutoff) {
            debug!(page, "oldest record on page precedes cutoff, stopping");
            break;
        }
        if !feed_page.has_more {
            break;
        }
        page += 1;
    }

    let deduped = dedup_by_version(candidates);
    let mut versions: Vec<CatalogEntry> = deduped
        .into_iter()
        .filter_map(|c| {
            let released_at = c.released_at?;
            Some(CatalogEntry {
                version: c.version,
                released_at,
                channel: Channel::Stable,
                anchors: c.anchors,
            })
        })
        .collect();
    versions.sort_by_key(|e| e.released_at);

    info!(
        owner,
        repo,
        pages = pages_fetched,
        entries = versions.len(),
        "catalog built"
    );

    Ok(VersionCatalog {
        schema_version: CATALOG_SCHEMA_VERSION.into(),
        source: format!("https://github.com/{owner}/{repo}"),
        last_updated_utc: now,
        notes: format!("stable releases of {owner}/{repo}, trailing {window_days}-day minimum"),
        versions,
    })
}

// ---------------------------------------------------------------------------
// Per-page filtering
// ---------------------------------------------------------------------------

/// Filter one raw page down to in-window stable candidates.
fn page_candidates(
    records: &[ReleaseRecord],
    cutoff: DateTime<Utc>,
    owner: &str,
    repo: &str,
) -> Vec<Candidate> {
    records
        .iter()
        .filter(|r| !r.draft && !r.prerelease)
        .filter_map(|r| {
            let Some(ts) = record_timestamp(r) else {
                debug!(tag = %r.tag_name, "unparsable timestamp, dropping record");
                return None;
            };
            if ts < cutoff {
                return None;
            }
            let anchor = r
                .html_url
                .clone()
                .unwrap_or_else(|| synthesize_anchor(owner, repo, &r.tag_name));
            Some(Candidate {
                version: normalize_version(&r.tag_name),
                released_at: Some(ts),
                anchors: vec![anchor],
            })
        })
        .collect()
}

/// True when the oldest (last) raw record on a newest-first page is
/// strictly earlier than the cutoff, meaning every subsequent page is
/// entirely outside the window. An unparsable timestamp gives no such
/// guarantee, so paging continues.
fn page_exhausts_window(records: &[ReleaseRecord], cutoff: DateTime<Utc>) -> bool {
    records
        .last()
        .and_then(record_timestamp)
        .is_some_and(|ts| ts < cutoff)
}

/// Publish time with creation-time fallback, parsed as RFC 3339.
fn record_timestamp(record: &ReleaseRecord) -> Option<DateTime<Utc>> {
    record
        .published_at
        .as_deref()
        .and_then(parse_timestamp)
        .or_else(|| record.created_at.as_deref().and_then(parse_timestamp))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Strip a leading `v`/`V` version prefix from a tag.
fn normalize_version(tag: &str) -> String {
    tag.strip_prefix(['v', 'V']).unwrap_or(tag).to_string()
}

fn synthesize_anchor(owner: &str, repo: &str, tag: &str) -> String {
    format!("https://github.com/{owner}/{repo}/releases/tag/{tag}")
}

// ---------------------------------------------------------------------------
// Dedup
// ---------------------------------------------------------------------------

/// Deduplicate candidates by version, preserving first-occurrence order.
///
/// The first occurrence wins unless it lacks a timestamp and a later
/// duplicate has one, in which case the timestamped duplicate takes its
/// place.
fn dedup_by_version(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut out: Vec<Candidate> = Vec::with_capacity(candidates.len());
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();

    for candidate in candidates {
        match index.get(&candidate.version) {
            Some(&i) => {
                if out[i].released_at.is_none() && candidate.released_at.is_some() {
                    out[i] = candidate;
                }
            }
            None => {
                index.insert(candidate.version.clone(), out.len());
                out.push(candidate);
            }
        }
    }

    out
}
