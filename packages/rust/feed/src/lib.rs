//! Client for the paginated release listing feed.
//!
//! The feed serves release records newest-first in numbered pages (GitHub
//! releases API shape) and signals whether further pages exist via the
//! `Link` response header. The client makes one request at a time; paging
//! strategy and stop decisions belong to the catalog builder.

use relchron_shared::{RelchronError, Result};
use reqwest::Client;
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Largest page size the feed accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// Maximum number of redirects to follow.
const MAX_REDIRECTS: usize = 3;

/// Default timeout in seconds for feed requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User-Agent string for feed requests.
const USER_AGENT: &str = concat!("relchron/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// A raw release record as served by the feed. Ephemeral; never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct ReleaseRecord {
    /// Release tag, e.g. `v1.4.0`.
    pub tag_name: String,
    /// Publish timestamp (RFC 3339). Null for drafts.
    #[serde(default)]
    pub published_at: Option<String>,
    /// Creation timestamp (RFC 3339); fallback when `published_at` is absent.
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub draft: bool,
    #[serde(default)]
    pub prerelease: bool,
    /// Canonical browse URL of the release, if the feed provides one.
    #[serde(default)]
    pub html_url: Option<String>,
}

/// One page of release records plus the feed's continuation signal.
#[derive(Debug, Clone)]
pub struct ReleasePage {
    /// Records in the feed's native order (newest-first).
    pub records: Vec<ReleaseRecord>,
    /// Whether the feed reports further pages after this one.
    pub has_more: bool,
}

// ---------------------------------------------------------------------------
// FeedClient
// ---------------------------------------------------------------------------

/// HTTP client for the release listing feed.
pub struct FeedClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl FeedClient {
    /// Create a new feed client against the given API base URL.
    ///
    /// `token` is an optional bearer credential; the feed works without one
    /// at a lower rate limit.
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()
            .map_err(|e| RelchronError::Feed(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    /// Fetch one page of release records for `owner/repo`.
    ///
    /// Page numbering starts at 1. `per_page` is clamped to
    /// [`MAX_PAGE_SIZE`]. Any non-success response is fatal and carries the
    /// status code and response body in the error.
    #[instrument(skip(self))]
    pub async fn list_releases(
        &self,
        owner: &str,
        repo: &str,
        page: u32,
        per_page: u32,
    ) -> Result<ReleasePage> {
        let per_page = per_page.min(MAX_PAGE_SIZE);
        let url = format!(
            "{}/repos/{owner}/{repo}/releases?per_page={per_page}&page={page}",
            self.api_base
        );

        debug!(%url, "requesting release page");

        let mut request = self
            .client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| RelchronError::Feed(format!("{url}: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelchronError::Feed(format!("{url}: HTTP {status}: {body}")));
        }

        let has_more = has_next_page(response.headers());

        let records: Vec<ReleaseRecord> = response
            .json()
            .await
            .map_err(|e| RelchronError::Feed(format!("{url}: failed to decode body: {e}")))?;

        debug!(count = records.len(), has_more, "release page received");

        Ok(ReleasePage { records, has_more })
    }
}

/// Whether the response's `Link` header advertises a next page.
fn has_next_page(headers: &HeaderMap) -> bool {
    headers
        .get_all(LINK)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.split(',').any(|part| part.contains("rel=\"next\"")))
}
