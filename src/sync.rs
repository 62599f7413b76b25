//! Content synchronization against a site's WordPress REST API.
//!
//! A sync fetches the `pages` and `posts` collections concurrently, cleans
//! each item's HTML into plain text, drops bodies too short to be worth
//! indexing, and publishes the result as one atomic index replacement. Either
//! fetch failing fails the whole sync; no partial update occurs and nothing
//! is retried. The caller decides whether to surface the error (explicit
//! `/v1/site/sync`) or swallow it (auto-sync during chat).

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use url::Url;

use crate::html::clean_html;
use crate::models::{Document, SiteIndex};
use crate::state::AppState;

/// Upstream response bodies are clipped to this many characters in errors.
const ERROR_EXCERPT_CHARS: usize = 200;

/// Sync failure. Carries both upstream statuses so a single error message
/// shows which collection broke.
#[derive(Debug)]
pub enum SyncError {
    /// Network-level failure before any status was received.
    Http(reqwest::Error),
    /// One or both collections returned a non-success status.
    Upstream {
        pages_status: StatusCode,
        posts_status: StatusCode,
        pages_excerpt: String,
        posts_excerpt: String,
    },
    /// A collection returned a body that is not a JSON item array.
    Decode(String),
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SyncError::Http(e) => write!(f, "content API request failed: {}", e),
            SyncError::Upstream {
                pages_status,
                posts_status,
                pages_excerpt,
                posts_excerpt,
            } => write!(
                f,
                "content API returned pages={} ({}), posts={} ({})",
                pages_status, pages_excerpt, posts_status, posts_excerpt
            ),
            SyncError::Decode(e) => write!(f, "content API response not decodable: {}", e),
        }
    }
}

impl std::error::Error for SyncError {}

impl From<reqwest::Error> for SyncError {
    fn from(e: reqwest::Error) -> Self {
        SyncError::Http(e)
    }
}

/// Result summary of a successful sync.
#[derive(Debug)]
pub struct SyncOutcome {
    pub site_key: String,
    pub count: usize,
    pub updated_at: DateTime<Utc>,
}

/// One item of a WordPress `pages`/`posts` collection, with the fields the
/// projection requests. Missing fields default rather than fail: plenty of
/// sites run plugins that prune the rendered payload.
#[derive(Debug, Deserialize)]
struct ContentItem {
    #[serde(default)]
    id: u64,
    #[serde(default)]
    link: String,
    #[serde(default)]
    title: RenderedField,
    #[serde(default)]
    content: RenderedField,
}

#[derive(Debug, Deserialize, Default)]
struct RenderedField {
    #[serde(default)]
    rendered: String,
}

/// Whether a site may be synced at `now` given its last successful sync.
///
/// True when no sync is recorded or the cooldown window has elapsed. Note the
/// clock is only advanced on success (see `AppState::replace_index`), so a
/// persistently failing upstream is retried on every triggering chat message.
pub fn should_sync(last: Option<DateTime<Utc>>, now: DateTime<Utc>, cooldown_secs: i64) -> bool {
    match last {
        None => true,
        Some(t) => now - t > chrono::Duration::seconds(cooldown_secs),
    }
}

/// Fetches a site's pages and posts and replaces its index.
pub async fn sync_site(
    state: &AppState,
    base: &Url,
    site_key: &str,
) -> Result<SyncOutcome, SyncError> {
    let per_page = state.config.sync.per_page;
    let pages_url = crate::urls::content_endpoint(base, "pages", per_page);
    let posts_url = crate::urls::content_endpoint(base, "posts", per_page);

    let (pages, posts) = tokio::join!(
        fetch_collection(&state.http, pages_url),
        fetch_collection(&state.http, posts_url),
    );
    let (pages_status, pages_body) = pages?;
    let (posts_status, posts_body) = posts?;

    if !pages_status.is_success() || !posts_status.is_success() {
        return Err(SyncError::Upstream {
            pages_status,
            posts_status,
            pages_excerpt: excerpt(&pages_body, ERROR_EXCERPT_CHARS),
            posts_excerpt: excerpt(&posts_body, ERROR_EXCERPT_CHARS),
        });
    }

    let mut documents = decode_documents(&pages_body, state.config.sync.min_body_chars)?;
    documents.extend(decode_documents(&posts_body, state.config.sync.min_body_chars)?);

    let updated_at = Utc::now();
    let count = documents.len();
    state.replace_index(
        site_key,
        SiteIndex {
            documents,
            updated_at,
            base_url: base.as_str().to_string(),
        },
    );

    println!("synced {}: {} documents from {}", site_key, count, base);

    Ok(SyncOutcome {
        site_key: site_key.to_string(),
        count,
        updated_at,
    })
}

async fn fetch_collection(
    client: &reqwest::Client,
    url: Url,
) -> Result<(StatusCode, String), reqwest::Error> {
    let response = client.get(url).send().await?;
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Ok((status, body))
}

/// Decodes one collection body into index documents, dropping items whose
/// cleaned body is under `min_body_chars`.
fn decode_documents(body: &str, min_body_chars: usize) -> Result<Vec<Document>, SyncError> {
    let items: Vec<ContentItem> =
        serde_json::from_str(body).map_err(|e| SyncError::Decode(e.to_string()))?;
    Ok(items
        .into_iter()
        .filter_map(|item| {
            let cleaned = clean_html(&item.content.rendered);
            if cleaned.chars().count() < min_body_chars {
                return None;
            }
            let title = clean_html(&item.title.rendered);
            Some(Document {
                source_id: item.id,
                title: if title.is_empty() { "Untitled".to_string() } else { title },
                url: item.link,
                body: cleaned,
            })
        })
        .collect())
}

fn excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}
