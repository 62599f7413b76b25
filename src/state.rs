//! Shared in-memory application state.
//!
//! Everything the service knows lives in one [`AppState`]: the per-site
//! content indexes, sync cooldown clocks, the rate limiter, and the chat log
//! ring buffer. Nothing persists across restarts. State is owned by the
//! instance rather than held at process scope, so tests can run several
//! isolated services side by side.
//!
//! Locking: a single `std::sync::Mutex` guards the maps and is never held
//! across an `await`. Network fetches happen outside the lock; a finished
//! sync publishes its result as one locked insert, so readers never observe
//! a partially updated index.

use anyhow::Result;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::config::Config;
use crate::models::{LogEntry, SiteIndex, SiteSummary};
use crate::ratelimit::RateLimiter;
use crate::sync::should_sync;

struct Inner {
    sites: HashMap<String, SiteIndex>,
    /// Site key -> time of last successful sync.
    cooldowns: HashMap<String, DateTime<Utc>>,
    limiter: RateLimiter,
    logs: VecDeque<LogEntry>,
}

pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    inner: Mutex<Inner>,
    /// Per-site guards that coalesce concurrent auto-syncs: late arrivals for
    /// the same key wait on the in-flight attempt instead of fetching again.
    /// Entries are never evicted; growth is bounded by the number of distinct
    /// site keys seen over the process lifetime.
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl AppState {
    pub fn new(config: Config) -> Result<Arc<AppState>> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.sync.timeout_secs))
            .build()?;
        let limiter = RateLimiter::new(
            config.rate_limit.max_requests,
            config.rate_limit.window_secs,
        );
        Ok(Arc::new(AppState {
            config,
            http,
            inner: Mutex::new(Inner {
                sites: HashMap::new(),
                cooldowns: HashMap::new(),
                limiter,
                logs: VecDeque::new(),
            }),
            in_flight: Mutex::new(HashMap::new()),
        }))
    }

    /// Clones the current index for a site, if any.
    pub fn site_snapshot(&self, site_key: &str) -> Option<SiteIndex> {
        self.inner.lock().unwrap().sites.get(site_key).cloned()
    }

    /// Atomically replaces a site's index and resets its cooldown clock.
    pub fn replace_index(&self, site_key: &str, index: SiteIndex) {
        let mut inner = self.inner.lock().unwrap();
        inner.cooldowns.insert(site_key.to_string(), index.updated_at);
        inner.sites.insert(site_key.to_string(), index);
    }

    /// Whether the sync throttle allows a sync of this site at `now`.
    pub fn sync_allowed(&self, site_key: &str, now: DateTime<Utc>) -> bool {
        let last = self.inner.lock().unwrap().cooldowns.get(site_key).copied();
        should_sync(last, now, self.config.sync.cooldown_secs)
    }

    /// Counts a request against the client's rate-limit window; false means
    /// the request must be rejected.
    pub fn check_rate(&self, client: &str, now: DateTime<Utc>) -> bool {
        self.inner.lock().unwrap().limiter.check(client, now)
    }

    /// Appends to the chat log, evicting the oldest entry at capacity.
    pub fn push_log(&self, entry: LogEntry) {
        let capacity = self.config.log.capacity;
        let mut inner = self.inner.lock().unwrap();
        if inner.logs.len() >= capacity {
            inner.logs.pop_front();
        }
        inner.logs.push_back(entry);
    }

    /// Recent chat log entries, oldest first.
    pub fn logs(&self) -> Vec<LogEntry> {
        self.inner.lock().unwrap().logs.iter().cloned().collect()
    }

    /// Summaries of all indexed sites, sorted by site key.
    pub fn site_summaries(&self) -> Vec<SiteSummary> {
        let inner = self.inner.lock().unwrap();
        let mut summaries: Vec<SiteSummary> = inner
            .sites
            .iter()
            .map(|(key, index)| SiteSummary {
                site_key: key.clone(),
                count: index.documents.len(),
                updated_at: index.updated_at,
                base_url: index.base_url.clone(),
            })
            .collect();
        summaries.sort_by(|a, b| a.site_key.cmp(&b.site_key));
        summaries
    }

    /// Returns the in-flight sync guard for a site, creating it on first use.
    pub fn sync_guard(&self, site_key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut guards = self.in_flight.lock().unwrap();
        guards
            .entry(site_key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Document;

    fn state() -> Arc<AppState> {
        AppState::new(Config::default()).unwrap()
    }

    fn index(n: usize) -> SiteIndex {
        SiteIndex {
            documents: (0..n)
                .map(|i| Document {
                    source_id: i as u64,
                    title: format!("Doc {}", i),
                    url: format!("https://example.com/{}", i),
                    body: "body".to_string(),
                })
                .collect(),
            updated_at: Utc::now(),
            base_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_replace_index_is_wholesale() {
        let state = state();
        state.replace_index("example.com", index(3));
        let first = state.site_snapshot("example.com").unwrap();
        assert_eq!(first.documents.len(), 3);

        state.replace_index("example.com", index(1));
        let second = state.site_snapshot("example.com").unwrap();
        assert_eq!(second.documents.len(), 1);
        assert!(second.updated_at >= first.updated_at);
    }

    #[test]
    fn test_sync_allowed_until_marked() {
        let state = state();
        let now = Utc::now();
        assert!(state.sync_allowed("example.com", now));
        state.replace_index("example.com", index(1));
        assert!(!state.sync_allowed("example.com", now + chrono::Duration::seconds(10)));
        assert!(state.sync_allowed("example.com", now + chrono::Duration::seconds(600)));
    }

    #[test]
    fn test_log_ring_buffer_evicts_oldest() {
        let mut config = Config::default();
        config.log.capacity = 3;
        let state = AppState::new(config).unwrap();
        for i in 0..5 {
            state.push_log(LogEntry {
                ts: Utc::now(),
                site_key: format!("site-{}", i),
                session_id: String::new(),
                text: String::new(),
                page_url: String::new(),
            });
        }
        let logs = state.logs();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].site_key, "site-2");
        assert_eq!(logs[2].site_key, "site-4");
    }

    #[test]
    fn test_sync_guard_is_shared_per_site() {
        let state = state();
        let a = state.sync_guard("example.com");
        let b = state.sync_guard("example.com");
        let c = state.sync_guard("other.com");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
