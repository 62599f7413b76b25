//! Fixed-window request rate limiting.
//!
//! One counter per client address. The window starts on the first request and
//! resets wholesale once it elapses; there is no sliding behavior. Runs as
//! the very first gate in the request path, so a rejected request performs no
//! further work (no log entry, no sync, no retrieval).

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;

/// Client key used when neither a forwarded header nor a peer address is
/// available.
pub const UNKNOWN_CLIENT: &str = "unknown";

#[derive(Debug)]
struct Entry {
    count: u32,
    window_start: DateTime<Utc>,
}

/// Fixed-window counter keyed by client address.
///
/// Expired entries are overwritten in place on the client's next request but
/// never swept; the map grows with the number of distinct client addresses
/// seen over the process lifetime.
#[derive(Debug)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    entries: HashMap<String, Entry>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window_secs: i64) -> RateLimiter {
        RateLimiter {
            max_requests,
            window: Duration::seconds(window_secs),
            entries: HashMap::new(),
        }
    }

    /// Records a request from `client` at `now` and returns whether it is
    /// allowed. Count and window are updated together under the caller's
    /// lock, so no request observes an inconsistent pair.
    pub fn check(&mut self, client: &str, now: DateTime<Utc>) -> bool {
        match self.entries.get_mut(client) {
            Some(entry) if now - entry.window_start < self.window => {
                entry.count += 1;
                entry.count <= self.max_requests
            }
            _ => {
                self.entries.insert(
                    client.to_string(),
                    Entry {
                        count: 1,
                        window_start: now,
                    },
                );
                true
            }
        }
    }
}

/// Derives the rate-limit key for a request: the first `x-forwarded-for`
/// entry if present, else the socket peer address, else [`UNKNOWN_CLIENT`].
pub fn client_key(forwarded_for: Option<&str>, peer: Option<&str>) -> String {
    if let Some(header) = forwarded_for {
        if let Some(first) = header.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }
    match peer {
        Some(addr) if !addr.is_empty() => addr.to_string(),
        _ => UNKNOWN_CLIENT.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_exactly_max_allowed_then_rejected() {
        let mut limiter = RateLimiter::new(60, 60);
        let now = t0();
        for i in 0..60 {
            assert!(limiter.check("1.2.3.4", now), "request {} should pass", i + 1);
        }
        assert!(!limiter.check("1.2.3.4", now), "61st request should be rejected");
    }

    #[test]
    fn test_window_reset() {
        let mut limiter = RateLimiter::new(2, 60);
        let now = t0();
        assert!(limiter.check("c", now));
        assert!(limiter.check("c", now));
        assert!(!limiter.check("c", now + Duration::seconds(59)));
        // Window elapsed: counter starts over
        assert!(limiter.check("c", now + Duration::seconds(60)));
        assert!(limiter.check("c", now + Duration::seconds(61)));
        assert!(!limiter.check("c", now + Duration::seconds(62)));
    }

    #[test]
    fn test_clients_counted_independently() {
        let mut limiter = RateLimiter::new(1, 60);
        let now = t0();
        assert!(limiter.check("a", now));
        assert!(limiter.check("b", now));
        assert!(!limiter.check("a", now));
    }

    #[test]
    fn test_client_key_prefers_forwarded_for() {
        assert_eq!(
            client_key(Some("203.0.113.9, 10.0.0.1"), Some("127.0.0.1:5000")),
            "203.0.113.9"
        );
        assert_eq!(client_key(None, Some("127.0.0.1:5000")), "127.0.0.1:5000");
        assert_eq!(client_key(None, None), UNKNOWN_CLIENT);
        assert_eq!(client_key(Some("  "), None), UNKNOWN_CLIENT);
    }
}
