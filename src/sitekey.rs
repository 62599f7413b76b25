//! Site key resolution.
//!
//! All per-site state (index, cooldown, in-flight sync guard) is partitioned
//! by a single normalized key derived here. The derivation is pure and total:
//! missing inputs fall back to a literal default rather than an error.

/// Key used when neither a domain nor a site id is supplied.
pub const DEFAULT_SITE_KEY: &str = "default";

/// Lowercases and trims a domain and strips one leading `www.` label, so
/// `WWW.Example.com` and `example.com` produce the same key.
pub fn normalize_domain(domain: &str) -> String {
    let d = domain.trim().to_lowercase();
    match d.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => d,
    }
}

/// Derives the site key from an optional domain and an optional site id.
///
/// A non-empty normalized domain wins; otherwise the lowercased, trimmed site
/// id; otherwise [`DEFAULT_SITE_KEY`].
pub fn resolve_site_key(domain: Option<&str>, site_id: Option<&str>) -> String {
    if let Some(d) = domain {
        let normalized = normalize_domain(d);
        if !normalized.is_empty() {
            return normalized;
        }
    }
    if let Some(id) = site_id {
        let trimmed = id.trim().to_lowercase();
        if !trimmed.is_empty() {
            return trimmed;
        }
    }
    DEFAULT_SITE_KEY.to_string()
}
