//! Typed URL construction shared by the syncer and the chat orchestrator.
//!
//! Base URLs arrive from three places (explicit `siteUrl`, the widget's
//! `pageUrl`, a bare domain) and used to be glued together with string
//! concatenation. Parsing once through [`url::Url`] validates scheme and host
//! up front and makes endpoint construction infallible afterwards.

use url::Url;

/// Parses and normalizes a site base URL. Accepts only `http`/`https`, and
/// drops any query string or fragment. Returns `None` for anything that does
/// not parse to an absolute URL with a host.
pub fn normalize_base(input: &str) -> Option<Url> {
    let mut url = Url::parse(input.trim()).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;
    url.set_query(None);
    url.set_fragment(None);
    Some(url)
}

/// Extracts the origin (`scheme://host[:port]`) of a page URL as a base URL.
pub fn page_origin(page_url: &str) -> Option<Url> {
    let url = normalize_base(page_url)?;
    // origin only: discard the page's own path
    let origin = format!("{}://{}", url.scheme(), url.host_str()?);
    let origin = match url.port() {
        Some(p) => format!("{}:{}", origin, p),
        None => origin,
    };
    Url::parse(&origin).ok()
}

/// Builds the content API endpoint for one collection (`"pages"` or
/// `"posts"`) under a base URL, with the pagination and field projection the
/// syncer relies on.
pub fn content_endpoint(base: &Url, collection: &str, per_page: u32) -> Url {
    let mut url = base.clone();
    {
        let trimmed = url.path().trim_end_matches('/').to_string();
        url.set_path(&format!("{}/wp-json/wp/v2/{}", trimmed, collection));
    }
    url.query_pairs_mut()
        .append_pair("per_page", &per_page.to_string())
        .append_pair("_fields", "id,link,title,content");
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_base_accepts_http_https() {
        assert!(normalize_base("https://example.com").is_some());
        assert!(normalize_base("http://example.com/blog").is_some());
        assert!(normalize_base("ftp://example.com").is_none());
        assert!(normalize_base("not a url").is_none());
        assert!(normalize_base("/relative/path").is_none());
    }

    #[test]
    fn test_normalize_base_drops_query_and_fragment() {
        let url = normalize_base("https://example.com/?utm=1#top").unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_page_origin() {
        let origin = page_origin("https://example.com/blog/post-1?x=1").unwrap();
        assert_eq!(origin.as_str(), "https://example.com/");

        let origin = page_origin("http://localhost:8080/about").unwrap();
        assert_eq!(origin.as_str(), "http://localhost:8080/");
    }

    #[test]
    fn test_content_endpoint() {
        let base = normalize_base("https://example.com").unwrap();
        let url = content_endpoint(&base, "pages", 100);
        assert_eq!(
            url.as_str(),
            "https://example.com/wp-json/wp/v2/pages?per_page=100&_fields=id%2Clink%2Ctitle%2Ccontent"
        );
    }

    #[test]
    fn test_content_endpoint_preserves_base_path() {
        let base = normalize_base("https://example.com/site/").unwrap();
        let url = content_endpoint(&base, "posts", 50);
        assert!(url.path().ends_with("/site/wp-json/wp/v2/posts"));
    }
}
