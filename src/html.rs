//! HTML-to-text cleanup for fetched content.
//!
//! WordPress returns `content.rendered` as HTML. Retrieval scores against
//! plain text, so markup is stripped here at index time. The cleanup is
//! best-effort on malformed input: worst case tags survive imperfectly
//! stripped, but the function always returns a string and never leaves a `<`
//! in the output.

use regex::Regex;
use std::sync::OnceLock;

fn script_style_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<(script|style)\b[^>]*>.*?</(script|style)\s*>").unwrap()
    })
}

fn comment_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<!--.*?-->").unwrap())
}

fn break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)</p\s*>|<br\s*/?\s*>").unwrap())
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]*>").unwrap())
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

/// Strips markup from an HTML fragment, returning trimmed plain text with
/// whitespace runs collapsed to single spaces.
pub fn clean_html(raw: &str) -> String {
    let text = script_style_re().replace_all(raw, " ");
    let text = comment_re().replace_all(&text, " ");
    // Paragraph and line breaks become whitespace so words don't fuse
    let text = break_re().replace_all(&text, "\n");
    let text = tag_re().replace_all(&text, " ");
    // Unterminated tags can leave a bare '<' behind; drop it
    let text = text.replace('<', " ");
    let text = decode_entities(&text);
    whitespace_re().replace_all(&text, " ").trim().to_string()
}

/// Decodes the handful of entities WordPress content actually contains.
/// `&amp;` goes last so `&amp;nbsp;` does not double-decode.
fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#039;", "'")
        .replace("&#8217;", "'")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_markup_stripped() {
        assert_eq!(
            clean_html("<h1>Welcome</h1><p>Hello <b>world</b></p>"),
            "Welcome Hello world"
        );
    }

    #[test]
    fn test_script_and_style_content_removed() {
        let html = "<p>Before</p><script>var secret = 1;</script><style>.x{color:red}</style>After";
        let cleaned = clean_html(html);
        assert!(!cleaned.contains("secret"));
        assert!(!cleaned.contains("color"));
        assert_eq!(cleaned, "Before After");
    }

    #[test]
    fn test_breaks_become_separators() {
        assert_eq!(clean_html("one<br>two<br/>three</p>four"), "one two three four");
    }

    #[test]
    fn test_whitespace_collapsed_and_trimmed() {
        assert_eq!(clean_html("  a \n\n  b\t c  "), "a b c");
    }

    #[test]
    fn test_entities_decoded() {
        assert_eq!(clean_html("fish&nbsp;&amp;&nbsp;chips"), "fish & chips");
        assert_eq!(clean_html("it&#8217;s &quot;fine&quot;"), "it's \"fine\"");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(clean_html(""), "");
    }

    #[test]
    fn test_malformed_markup_never_leaves_angle_bracket() {
        for raw in [
            "<p>unclosed",
            "broken < tag soup > here",
            "<script>never ends",
            "<<<>>>",
            "<a href='x' <b>nested</b>",
        ] {
            let cleaned = clean_html(raw);
            assert!(!cleaned.contains('<'), "'<' survived in {:?} -> {:?}", raw, cleaned);
        }
    }

    #[test]
    fn test_comments_removed() {
        assert_eq!(clean_html("a<!-- hidden -->b"), "a b");
    }
}
