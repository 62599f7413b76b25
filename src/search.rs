//! Keyword retrieval over a site's indexed documents.
//!
//! Deliberately coarse scoring: whitespace tokens, a substring test per
//! token, fixed points per hit. No TF-IDF, no stemming, no phrase matching.
//! Good enough to pick the page a visitor is asking about; cheap enough to
//! run on every chat message.

use crate::config::RetrievalConfig;
use crate::models::Document;

/// A document together with its relevance score for one query.
#[derive(Debug)]
pub struct Ranked<'a> {
    pub document: &'a Document,
    pub score: u32,
}

/// Returns the top-K documents matching `query`, best first.
///
/// Tokens are lowercased with trailing punctuation stripped; those shorter
/// than the configured minimum are ignored. Each remaining token that occurs
/// as a substring of a document's lowercased body adds a fixed number of
/// points. Zero-score documents are excluded. The sort is stable, so ties
/// keep original index order.
pub fn rank<'a>(
    query: &str,
    documents: &'a [Document],
    config: &RetrievalConfig,
) -> Vec<Ranked<'a>> {
    let tokens: Vec<String> = query
        .split_whitespace()
        .map(|t| t.trim_end_matches(['?', '.', '!', ',', ';', ':']).to_lowercase())
        .filter(|t| t.chars().count() >= config.min_token_len)
        .collect();

    if tokens.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<Ranked<'a>> = documents
        .iter()
        .filter_map(|doc| {
            let body = doc.body.to_lowercase();
            let score: u32 = tokens
                .iter()
                .map(|t| if body.contains(t.as_str()) { config.match_points } else { 0 })
                .sum();
            (score > 0).then_some(Ranked { document: doc, score })
        })
        .collect();

    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    ranked.truncate(config.top_k);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: u64, body: &str) -> Document {
        Document {
            source_id: id,
            title: format!("Doc {}", id),
            url: format!("https://example.com/{}", id),
            body: body.to_string(),
        }
    }

    fn config() -> RetrievalConfig {
        RetrievalConfig::default()
    }

    #[test]
    fn test_matching_documents_ranked_first() {
        let docs = vec![
            doc(1, "We offer plumbing and heating services."),
            doc(2, "Our opening hours and contact details."),
            doc(3, "Emergency plumbing available around the clock."),
        ];
        let results = rank("plumbing emergency", &docs, &config());
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].document.source_id, 3);
        assert_eq!(results[0].score, 4);
        assert_eq!(results[1].document.source_id, 1);
        assert_eq!(results[1].score, 2);
    }

    #[test]
    fn test_zero_score_documents_excluded() {
        let docs = vec![doc(1, "nothing relevant here")];
        assert!(rank("plumbing", &docs, &config()).is_empty());
    }

    #[test]
    fn test_short_tokens_ignored() {
        let docs = vec![doc(1, "an ox and a fox")];
        // "ox" is under the 3-char minimum, "a" too
        assert!(rank("ox a is", &docs, &config()).is_empty());
        assert_eq!(rank("fox", &docs, &config()).len(), 1);
    }

    #[test]
    fn test_trailing_punctuation_stripped_from_tokens() {
        let docs = vec![doc(1, "We provide roofing and gutter repair across the region.")];
        let results = rank("do you do roofing?", &docs, &config());
        assert_eq!(results.len(), 1);
        // Stripping applies before the length filter: "no," reduces to "no"
        // and drops below the 3-char minimum
        assert!(rank("no, nothing", &docs, &config()).is_empty());
    }

    #[test]
    fn test_case_insensitive_matching() {
        let docs = vec![doc(1, "Plumbing Services")];
        assert_eq!(rank("PLUMBING", &docs, &config()).len(), 1);
    }

    #[test]
    fn test_monotonic_extra_keyword_never_hurts() {
        let without = doc(1, "general home maintenance advice");
        let with = doc(2, "general home maintenance advice and roofing");
        let docs = vec![without, with];
        let results = rank("maintenance roofing", &docs, &config());
        assert_eq!(results[0].document.source_id, 2);
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn test_ties_keep_original_order() {
        let docs = vec![
            doc(1, "roofing quote"),
            doc(2, "roofing gallery"),
            doc(3, "roofing team"),
        ];
        let results = rank("roofing", &docs, &config());
        let ids: Vec<u64> = results.iter().map(|r| r.document.source_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_top_k_limit() {
        let docs: Vec<Document> = (0..10).map(|i| doc(i, "roofing roofing")).collect();
        assert_eq!(rank("roofing", &docs, &config()).len(), 3);
    }

    #[test]
    fn test_empty_query_or_index() {
        assert!(rank("", &[doc(1, "text")], &config()).is_empty());
        assert!(rank("roofing", &[], &config()).is_empty());
    }
}
