//! Chat orchestration: the per-request decision pipeline.
//!
//! Branches are evaluated in order and the first match wins: wake phrase,
//! booking intent, then retrieval (with a one-shot auto-sync when the site
//! has no index yet). Every branch produces a reply; nothing here returns an
//! error to the caller. A failed auto-sync is logged and degrades to the
//! generic "still learning" reply.

use chrono::Utc;
use url::Url;

use crate::models::{Action, ChatMeta, ChatReply, ChatRequest, LogEntry, Source};
use crate::search;
use crate::sitekey::{normalize_domain, resolve_site_key};
use crate::state::AppState;
use crate::{intent, sync, urls};

/// Reply to the wake phrase.
pub const GREETING: &str = "How can I help you?";

const BOOKING_REPLY: &str = "Great, let's get you booked. Opening our booking page now.";
const BOOKING_UNCONFIGURED: &str =
    "I'd love to help you book, but online booking isn't set up for this site yet. \
     Please use the contact details on the website.";
const STILL_LEARNING: &str =
    "I'm still learning this website's content. Please try again in a moment, \
     or browse the site directly.";

const LOG_SESSION_CHARS: usize = 16;
const LOG_TEXT_CHARS: usize = 160;
const LOG_URL_CHARS: usize = 120;

/// Handles one chat message. The rate-limit gate has already run in the HTTP
/// layer; everything after it lives here.
pub async fn handle_chat(state: &AppState, req: &ChatRequest) -> ChatReply {
    let now = Utc::now();
    let site_key = resolve_site_key(req.domain.as_deref(), req.site_id.as_deref());

    state.push_log(LogEntry {
        ts: now,
        site_key: site_key.clone(),
        session_id: truncate(req.session_id.as_deref().unwrap_or(""), LOG_SESSION_CHARS),
        text: truncate(&req.text, LOG_TEXT_CHARS),
        page_url: truncate(req.page_url.as_deref().unwrap_or(""), LOG_URL_CHARS),
    });

    if intent::is_wake_phrase(&req.text) {
        return ChatReply::text(GREETING);
    }

    if intent::has_booking_intent(&req.text) {
        return match &req.booking_url {
            Some(url) if !url.trim().is_empty() => ChatReply {
                reply_text: BOOKING_REPLY.to_string(),
                actions: Some(vec![Action::OpenUrl {
                    url: url.trim().to_string(),
                }]),
                sources: None,
                meta: None,
            },
            _ => ChatReply::text(BOOKING_UNCONFIGURED),
        };
    }

    if unindexed(state, &site_key) && state.sync_allowed(&site_key, now) {
        if let Some(base) = resolve_base_url(req) {
            // Coalesce concurrent first-contact syncs for the same site:
            // whoever holds the guard fetches, everyone else waits and
            // re-checks.
            let guard = state.sync_guard(&site_key);
            let _held = guard.lock().await;
            if unindexed(state, &site_key) {
                if let Err(err) = sync::sync_site(state, &base, &site_key).await {
                    // The visitor never sees a raw fetch error
                    eprintln!("auto-sync failed for {}: {}", site_key, err);
                }
            }
        }
    }

    if let Some(index) = state.site_snapshot(&site_key) {
        let ranked = search::rank(&req.text, &index.documents, &state.config.retrieval);
        if !ranked.is_empty() {
            let top = ranked[0].document;
            let sources = ranked
                .iter()
                .map(|r| Source {
                    title: r.document.title.clone(),
                    url: r.document.url.clone(),
                })
                .collect();
            return ChatReply {
                reply_text: snippet(&top.body, state.config.retrieval.snippet_chars),
                actions: None,
                sources: Some(sources),
                meta: Some(ChatMeta {
                    learned: true,
                    site_key,
                    updated_at: Some(index.updated_at),
                    found: Some(ranked.len()),
                }),
            };
        }
    }

    ChatReply {
        reply_text: STILL_LEARNING.to_string(),
        actions: None,
        sources: None,
        meta: Some(ChatMeta {
            learned: false,
            site_key,
            updated_at: None,
            found: None,
        }),
    }
}

/// A site needs a sync when it has never synced or its last sync produced no
/// documents. An empty index still records a cooldown timestamp, so a site
/// whose pages all clean down to stubs is retried once per cooldown window
/// rather than on every message.
fn unindexed(state: &AppState, site_key: &str) -> bool {
    state
        .site_snapshot(site_key)
        .map_or(true, |index| index.documents.is_empty())
}

/// Best available base URL for a sync: explicit `siteUrl`, else the origin of
/// the page the widget is embedded on, else `https://` plus the domain.
fn resolve_base_url(req: &ChatRequest) -> Option<Url> {
    if let Some(site_url) = req.site_url.as_deref() {
        if let Some(url) = urls::normalize_base(site_url) {
            return Some(url);
        }
    }
    if let Some(page_url) = req.page_url.as_deref() {
        if let Some(url) = urls::page_origin(page_url) {
            return Some(url);
        }
    }
    if let Some(domain) = req.domain.as_deref() {
        let normalized = normalize_domain(domain);
        if !normalized.is_empty() {
            return urls::normalize_base(&format!("https://{}", normalized));
        }
    }
    None
}

/// First `max_chars` characters of a body, with an ellipsis when clipped.
fn snippet(body: &str, max_chars: usize) -> String {
    if body.chars().count() <= max_chars {
        body.to_string()
    } else {
        let mut s: String = body.chars().take(max_chars).collect();
        s.push('…');
        s
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.trim().chars().take(max_chars).collect()
}
