//! Core data models and HTTP payload types.
//!
//! The request/response structs mirror the JSON wire format used by the chat
//! widget (`camelCase` keys, optional fields omitted when absent).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One indexed page or post: cleaned text plus enough metadata to cite it.
#[derive(Debug, Clone)]
pub struct Document {
    /// Identifier assigned by the source CMS.
    pub source_id: u64,
    pub title: String,
    pub url: String,
    /// Plain text after HTML cleanup.
    pub body: String,
}

/// Everything known about one site's content. Replaced wholesale on each
/// sync so readers never observe a half-updated index.
#[derive(Debug, Clone)]
pub struct SiteIndex {
    pub documents: Vec<Document>,
    pub updated_at: DateTime<Utc>,
    pub base_url: String,
}

/// One entry in the debugging ring buffer of recent chat interactions.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub ts: DateTime<Utc>,
    pub site_key: String,
    pub session_id: String,
    pub text: String,
    pub page_url: String,
}

/// Body of `POST /v1/chat`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct ChatRequest {
    pub text: String,
    pub site_id: Option<String>,
    pub domain: Option<String>,
    pub session_id: Option<String>,
    pub booking_url: Option<String>,
    pub page_url: Option<String>,
    pub site_url: Option<String>,
}

/// Body of `POST /v1/chat` responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub reply_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<Action>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ChatMeta>,
}

impl ChatReply {
    /// A bare text reply with no actions, sources, or metadata.
    pub fn text(reply_text: impl Into<String>) -> ChatReply {
        ChatReply {
            reply_text: reply_text.into(),
            actions: None,
            sources: None,
            meta: None,
        }
    }
}

/// Client-side action attached to a reply.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Ask the widget to open a URL (booking redirect).
    OpenUrl { url: String },
}

/// A cited source document.
#[derive(Debug, Clone, Serialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Reply metadata consumed by the widget.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMeta {
    /// Whether the site has indexed content backing this reply.
    pub learned: bool,
    pub site_key: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub found: Option<usize>,
}

/// Body of `POST /v1/site/sync`.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct SyncRequest {
    pub site_url: Option<String>,
    pub site_id: Option<String>,
    pub domain: Option<String>,
}

/// Success body of `POST /v1/site/sync`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncResponse {
    pub ok: bool,
    pub site_key: String,
    pub count: usize,
    pub updated_at: DateTime<Utc>,
}

/// Per-site summary returned by `GET /v1/debug/sites`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSummary {
    pub site_key: String,
    pub count: usize,
    pub updated_at: DateTime<Utc>,
    pub base_url: String,
}
