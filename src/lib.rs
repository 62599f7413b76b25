//! # sitechat
//!
//! A small website chat-assistant backend. A widget embedded on a customer's
//! site posts visitor messages here; the service detects booking intent with
//! keyword heuristics, pulls the site's published pages and posts from its
//! WordPress REST API, indexes them with a naive keyword scorer, and answers
//! with a best-effort snippet plus source citations.
//!
//! ## Request pipeline
//!
//! ```text
//! POST /v1/chat
//!   → rate limiter (fixed window per client)
//!   → site key resolution
//!   → intent classification (wake phrase / booking short-circuit)
//!   → auto-sync on first contact (throttled, coalesced per site)
//!   → keyword retrieval over the in-memory index
//!   → reply assembly (snippet + sources, or "still learning")
//! ```
//!
//! All state is in-memory and lost on restart; a site's index is re-fetched
//! on the next chat message that needs it.
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Core data types and wire payloads |
//! | [`sitekey`] | Per-site state partitioning key |
//! | [`html`] | HTML-to-text cleanup |
//! | [`intent`] | Wake phrase and booking intent heuristics |
//! | [`sync`] | WordPress content fetch and index replacement |
//! | [`search`] | Keyword retrieval scoring |
//! | [`ratelimit`] | Fixed-window request limiting |
//! | [`chat`] | Per-request orchestration |
//! | [`state`] | Shared in-memory application state |
//! | [`server`] | Axum HTTP server |
//! | [`urls`] | Typed base URL and endpoint construction |

pub mod chat;
pub mod config;
pub mod html;
pub mod intent;
pub mod models;
pub mod ratelimit;
pub mod search;
pub mod server;
pub mod sitekey;
pub mod state;
pub mod sync;
pub mod urls;
