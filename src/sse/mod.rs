//! Server-Sent Events stream of plain-text messages.
//!
//! # Endpoint
//!
//! `GET /sse?user_id=<id>`
//!
//! # Events
//!
//! - `connected` - named event sent once, JSON `{type, connection_id, user_id}`
//! - unnamed events - one per message posted to `/send`; `data` is the text
//! - keep-alive comments every `sse.keep_alive_interval` seconds
//!
//! The stream never closes from the server side except on shutdown. Clients
//! reconnect with the browser's default `EventSource` retry.

mod handler;

pub use handler::{sse_handler, SseEvent, SseQuery};
