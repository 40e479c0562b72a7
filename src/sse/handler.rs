//! SSE handler implementation.

use std::convert::Infallible;
use std::time::{Duration, Instant};

use axum::{
    extract::{Query, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::Stream;
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use crate::api::normalize_user_id;
use crate::error::Result;
use crate::metrics::StreamMetrics;
use crate::server::AppState;

/// SSE event types
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type")]
pub enum SseEvent {
    /// Connection established
    #[serde(rename = "connected")]
    Connected {
        connection_id: String,
        user_id: String,
    },
}

/// Query parameters for SSE endpoint
#[derive(Debug, Deserialize)]
pub struct SseQuery {
    pub user_id: Option<String>,
}

/// `GET /sse?user_id=<id>`
#[tracing::instrument(name = "sse.connect", skip(state, query))]
pub async fn sse_handler(
    State(state): State<AppState>,
    Query(query): Query<SseQuery>,
) -> Result<Sse<impl Stream<Item = std::result::Result<Event, Infallible>>>> {
    let user_id = normalize_user_id(query.user_id.as_deref().unwrap_or_default())?;

    let (tx, rx) = mpsc::channel::<String>(state.settings.sse.channel_capacity.max(1));
    let handle = state.connection_manager.register(user_id.clone(), tx);
    StreamMetrics::record_opened();

    tracing::info!(connection_id = %handle.id, user_id = %user_id, "Client connected");

    let keep_alive = KeepAlive::new()
        .interval(Duration::from_secs(state.settings.sse.keep_alive_interval))
        .text(state.settings.sse.keep_alive_text.clone());

    let stream = create_sse_stream(rx, handle.id, user_id, state);

    Ok(Sse::new(stream).keep_alive(keep_alive))
}

/// Create the SSE event stream
fn create_sse_stream(
    rx: mpsc::Receiver<String>,
    connection_id: uuid::Uuid,
    user_id: String,
    state: AppState,
) -> impl Stream<Item = std::result::Result<Event, Infallible>> {
    let mut shutdown = state.shutdown.subscribe();

    let connected_event = SseEvent::Connected {
        connection_id: connection_id.to_string(),
        user_id: user_id.clone(),
    };
    let connected_json = serde_json::to_string(&connected_event).unwrap_or_default();

    // Dropped when the client goes away or the server shuts down
    let cleanup_guard = CleanupGuard {
        connection_id,
        user_id,
        state,
        connection_start: Instant::now(),
    };

    async_stream::stream! {
        // Named event: page `onmessage` handlers do not see it
        yield Ok(Event::default().event("connected").data(connected_json));

        let _guard = cleanup_guard;
        let mut messages = ReceiverStream::new(rx);

        loop {
            let next = tokio::select! {
                msg = messages.next() => msg,
                _ = shutdown.recv() => None,
            };

            match next {
                Some(text) => yield Ok(Event::default().data(text)),
                None => break,
            }
        }
    }
}

/// Guard that performs cleanup when dropped
struct CleanupGuard {
    connection_id: uuid::Uuid,
    user_id: String,
    state: AppState,
    connection_start: Instant,
}

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        let duration = self.connection_start.elapsed().as_secs_f64();
        StreamMetrics::record_closed(duration);

        tracing::info!(
            connection_id = %self.connection_id,
            user_id = %self.user_id,
            duration_secs = duration,
            "SSE connection closed"
        );

        self.state.connection_manager.unregister(self.connection_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sse_event_serialization() {
        let connected = SseEvent::Connected {
            connection_id: "test-123".to_string(),
            user_id: "alice".to_string(),
        };
        let json = serde_json::to_string(&connected).unwrap();
        assert!(json.contains(r#""type":"connected""#));
        assert!(json.contains(r#""connection_id":"test-123""#));
        assert!(json.contains(r#""user_id":"alice""#));
    }
}
