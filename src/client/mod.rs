//! Listener side of `/sse`: parse the event stream and keep a transcript of
//! the messages, the way the demo page does in its status element.

mod event_stream;
mod transcript;

pub use event_stream::{EventStreamParser, StreamEvent};
pub use transcript::Transcript;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid server URL {url}: {reason}")]
pub struct InvalidServerUrl {
    pub url: String,
    pub reason: String,
}

/// URL of the event stream for `user_id` on `server`
pub fn stream_url(server: &str, user_id: &str) -> Result<reqwest::Url, InvalidServerUrl> {
    let mut url = reqwest::Url::parse(server)
        .and_then(|base| base.join("sse"))
        .map_err(|e| InvalidServerUrl {
            url: server.to_string(),
            reason: e.to_string(),
        })?;
    url.query_pairs_mut().append_pair("user_id", user_id);
    Ok(url)
}
