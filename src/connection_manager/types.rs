//! Connection handle and related types

use serde::Serialize;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Handle for a single SSE connection
pub struct ConnectionHandle {
    pub id: Uuid,
    pub user_id: String,
    pub sender: mpsc::Sender<String>,
}

impl ConnectionHandle {
    pub fn new(user_id: String, sender: mpsc::Sender<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id,
            sender,
        }
    }

    /// Queue a text message; waits while the connection buffer is full
    pub async fn send(&self, text: String) -> Result<(), mpsc::error::SendError<String>> {
        self.sender.send(text).await
    }
}

/// Connection statistics
#[derive(Debug, Clone, Serialize)]
pub struct ConnectionStats {
    pub total_connections: usize,
    pub unique_users: usize,
}

/// Result of sending one message to a user's connections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SendResult {
    pub delivered_to: usize,
    pub failed: usize,
}
