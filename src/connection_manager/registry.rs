use dashmap::DashMap;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use super::types::{ConnectionHandle, ConnectionStats, SendResult};
use crate::metrics::StreamMetrics;

/// Manages all open SSE connections
pub struct ConnectionManager {
    /// connection_id -> ConnectionHandle
    connections: DashMap<Uuid, Arc<ConnectionHandle>>,
    /// user_id -> Set<connection_id> (supports multiple tabs/devices)
    user_index: DashMap<String, HashSet<Uuid>>,
}

impl ConnectionManager {
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
            user_index: DashMap::new(),
        }
    }

    /// Register a new connection
    pub fn register(&self, user_id: String, sender: mpsc::Sender<String>) -> Arc<ConnectionHandle> {
        let handle = Arc::new(ConnectionHandle::new(user_id.clone(), sender));
        let conn_id = handle.id;

        self.connections.insert(conn_id, handle.clone());
        self.user_index.entry(user_id).or_default().insert(conn_id);

        tracing::info!(connection_id = %conn_id, user_id = %handle.user_id, "Connection registered");

        handle
    }

    /// Unregister a connection
    pub fn unregister(&self, connection_id: Uuid) {
        if let Some((_, handle)) = self.connections.remove(&connection_id) {
            if let Some(mut user_conns) = self.user_index.get_mut(&handle.user_id) {
                user_conns.remove(&connection_id);
                if user_conns.is_empty() {
                    drop(user_conns);
                    self.user_index
                        .remove_if(&handle.user_id, |_, conns| conns.is_empty());
                }
            }

            tracing::info!(connection_id = %connection_id, user_id = %handle.user_id, "Connection unregistered");
        }
    }

    /// Get all connections for a user
    pub fn get_user_connections(&self, user_id: &str) -> Vec<Arc<ConnectionHandle>> {
        self.user_index
            .get(user_id)
            .map(|conn_ids| {
                conn_ids
                    .iter()
                    .filter_map(|id| self.connections.get(id).map(|h| h.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Get connection by ID
    pub fn get_connection(&self, connection_id: Uuid) -> Option<Arc<ConnectionHandle>> {
        self.connections.get(&connection_id).map(|h| h.clone())
    }

    /// Send a text message to every connection of a user.
    ///
    /// Returns `None` when the user has no open connection. Connections whose
    /// stream has gone away are unregistered.
    #[tracing::instrument(name = "connections.send_to_user", skip(self, text))]
    pub async fn send_to_user(&self, user_id: &str, text: &str) -> Option<SendResult> {
        let connections = self.get_user_connections(user_id);
        if connections.is_empty() {
            return None;
        }

        let mut result = SendResult {
            delivered_to: 0,
            failed: 0,
        };

        for conn in connections {
            match conn.send(text.to_string()).await {
                Ok(()) => result.delivered_to += 1,
                Err(_) => {
                    tracing::warn!(connection_id = %conn.id, "Connection closed, dropping it");
                    result.failed += 1;
                    self.unregister(conn.id);
                }
            }
        }

        StreamMetrics::record_message(result.delivered_to, result.failed);
        Some(result)
    }

    /// Get statistics
    pub fn stats(&self) -> ConnectionStats {
        ConnectionStats {
            total_connections: self.connections.len(),
            unique_users: self.user_index.len(),
        }
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}
