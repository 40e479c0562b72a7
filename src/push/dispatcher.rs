use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;

use crate::metrics::PushMetrics;

use super::sender::{DeliveryOutcome, SendOptions, WebPushSender};
use super::{PushMessage, PushSubscription, SubscriptionRegistry};

/// Result for a single subscription
#[derive(Debug, Clone, Serialize)]
pub struct EndpointResult {
    pub endpoint: String,
    #[serde(flatten)]
    pub outcome: Option<DeliveryOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Result of pushing one message to every subscription of a user
#[derive(Debug, Clone, Serialize)]
pub struct PushReport {
    pub user_id: String,
    pub attempted: usize,
    pub delivered: usize,
    /// Subscriptions dropped because the push service reported them gone
    pub removed: usize,
    pub failed: usize,
    pub results: Vec<EndpointResult>,
}

#[derive(Debug, Default)]
pub struct PushStats {
    pub total_sent: AtomicU64,
    pub total_delivered: AtomicU64,
    pub total_removed: AtomicU64,
    pub total_failed: AtomicU64,
    pub client_failures: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushStatsSnapshot {
    pub total_sent: u64,
    pub total_delivered: u64,
    pub total_removed: u64,
    pub total_failed: u64,
    pub client_failures: u64,
}

impl PushStats {
    pub fn snapshot(&self) -> PushStatsSnapshot {
        PushStatsSnapshot {
            total_sent: self.total_sent.load(Ordering::Relaxed),
            total_delivered: self.total_delivered.load(Ordering::Relaxed),
            total_removed: self.total_removed.load(Ordering::Relaxed),
            total_failed: self.total_failed.load(Ordering::Relaxed),
            client_failures: self.client_failures.load(Ordering::Relaxed),
        }
    }
}

/// Fans a push message out to a user's subscriptions and prunes dead ones.
pub struct PushDispatcher {
    registry: Arc<SubscriptionRegistry>,
    sender: WebPushSender,
    stats: PushStats,
}

impl PushDispatcher {
    pub fn new(registry: Arc<SubscriptionRegistry>, sender: WebPushSender) -> Self {
        Self {
            registry,
            sender,
            stats: PushStats::default(),
        }
    }

    pub fn sender(&self) -> &WebPushSender {
        &self.sender
    }

    pub fn stats(&self) -> PushStatsSnapshot {
        self.stats.snapshot()
    }

    /// Count a failure reported by a background worker
    pub fn record_client_failure(&self) {
        self.stats.client_failures.fetch_add(1, Ordering::Relaxed);
        PushMetrics::record_client_failure();
    }

    /// Push `message` to every subscription of `user_id`.
    ///
    /// Returns `None` when the user has no subscriptions.
    #[tracing::instrument(name = "push.dispatch", skip(self, message, options))]
    pub async fn push_to_user(
        &self,
        user_id: &str,
        message: &PushMessage,
        options: SendOptions,
    ) -> Option<PushReport> {
        let subscriptions = self.registry.subscriptions(user_id);
        if subscriptions.is_empty() {
            return None;
        }

        self.stats.total_sent.fetch_add(1, Ordering::Relaxed);

        let mut pending: FuturesUnordered<_> = subscriptions
            .iter()
            .map(|sub| self.deliver_one(sub, message, options))
            .collect();

        let mut report = PushReport {
            user_id: user_id.to_string(),
            attempted: subscriptions.len(),
            delivered: 0,
            removed: 0,
            failed: 0,
            results: Vec::with_capacity(subscriptions.len()),
        };

        while let Some(result) = pending.next().await {
            match (&result.outcome, &result.error) {
                (Some(DeliveryOutcome::Delivered), _) => report.delivered += 1,
                (Some(DeliveryOutcome::Gone), _) => {
                    if self.registry.unregister(user_id, &result.endpoint) {
                        report.removed += 1;
                    }
                }
                _ => report.failed += 1,
            }
            report.results.push(result);
        }

        self.stats
            .total_delivered
            .fetch_add(report.delivered as u64, Ordering::Relaxed);
        self.stats
            .total_removed
            .fetch_add(report.removed as u64, Ordering::Relaxed);
        self.stats
            .total_failed
            .fetch_add(report.failed as u64, Ordering::Relaxed);

        tracing::info!(
            user_id = %user_id,
            attempted = report.attempted,
            delivered = report.delivered,
            removed = report.removed,
            failed = report.failed,
            "Push dispatched"
        );

        Some(report)
    }

    async fn deliver_one(
        &self,
        subscription: &PushSubscription,
        message: &PushMessage,
        options: SendOptions,
    ) -> EndpointResult {
        match self.sender.send(subscription, message, options).await {
            Ok(outcome) => {
                PushMetrics::record_outcome(&outcome);
                EndpointResult {
                    endpoint: subscription.endpoint.clone(),
                    outcome: Some(outcome),
                    error: None,
                }
            }
            Err(e) => {
                PushMetrics::record_error();
                tracing::warn!(endpoint = %subscription.endpoint, error = %e, "Push delivery failed");
                EndpointResult {
                    endpoint: subscription.endpoint.clone(),
                    outcome: None,
                    error: Some(e.to_string()),
                }
            }
        }
    }
}
