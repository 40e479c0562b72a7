use dashmap::DashMap;
use serde::Serialize;

use super::PushSubscription;

/// Result of registering a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    /// False when an existing subscription with the same endpoint was replaced
    pub created: bool,
    /// Subscriptions now held for the user
    pub subscriptions: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionStats {
    pub users: usize,
    pub subscriptions: usize,
}

/// In-memory push subscriptions, keyed by user id. An endpoint belongs to at
/// most one user: registering it again under another user moves it.
pub struct SubscriptionRegistry {
    by_user: DashMap<String, Vec<PushSubscription>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            by_user: DashMap::new(),
        }
    }

    pub fn register(&self, user_id: &str, subscription: PushSubscription) -> Registration {
        let previous_owners: Vec<String> = self
            .by_user
            .iter()
            .filter(|e| {
                e.key() != user_id && e.value().iter().any(|s| s.endpoint == subscription.endpoint)
            })
            .map(|e| e.key().clone())
            .collect();
        for previous in previous_owners {
            self.unregister(&previous, &subscription.endpoint);
            tracing::info!(from = %previous, to = %user_id, "Push endpoint moved to another user");
        }

        let mut entry = self.by_user.entry(user_id.to_string()).or_default();
        let created = match entry.iter_mut().find(|s| s.endpoint == subscription.endpoint) {
            Some(existing) => {
                *existing = subscription;
                false
            }
            None => {
                entry.push(subscription);
                true
            }
        };

        tracing::info!(user_id = %user_id, created, total = entry.len(), "Push subscription registered");

        Registration {
            created,
            subscriptions: entry.len(),
        }
    }

    /// Remove one endpoint; returns whether it was present.
    pub fn unregister(&self, user_id: &str, endpoint: &str) -> bool {
        let removed = match self.by_user.get_mut(user_id) {
            Some(mut subs) => {
                let before = subs.len();
                subs.retain(|s| s.endpoint != endpoint);
                before != subs.len()
            }
            None => false,
        };

        self.by_user.remove_if(user_id, |_, subs| subs.is_empty());

        if removed {
            tracing::info!(user_id = %user_id, endpoint = %endpoint, "Push subscription removed");
        }
        removed
    }

    pub fn subscriptions(&self, user_id: &str) -> Vec<PushSubscription> {
        self.by_user
            .get(user_id)
            .map(|subs| subs.clone())
            .unwrap_or_default()
    }

    pub fn stats(&self) -> SubscriptionStats {
        SubscriptionStats {
            users: self.by_user.len(),
            subscriptions: self.by_user.iter().map(|e| e.value().len()).sum(),
        }
    }
}

impl Default for SubscriptionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(endpoint: &str) -> PushSubscription {
        PushSubscription::new(endpoint, "p256dh", "auth")
    }

    #[test]
    fn test_register_dedups_by_endpoint() {
        let registry = SubscriptionRegistry::new();

        let first = registry.register("alice", sub("https://push.example/a"));
        assert_eq!(first, Registration { created: true, subscriptions: 1 });

        let again = registry.register("alice", sub("https://push.example/a"));
        assert_eq!(again, Registration { created: false, subscriptions: 1 });

        let second_device = registry.register("alice", sub("https://push.example/b"));
        assert_eq!(second_device.subscriptions, 2);

        let stats = registry.stats();
        assert_eq!(stats.users, 1);
        assert_eq!(stats.subscriptions, 2);
    }

    #[test]
    fn test_register_moves_endpoint_between_users() {
        let registry = SubscriptionRegistry::new();
        registry.register("alice", sub("https://push.example/shared"));
        registry.register("alice", sub("https://push.example/own"));

        let moved = registry.register("carol", sub("https://push.example/shared"));
        assert_eq!(moved, Registration { created: true, subscriptions: 1 });

        let alice: Vec<_> = registry
            .subscriptions("alice")
            .into_iter()
            .map(|s| s.endpoint)
            .collect();
        assert_eq!(alice, vec!["https://push.example/own"]);
        assert_eq!(registry.stats().subscriptions, 2);

        // Last endpoint moving away drops the user entirely
        registry.register("carol", sub("https://push.example/own"));
        assert_eq!(registry.stats().users, 1);
    }

    #[test]
    fn test_unregister_drops_empty_users() {
        let registry = SubscriptionRegistry::new();
        registry.register("bob", sub("https://push.example/x"));

        assert!(!registry.unregister("bob", "https://push.example/other"));
        assert!(registry.unregister("bob", "https://push.example/x"));
        assert!(registry.subscriptions("bob").is_empty());
        assert_eq!(registry.stats().users, 0);
        assert!(!registry.unregister("nobody", "https://push.example/x"));
    }
}
