use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::Settings;
use crate::connection_manager::ConnectionManager;
use crate::push::{
    PushDispatcher, PushError, PushTransport, ReqwestTransport, SubscriptionRegistry, VapidSigner,
    WebPushSender,
};
use crate::shutdown::ShutdownSignal;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub connection_manager: Arc<ConnectionManager>,
    pub subscriptions: Arc<SubscriptionRegistry>,
    pub push: Arc<PushDispatcher>,
    pub shutdown: ShutdownSignal,
    pub start_time: Instant,
}

impl AppState {
    /// Build the state with the configured VAPID key and an HTTP push transport.
    pub fn new(settings: Settings) -> Result<Self, PushError> {
        let vapid = VapidSigner::from_config(&settings.vapid)?;
        let transport = ReqwestTransport::new(Duration::from_secs(settings.push.request_timeout))?;
        Ok(Self::with_transport(settings, vapid, Arc::new(transport)))
    }

    /// Build the state around an explicit signer and transport.
    pub fn with_transport(
        settings: Settings,
        vapid: VapidSigner,
        transport: Arc<dyn PushTransport>,
    ) -> Self {
        let connection_manager = Arc::new(ConnectionManager::new());
        let subscriptions = Arc::new(SubscriptionRegistry::new());
        let sender = WebPushSender::new(Arc::new(vapid), transport, settings.push.ttl);
        let push = Arc::new(PushDispatcher::new(subscriptions.clone(), sender));

        Self {
            settings: Arc::new(settings),
            connection_manager,
            subscriptions,
            push,
            shutdown: ShutdownSignal::new(),
            start_time: Instant::now(),
        }
    }
}
