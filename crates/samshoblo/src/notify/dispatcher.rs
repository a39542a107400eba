use std::collections::HashMap;

use async_trait::async_trait;
use futures_util::future::join_all;
use tokio::sync::RwLock;

use samshoblo_core::push::{PushSubscription, Transport};

use super::{FcmTransport, WebPushTransport};

/// One way of delivering a notification to an endpoint. Both concrete
/// transports implement this; the dispatcher only sees the seam.
#[async_trait]
pub trait PushDelivery: Send + Sync {
    async fn send(
        &self,
        subscription: &PushSubscription,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> DeliveryOutcome;
}

/// Result of one delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    Delivered,
    /// Subscription unusable for structural reasons (missing keys, bad
    /// token, transport not configured); left in place.
    Skipped,
    /// Endpoint reported permanently invalid; prune the subscription.
    Dropped,
    /// Transient failure; logged, subscription kept.
    Failed,
}

/// Owns the subscription set and fans events out to every endpoint.
///
/// Subscriptions are keyed by endpoint URL: re-subscribing replaces the
/// stored entry. The set is process-local and cleared on restart.
pub struct NotificationDispatcher {
    subscriptions: RwLock<HashMap<String, PushSubscription>>,
    webpush: Option<Box<dyn PushDelivery>>,
    fcm: Option<Box<dyn PushDelivery>>,
}

impl NotificationDispatcher {
    pub fn new(webpush: Option<WebPushTransport>, fcm: Option<FcmTransport>) -> Self {
        Self::with_transports(
            webpush.map(|t| Box::new(t) as Box<dyn PushDelivery>),
            fcm.map(|t| Box::new(t) as Box<dyn PushDelivery>),
        )
    }

    fn with_transports(
        webpush: Option<Box<dyn PushDelivery>>,
        fcm: Option<Box<dyn PushDelivery>>,
    ) -> Self {
        Self {
            subscriptions: RwLock::new(HashMap::new()),
            webpush,
            fcm,
        }
    }

    /// Adds or replaces a subscription, returning the new set size.
    pub async fn subscribe(&self, subscription: PushSubscription) -> usize {
        let mut subscriptions = self.subscriptions.write().await;
        let replaced = subscriptions
            .insert(subscription.endpoint.clone(), subscription)
            .is_some();
        tracing::info!(
            total = subscriptions.len(),
            replaced,
            "Push subscription registered"
        );
        subscriptions.len()
    }

    /// Removes a subscription by endpoint, returning the new set size.
    pub async fn unsubscribe(&self, endpoint: &str) -> usize {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions.remove(endpoint);
        tracing::info!(total = subscriptions.len(), "Push subscription removed");
        subscriptions.len()
    }

    pub async fn count(&self) -> usize {
        self.subscriptions.read().await.len()
    }

    /// Delivers one event to every subscription, concurrently.
    ///
    /// Resolves only after every per-subscription attempt has completed;
    /// no delivery waits on another, so total latency is bounded by the
    /// slowest single attempt. Endpoints reported permanently invalid are
    /// removed afterwards.
    pub async fn send_to_all(&self, title: &str, body: &str, data: serde_json::Value) {
        let targets: Vec<PushSubscription> =
            self.subscriptions.read().await.values().cloned().collect();
        if targets.is_empty() {
            tracing::debug!("No active push subscriptions");
            return;
        }

        tracing::info!(count = targets.len(), "Dispatching push notification");

        let attempts = targets.iter().map(|sub| self.deliver(sub, title, body, &data));
        let outcomes = join_all(attempts).await;

        let stale: Vec<&str> = targets
            .iter()
            .zip(&outcomes)
            .filter(|(_, outcome)| **outcome == DeliveryOutcome::Dropped)
            .map(|(sub, _)| sub.endpoint.as_str())
            .collect();
        self.prune_stale(&stale).await;
    }

    /// Drops subscriptions whose endpoints were reported permanently
    /// invalid during a fan-out.
    async fn prune_stale(&self, endpoints: &[&str]) {
        if endpoints.is_empty() {
            return;
        }
        let mut subscriptions = self.subscriptions.write().await;
        for endpoint in endpoints {
            subscriptions.remove(*endpoint);
        }
        tracing::info!(
            remaining = subscriptions.len(),
            "Pruned permanently invalid push subscriptions"
        );
    }

    async fn deliver(
        &self,
        subscription: &PushSubscription,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> DeliveryOutcome {
        match Transport::classify(&subscription.endpoint) {
            Transport::GatewayToken => match &self.fcm {
                Some(fcm) => fcm.send(subscription, title, body, data).await,
                None => {
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        "Gateway push not configured, skipping"
                    );
                    DeliveryOutcome::Skipped
                }
            },
            Transport::WebPush => match &self.webpush {
                Some(webpush) => webpush.send(subscription, title, body, data).await,
                None => {
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        "Web push not configured, skipping"
                    );
                    DeliveryOutcome::Skipped
                }
            },
        }
    }
}
