//! Standards-based transport: browser push endpoints with VAPID
//! authentication and encrypted payloads, delegated to the web-push client.

use web_push::{
    ContentEncoding, HyperWebPushClient, SubscriptionInfo, VapidSignatureBuilder, WebPushClient,
    WebPushError, WebPushMessageBuilder, URL_SAFE_NO_PAD,
};

use async_trait::async_trait;

use samshoblo_core::push::PushSubscription;

use crate::config::VapidConfig;

use super::{DeliveryOutcome, PushDelivery};

/// Web push client signing with the configured VAPID key pair.
pub struct WebPushTransport {
    client: HyperWebPushClient,
    private_key: String,
    subject: String,
}

impl WebPushTransport {
    pub fn new(config: &VapidConfig) -> Self {
        Self {
            client: HyperWebPushClient::new(),
            private_key: config.private_key.clone(),
            subject: config.subject.clone(),
        }
    }
}

#[async_trait]
impl PushDelivery for WebPushTransport {
    /// Delivers one message to a standards-based endpoint.
    async fn send(
        &self,
        subscription: &PushSubscription,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> DeliveryOutcome {
        // Both key fields are required for payload encryption.
        let Some(keys) = &subscription.keys else {
            tracing::warn!(
                endpoint = %subscription.endpoint,
                "Subscription missing encryption keys, skipping"
            );
            return DeliveryOutcome::Skipped;
        };
        if keys.p256dh.is_empty() || keys.auth.is_empty() {
            tracing::warn!(
                endpoint = %subscription.endpoint,
                "Subscription has empty encryption keys, skipping"
            );
            return DeliveryOutcome::Skipped;
        }

        let info = SubscriptionInfo::new(&subscription.endpoint, &keys.p256dh, &keys.auth);
        let payload = build_payload(title, body, data).to_string();

        let signature = match VapidSignatureBuilder::from_base64(
            &self.private_key,
            URL_SAFE_NO_PAD,
            &info,
        ) {
            Ok(mut builder) => {
                builder.add_claim("sub", self.subject.clone());
                match builder.build() {
                    Ok(signature) => signature,
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to build VAPID signature");
                        return DeliveryOutcome::Failed;
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Invalid VAPID private key");
                return DeliveryOutcome::Failed;
            }
        };

        let mut builder = WebPushMessageBuilder::new(&info);
        builder.set_payload(ContentEncoding::Aes128Gcm, payload.as_bytes());
        builder.set_vapid_signature(signature);

        let message = match builder.build() {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(
                    endpoint = %subscription.endpoint,
                    error = %e,
                    "Failed to build web push message"
                );
                return DeliveryOutcome::Failed;
            }
        };

        match self.client.send(message).await {
            Ok(()) => {
                tracing::debug!(endpoint = %subscription.endpoint, "Web push delivered");
                DeliveryOutcome::Delivered
            }
            Err(e) if is_endpoint_gone(&e) => {
                tracing::warn!(
                    endpoint = %subscription.endpoint,
                    "Endpoint gone or unauthorized, pruning subscription"
                );
                DeliveryOutcome::Dropped
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %subscription.endpoint,
                    error = %e,
                    "Web push failed"
                );
                DeliveryOutcome::Failed
            }
        }
    }
}

/// Errors that mean the subscription can never be delivered to again.
fn is_endpoint_gone(error: &WebPushError) -> bool {
    matches!(
        error,
        WebPushError::EndpointNotValid
            | WebPushError::EndpointNotFound
            | WebPushError::Unauthorized
    )
}

/// The notification payload the service worker renders.
fn build_payload(title: &str, body: &str, data: &serde_json::Value) -> serde_json::Value {
    let mut merged = serde_json::Map::new();
    merged.insert(
        "url".to_string(),
        serde_json::Value::String("/admin-panel".to_string()),
    );
    if let Some(object) = data.as_object() {
        for (key, value) in object {
            merged.insert(key.clone(), value.clone());
        }
    }

    serde_json::json!({
        "title": title,
        "body": body,
        "data": merged,
        "icon": "/dancePic.jpg",
        "badge": "/dancePic.jpg",
        "vibrate": [200, 100, 200],
        "requireInteraction": true,
        "tag": "registration-notification",
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_merges_data_with_click_target() {
        let payload = build_payload(
            "New Registration",
            "Mariam Giorgadze",
            &serde_json::json!({"registrationId": "abc"}),
        );

        assert_eq!(payload["title"], "New Registration");
        assert_eq!(payload["data"]["url"], "/admin-panel");
        assert_eq!(payload["data"]["registrationId"], "abc");
        assert_eq!(payload["tag"], "registration-notification");
    }

    #[test]
    fn test_gone_endpoints_are_distinguished_from_transient_failures() {
        assert!(is_endpoint_gone(&WebPushError::EndpointNotValid));
        assert!(is_endpoint_gone(&WebPushError::EndpointNotFound));
        assert!(is_endpoint_gone(&WebPushError::Unauthorized));
        assert!(!is_endpoint_gone(&WebPushError::ServerError(None)));
    }
}
