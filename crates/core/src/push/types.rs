use serde::{Deserialize, Serialize};

/// Shortest opaque device token the gateway transport will accept.
pub const MIN_GATEWAY_TOKEN_LEN: usize = 10;

/// One notification endpoint, as submitted by a client opting in.
///
/// The endpoint URL is the unique key; re-subscribing with the same endpoint
/// replaces the stored entry. Key material is only meaningful for the
/// standards-based web push transport and may be absent for gateway tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushSubscription {
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<SubscriptionKeys>,
}

/// Encryption key material for standards-based web push, base64-encoded as
/// delivered by the browser's subscription JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionKeys {
    pub p256dh: String,
    pub auth: String,
}

/// How a subscription endpoint gets delivered to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// The endpoint embeds an opaque device token for the push gateway.
    GatewayToken,
    /// Generic push URL with associated encryption key material.
    WebPush,
}

impl Transport {
    /// Classifies an endpoint by its shape.
    pub fn classify(endpoint: &str) -> Self {
        if endpoint.contains("/fcm/send/") {
            Transport::GatewayToken
        } else {
            Transport::WebPush
        }
    }
}

/// Extracts the gateway device token (the last path segment of the
/// endpoint), rejecting tokens shorter than the minimum length.
pub fn gateway_token(endpoint: &str) -> Option<&str> {
    let token = endpoint.trim_end_matches('/').rsplit('/').next()?;
    (token.len() >= MIN_GATEWAY_TOKEN_LEN).then_some(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_fcm_endpoint_as_gateway() {
        let endpoint = "https://fcm.googleapis.com/fcm/send/dLkzXBcoTAk:APA91bE";
        assert_eq!(Transport::classify(endpoint), Transport::GatewayToken);
    }

    #[test]
    fn test_classify_generic_endpoint_as_web_push() {
        let endpoint = "https://updates.push.services.mozilla.com/wpush/v2/gAAAA";
        assert_eq!(Transport::classify(endpoint), Transport::WebPush);
    }

    #[test]
    fn test_gateway_token_extracts_last_path_segment() {
        let endpoint = "https://fcm.googleapis.com/fcm/send/dLkzXBcoTAk:APA91bE";
        assert_eq!(gateway_token(endpoint), Some("dLkzXBcoTAk:APA91bE"));
    }

    #[test]
    fn test_gateway_token_rejects_short_tokens() {
        assert_eq!(gateway_token("https://fcm.googleapis.com/fcm/send/abc"), None);
    }

    #[test]
    fn test_subscription_deserializes_without_keys() {
        let sub: PushSubscription = serde_json::from_str(
            r#"{"endpoint": "https://fcm.googleapis.com/fcm/send/sometoken123"}"#,
        )
        .unwrap();

        assert!(sub.keys.is_none());
    }

    #[test]
    fn test_subscription_roundtrips_keys() {
        let sub: PushSubscription = serde_json::from_str(
            r#"{"endpoint": "https://e.example/p", "keys": {"p256dh": "BKey", "auth": "AKey"}}"#,
        )
        .unwrap();

        let keys = sub.keys.unwrap();
        assert_eq!(keys.p256dh, "BKey");
        assert_eq!(keys.auth, "AKey");
    }
}
