//! Gateway-token transport: FCM v1 delivery for endpoints that embed an
//! opaque device token.

use anyhow::Context;
use async_trait::async_trait;
use yup_oauth2::{authenticator::Authenticator, ServiceAccountAuthenticator, ServiceAccountKey};

use samshoblo_core::push::{gateway_token, PushSubscription};

use crate::config::FcmConfig;

use super::{DeliveryOutcome, PushDelivery};

const FCM_SCOPES: &[&str] = &["https://www.googleapis.com/auth/firebase.messaging"];
const OAUTH_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

/// FCM v1 client authenticated with a service account.
pub struct FcmTransport {
    auth: Authenticator<yup_oauth2::hyper_rustls::HttpsConnector<hyper::client::HttpConnector>>,
    http: reqwest::Client,
    project_id: String,
}

impl FcmTransport {
    /// Builds the OAuth2 authenticator from the configured service-account
    /// credentials.
    pub async fn new(config: &FcmConfig) -> anyhow::Result<Self> {
        let key = ServiceAccountKey {
            key_type: Some("service_account".to_string()),
            project_id: Some(config.project_id.clone()),
            private_key_id: None,
            private_key: config.private_key.clone(),
            client_email: config.client_email.clone(),
            client_id: None,
            auth_uri: None,
            token_uri: OAUTH_TOKEN_URI.to_string(),
            auth_provider_x509_cert_url: None,
            client_x509_cert_url: None,
        };

        let auth = ServiceAccountAuthenticator::builder(key)
            .build()
            .await
            .context("service account authenticator")?;

        Ok(Self {
            auth,
            http: reqwest::Client::new(),
            project_id: config.project_id.clone(),
        })
    }

    async fn auth_header(&self) -> anyhow::Result<String> {
        let token = self.auth.token(FCM_SCOPES).await?;
        let t = token.token().context("token empty")?;
        Ok(format!("Bearer {t}"))
    }
}

#[async_trait]
impl PushDelivery for FcmTransport {
    /// Delivers one message to a gateway-token endpoint.
    async fn send(
        &self,
        subscription: &PushSubscription,
        title: &str,
        body: &str,
        data: &serde_json::Value,
    ) -> DeliveryOutcome {
        let Some(token) = gateway_token(&subscription.endpoint) else {
            tracing::warn!(
                endpoint = %subscription.endpoint,
                "Invalid gateway token in endpoint, skipping"
            );
            return DeliveryOutcome::Skipped;
        };

        let message = build_message(token, title, body, data);

        let header = match self.auth_header().await {
            Ok(header) => header,
            Err(e) => {
                tracing::error!(error = %e, "Failed to obtain gateway access token");
                return DeliveryOutcome::Failed;
            }
        };

        let url = format!(
            "https://fcm.googleapis.com/v1/projects/{}/messages:send",
            self.project_id
        );

        let response = self
            .http
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, header)
            .json(&serde_json::json!({ "message": message }))
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(endpoint = %subscription.endpoint, "Gateway push delivered");
                DeliveryOutcome::Delivered
            }
            Ok(resp) => {
                let status = resp.status();
                let text = resp.text().await.unwrap_or_default();
                if is_permanent_failure(status, &text) {
                    tracing::warn!(
                        endpoint = %subscription.endpoint,
                        %status,
                        "Gateway token permanently invalid, pruning subscription"
                    );
                    DeliveryOutcome::Dropped
                } else {
                    tracing::error!(
                        endpoint = %subscription.endpoint,
                        %status,
                        response = %text,
                        "Gateway push failed"
                    );
                    DeliveryOutcome::Failed
                }
            }
            Err(e) => {
                tracing::error!(endpoint = %subscription.endpoint, error = %e, "Gateway push failed");
                DeliveryOutcome::Failed
            }
        }
    }
}

/// Token errors that mean the device registration is gone for good.
fn is_permanent_failure(status: reqwest::StatusCode, body: &str) -> bool {
    status == reqwest::StatusCode::NOT_FOUND
        || body.contains("UNREGISTERED")
        || body.contains("INVALID_ARGUMENT")
}

/// FCM v1 message with the platform-specific delivery hints the admin
/// clients expect: click target, icon, APNs badge/sound, webpush actions.
fn build_message(
    token: &str,
    title: &str,
    body: &str,
    data: &serde_json::Value,
) -> serde_json::Value {
    serde_json::json!({
        "token": token,
        "notification": {
            "title": title,
            "body": body,
        },
        "data": stringify_data(data),
        "android": {
            "notification": {
                "click_action": "FLUTTER_NOTIFICATION_CLICK",
                "icon": "/dancePic.jpg",
                "color": "#FF6B6B",
            },
        },
        "apns": {
            "payload": {
                "aps": {
                    "badge": 1,
                    "sound": "default",
                    "category": "REGISTRATION_NOTIFICATION",
                },
            },
        },
        "webpush": {
            "notification": {
                "icon": "/dancePic.jpg",
                "badge": "/dancePic.jpg",
                "vibrate": [200, 100, 200],
                "requireInteraction": true,
                "tag": "registration-notification",
            },
        },
    })
}

/// FCM's `data` field only carries string values; everything else is
/// serialized in place. The click target rides along for the clients.
fn stringify_data(data: &serde_json::Value) -> serde_json::Value {
    let mut map = serde_json::Map::new();
    map.insert(
        "url".to_string(),
        serde_json::Value::String("/admin-panel".to_string()),
    );
    if let Some(object) = data.as_object() {
        for (key, value) in object {
            let text = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            map.insert(key.clone(), serde_json::Value::String(text));
        }
    }
    serde_json::Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_carries_token_and_notification() {
        let message = build_message(
            "device-token-123",
            "New Registration",
            "Mariam Giorgadze",
            &serde_json::json!({"registrationId": "abc"}),
        );

        assert_eq!(message["token"], "device-token-123");
        assert_eq!(message["notification"]["title"], "New Registration");
        assert_eq!(message["data"]["registrationId"], "abc");
        assert_eq!(message["data"]["url"], "/admin-panel");
    }

    #[test]
    fn test_data_values_are_stringified() {
        let data = serde_json::json!({"childAge": 12, "nested": {"a": 1}});
        let stringified = stringify_data(&data);

        assert_eq!(stringified["childAge"], "12");
        assert_eq!(stringified["nested"], "{\"a\":1}");
    }

    #[test]
    fn test_permanent_failure_detection() {
        use reqwest::StatusCode;

        assert!(is_permanent_failure(StatusCode::NOT_FOUND, ""));
        assert!(is_permanent_failure(
            StatusCode::BAD_REQUEST,
            r#"{"error":{"details":[{"errorCode":"UNREGISTERED"}]}}"#
        ));
        assert!(!is_permanent_failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            "backend unavailable"
        ));
    }
}
