//! Push-subscription types and transport classification.

mod types;

pub use types::{
    gateway_token, PushSubscription, SubscriptionKeys, Transport, MIN_GATEWAY_TOKEN_LEN,
};
