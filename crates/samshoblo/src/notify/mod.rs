//! Push-notification fan-out.
//!
//! One dispatcher owns the process-wide subscription set and delivers each
//! event to every registered endpoint concurrently, over whichever
//! transport the endpoint's shape selects. Delivery is best-effort: errors
//! are logged, permanently invalid endpoints are pruned, and nothing here
//! can fail a registration.

mod dispatcher;
mod fcm;
mod webpush;

pub use dispatcher::{DeliveryOutcome, NotificationDispatcher, PushDelivery};
pub use fcm::FcmTransport;
pub use webpush::WebPushTransport;
