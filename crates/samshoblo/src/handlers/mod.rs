pub mod admin;
pub mod health;
pub mod keep_alive;
pub mod notifications;
pub mod register;
pub mod stats;
