//! Core domain logic for the samshoblo registration service.
//!
//! This crate contains the pure, I/O-free parts of the system: the
//! registration model and its duplicate/eviction rules, the storage
//! backend trait, push-subscription types with transport classification,
//! and the admin access gate. Concrete backends and the HTTP surface
//! live in the `samshoblo` binary crate.

pub mod auth;
pub mod push;
pub mod registration;
pub mod storage;
