//! Presence use cases: socket lifecycle bookkeeping.

pub mod service;

pub use service::PresenceService;
