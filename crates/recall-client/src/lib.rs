//! recall-client - REST client for the memory/retrieval store.
//!
//! Implements the `MemoryStore` trait from recall-core against the
//! store's HTTP API: conversation search and storage, user profile
//! lookup, incorrect-attempt history, and a health probe.

mod client;

pub use client::MemoryClient;
