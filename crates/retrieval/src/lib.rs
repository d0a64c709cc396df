//! Search backends for Wardline.
//!
//! Both implement `wardline_core::SearchBackend`:
//! - [`MemoryIndex`] — a seeded keyword index, one per domain, so the whole
//!   system runs and demos without any external retrieval service;
//! - [`HttpSearchBackend`] — a client for a remote search endpoint, used
//!   when a real document store is deployed.

pub mod http;
pub mod memory;

pub use http::HttpSearchBackend;
pub use memory::MemoryIndex;
