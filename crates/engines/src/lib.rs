//! Reasoning-engine clients for Wardline.
//!
//! One implementation of the `wardline_core::Engine` trait: an
//! OpenAI-compatible HTTP client. Anything exposing `/v1/chat/completions`
//! (OpenAI, Gemini's compat layer, Ollama, vLLM) works unchanged.

pub mod http;

pub use http::HttpEngine;
