//! HTTP layer — a thin JSON client with per-request retry policies.
//!
//! Challenge requests are idempotent GETs and may be retried with backoff;
//! challenge submission is a POST and is never retried by this layer.

pub mod retry;

#[cfg(feature = "http")]
pub mod client;

#[cfg(feature = "http")]
pub use client::HttpClient;
pub use retry::{RetryConfig, RetryPolicy};
