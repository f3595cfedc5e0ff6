//! Resilient access to the findings backend.
//!
//! `base_url` decides where the backend lives; `api` issues the bounded
//! requests against it.

pub mod api;
pub mod base_url;

pub use api::{ApiClient, ClientConfig, DEFAULT_FINDINGS_LIMIT, REQUEST_TIMEOUT};
pub use base_url::{build_time_base_url, resolve_base_url, RuntimeContext, DEFAULT_ORIGIN};
