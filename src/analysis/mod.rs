//! Analysis modules.
//!
//! Pure transforms from fetched findings to dashboard views.

pub mod insights;

pub use insights::*;
