//! Hence API request executor
//!
//! The one authenticated HTTP path every resource command shares: resolve a
//! bearer token through `hence_auth::TokenProvider`, send a JSON or
//! multipart request, and unwrap the API's `{data}` / `{error}` envelope.
//! Commands stay thin mappings from CLI arguments to these calls.

pub mod client;
pub mod error;

pub use client::{ApiClient, FilePart};
pub use error::{ApiError, Result};
