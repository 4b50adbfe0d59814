//! Hence authentication library
//!
//! Credential and token lifecycle for the Hence CLI. This crate is a
//! standalone library with no dependency on the `hence` binary — it can be
//! tested and used independently.
//!
//! Credential flow:
//! 1. `device::start_session()` registers a device with the API
//! 2. User opens the verification URL and enters the displayed code
//! 3. `device::poll_until_authorized()` exchanges the device code for tokens
//! 4. Tokens stored via `credentials::CredentialStore::save_credentials()`
//! 5. `token::TokenProvider::access_token()` serves every later API call,
//!    refreshing transparently and falling back to the legacy token file
//!    (a static API key, e.g. for CI) when no structured credentials work.

pub mod constants;
pub mod credentials;
pub mod device;
pub mod error;
pub mod secret;
pub mod settings;
pub mod token;

pub use constants::*;
pub use credentials::{CredentialRecord, CredentialStore};
pub use device::{DeviceSession, FlowState, PollOutcome};
pub use error::{Error, Result};
pub use secret::Secret;
pub use settings::Settings;
pub use token::{RefreshResponse, TokenProvider, refresh_access_token};
