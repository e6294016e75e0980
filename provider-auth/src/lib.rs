//! # provider-auth
//!
//! Server side of the OAuth 2.0 authorization code flow against a single identity provider:
//! - Provider configuration with validated endpoints and secret credentials
//! - Single-use, expiring CSRF state tokens
//! - Authorization URL construction
//! - Callback validation with state verification ahead of any code use
//! - Authorization code exchange and bearer token resolution
//! - HTTP client building with middleware
//!
//! ## Usage
//!
//! ```rust,ignore
//! use provider_auth::{
//!     oauth::{AuthorizationRequestBuilder, CallbackHandler, StateTokenGuard, TokenExchanger},
//!     providers::ProviderConfig,
//!     http::ProviderClientBuilder,
//! };
//! ```

pub mod error;
pub mod http;
pub mod oauth;
pub mod providers;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
