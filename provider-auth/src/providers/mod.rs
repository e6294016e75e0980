//! Provider configuration and pre-defined endpoint sets.

mod config;

pub use config::{
    ProviderConfig, ProviderEndpoints, GOOGLE_AUTH_URL, GOOGLE_TOKEN_URL, GOOGLE_USERINFO_URL,
};
