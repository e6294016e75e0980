//! Error types for the `provider-auth` crate.
//!
//! Follows the same pattern as the web crate's error handling with a root Error struct and
//! error kind enums.

use std::error::Error as StdError;
use std::fmt;

/// Top-level error type for provider-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in provider-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    Config(ConfigErrorKind),
    OAuth(OAuthErrorKind),
    Http(HttpErrorKind),
}

/// Errors from building a provider configuration. Fatal at startup.
#[derive(Debug, PartialEq)]
pub enum ConfigErrorKind {
    /// A provider URL is not a well-formed absolute URL.
    InvalidUrl,
    /// A provider endpoint would be reached over plaintext HTTP.
    InsecureEndpoint,
    /// A required value was not supplied.
    Missing,
    /// A credential still holds a literal placeholder value.
    Placeholder,
    /// The state token lifetime is zero or too large to represent an expiry time.
    InvalidStateTtl,
}

/// Errors from talking to the OAuth provider.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// Transport failure or timeout.
    Network,
    /// The provider explicitly rejected the request.
    Provider { status: u16, body: String },
    /// The provider answered successfully but the payload was unusable.
    InvalidResponse,
    /// The provider reports the token as expired, revoked or malformed.
    InvalidToken,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
}

impl Error {
    /// Short, stable identifier for the error kind, safe to show to end users.
    pub fn kind_name(&self) -> &'static str {
        match &self.error_kind {
            ErrorKind::Config(_) => "config_error",
            ErrorKind::OAuth(OAuthErrorKind::Network) => "network_error",
            ErrorKind::OAuth(OAuthErrorKind::Provider { .. }) => "provider_error",
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse) => "provider_error",
            ErrorKind::OAuth(OAuthErrorKind::InvalidToken) => "invalid_token",
            ErrorKind::Http(_) => "internal_error",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::Config(kind) => write!(f, "Provider configuration error: {:?}", kind),
            ErrorKind::OAuth(OAuthErrorKind::Provider { status, .. }) => {
                write!(f, "OAuth error: provider rejected request with status {}", status)
            }
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else {
            ErrorKind::OAuth(OAuthErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::Network),
        }
    }
}

/// Helper function to create configuration errors.
pub fn config_error(kind: ConfigErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::Config(kind),
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_error_display_omits_body() {
        let err = oauth_error(
            OAuthErrorKind::Provider {
                status: 400,
                body: "{\"error\":\"invalid_grant\"}".to_string(),
            },
            "token endpoint rejected code",
        );
        let rendered = err.to_string();
        assert!(rendered.contains("400"));
        assert!(!rendered.contains("invalid_grant"));
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(
            oauth_error(OAuthErrorKind::InvalidToken, "").kind_name(),
            "invalid_token"
        );
        assert_eq!(
            oauth_error(OAuthErrorKind::Network, "").kind_name(),
            "network_error"
        );
        assert_eq!(
            config_error(ConfigErrorKind::InvalidUrl, "").kind_name(),
            "config_error"
        );
    }

    #[test]
    fn test_source_is_preserved() {
        let err = config_error(ConfigErrorKind::Missing, "client_id is required");
        let source = err.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("client_id is required"));
    }
}
