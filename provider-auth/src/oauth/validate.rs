//! Bearer token resolution against the provider's identity endpoint.

use std::sync::Arc;

use log::*;
use reqwest::StatusCode;
use serde_json::Value;

use super::IdentityClaims;
use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind};
use crate::http::ProviderClient;
use crate::providers::ProviderConfig;

/// Resolves bearer tokens into identity claims.
///
/// Resolution is read-only and idempotent, so the HTTP client may carry retry middleware.
pub struct TokenValidator {
    config: Arc<ProviderConfig>,
    http_client: ProviderClient,
}

impl TokenValidator {
    pub fn new(config: Arc<ProviderConfig>, http_client: ProviderClient) -> Self {
        Self {
            config,
            http_client,
        }
    }

    /// Resolve a bearer token into the identity claims the provider holds for it.
    ///
    /// # Errors
    ///
    /// * `InvalidToken` - the provider reports the token expired, revoked or malformed
    /// * `Network` - the provider could not be reached
    /// * `Provider` - any other rejection by the provider
    /// * `InvalidResponse` - the provider answered with something other than a JSON object
    pub async fn resolve(&self, token: &str) -> Result<IdentityClaims, Error> {
        if token.trim().is_empty() {
            return Err(oauth_error(OAuthErrorKind::InvalidToken, "empty bearer token"));
        }

        let response = self
            .http_client
            .get(self.config.userinfo_endpoint().clone())
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach OAuth userinfo endpoint: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::OAuth(OAuthErrorKind::Network),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            debug!("OAuth userinfo error body: {}", body);

            return Err(match status {
                StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                    info!("OAuth provider rejected bearer token: {}", status);
                    oauth_error(OAuthErrorKind::InvalidToken, "provider rejected bearer token")
                }
                _ => {
                    warn!("OAuth userinfo endpoint error: {}", status);
                    oauth_error(
                        OAuthErrorKind::Provider {
                            status: status.as_u16(),
                            body,
                        },
                        "userinfo endpoint error",
                    )
                }
            });
        }

        let payload: Value = response.json().await.map_err(|e| {
            warn!("Failed to parse OAuth userinfo response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        let claims = IdentityClaims::from_value(payload).ok_or_else(|| {
            warn!("OAuth userinfo response is not a JSON object");
            oauth_error(
                OAuthErrorKind::InvalidResponse,
                "userinfo response is not a JSON object",
            )
        })?;

        if claims.subject().is_none() {
            warn!("OAuth userinfo response carries no subject claim");
            return Err(oauth_error(
                OAuthErrorKind::InvalidToken,
                "userinfo response carries no subject",
            ));
        }

        debug!("Resolved OAuth bearer token to an identity");
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use mockito::Server;
    use secrecy::SecretString;

    use super::*;
    use crate::http::ProviderClientBuilder;
    use crate::providers::ProviderEndpoints;

    fn validator_for(userinfo_url: String, max_retries: u32) -> TokenValidator {
        let endpoints = ProviderEndpoints {
            userinfo_url,
            ..ProviderEndpoints::google()
        };
        let config = ProviderConfig::new(
            "abc",
            SecretString::new("s3cret".to_string()),
            "http://localhost:8080/callback",
            ["email"],
            &endpoints,
        )
        .unwrap();
        let client = ProviderClientBuilder::new()
            .with_max_retries(max_retries)
            .build()
            .unwrap();
        TokenValidator::new(Arc::new(config), client)
    }

    #[tokio::test]
    async fn test_resolve_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/userinfo")
            .match_header("authorization", "Bearer ya29.access")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"1234567890","email":"jane@example.com","picture":"https://example.com/p.png"}"#)
            .create_async()
            .await;

        let validator = validator_for(format!("{}/userinfo", server.url()), 0);
        let claims = validator.resolve("ya29.access").await.unwrap();

        mock.assert_async().await;
        assert_eq!(claims.subject(), Some("1234567890"));
        assert_eq!(claims.email(), Some("jane@example.com"));
        assert!(claims.contains("picture"));
    }

    #[tokio::test]
    async fn test_resolve_rejected_token() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/userinfo")
            .with_status(401)
            .with_body(r#"{"error":{"code":401,"status":"UNAUTHENTICATED"}}"#)
            .create_async()
            .await;

        let validator = validator_for(format!("{}/userinfo", server.url()), 0);
        let err = validator.resolve("revoked").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidToken));
    }

    #[tokio::test]
    async fn test_resolve_empty_token_skips_provider() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/userinfo")
            .expect(0)
            .create_async()
            .await;

        let validator = validator_for(format!("{}/userinfo", server.url()), 0);
        let err = validator.resolve("  ").await.unwrap_err();

        mock.assert_async().await;
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidToken));
    }

    #[tokio::test]
    async fn test_resolve_provider_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/userinfo")
            .with_status(500)
            .with_body("backend error")
            .create_async()
            .await;

        let validator = validator_for(format!("{}/userinfo", server.url()), 0);
        let err = validator.resolve("ya29.access").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::Provider {
                status: 500,
                body: "backend error".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn test_resolve_without_subject() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/userinfo")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"email":"jane@example.com"}"#)
            .create_async()
            .await;

        let validator = validator_for(format!("{}/userinfo", server.url()), 0);
        let err = validator.resolve("ya29.access").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::InvalidToken));
    }

    #[tokio::test]
    async fn test_resolve_non_object_payload() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/userinfo")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"["not", "claims"]"#)
            .create_async()
            .await;

        let validator = validator_for(format!("{}/userinfo", server.url()), 0);
        let err = validator.resolve("ya29.access").await.unwrap_err();
        assert_eq!(
            err.error_kind,
            ErrorKind::OAuth(OAuthErrorKind::InvalidResponse)
        );
    }

    #[tokio::test]
    async fn test_resolve_network_failure() {
        let validator = validator_for("http://127.0.0.1:1/userinfo".to_string(), 0);
        let err = validator.resolve("ya29.access").await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::OAuth(OAuthErrorKind::Network));
    }
}
