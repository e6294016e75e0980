//! Authorization code exchange against the provider's token endpoint.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use log::*;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::token::TokenSet;
use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind};
use crate::http::ProviderClient;
use crate::providers::ProviderConfig;

/// Exchanges an authorization code for tokens.
///
/// Implemented by [`TokenExchanger`]; the callback flow depends on this trait so it can be
/// driven without a live provider.
#[async_trait]
pub trait CodeExchange: Send + Sync {
    /// Exchange a single-use authorization code for a token set.
    async fn exchange(&self, code: &str) -> Result<TokenSet, Error>;
}

/// Token endpoint response body.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

impl TokenResponse {
    fn into_token_set(self) -> TokenSet {
        TokenSet {
            access_token: SecretString::new(self.access_token),
            token_type: self
                .token_type
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Bearer".to_string()),
            expires_at: self
                .expires_in
                .filter(|secs| *secs > 0)
                .map(|secs| Utc::now() + Duration::seconds(secs)),
            refresh_token: self
                .refresh_token
                .filter(|t| !t.is_empty())
                .map(SecretString::new),
            scopes: self
                .scope
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }
}

/// Exchanges authorization codes at the provider's token endpoint.
///
/// Failures are never retried here: the provider consumes a code on first use, so a retry
/// needs a fresh authorization round-trip.
pub struct TokenExchanger {
    config: Arc<ProviderConfig>,
    http_client: ProviderClient,
}

impl TokenExchanger {
    /// Create a new exchanger.
    ///
    /// `http_client` should not carry retry middleware.
    pub fn new(config: Arc<ProviderConfig>, http_client: ProviderClient) -> Self {
        Self {
            config,
            http_client,
        }
    }
}

#[async_trait]
impl CodeExchange for TokenExchanger {
    async fn exchange(&self, code: &str) -> Result<TokenSet, Error> {
        let params = [
            ("code", code),
            ("client_id", self.config.client_id()),
            (
                "client_secret",
                self.config.client_secret().expose_secret().as_str(),
            ),
            ("redirect_uri", self.config.redirect_uri()),
            ("grant_type", "authorization_code"),
        ];

        debug!(
            "Exchanging OAuth authorization code at {}",
            self.config.token_endpoint()
        );

        let response = self
            .http_client
            .post(self.config.token_endpoint().clone())
            .header(ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach OAuth token endpoint: {:?}", e);
                Error {
                    source: Some(Box::new(e)),
                    error_kind: ErrorKind::OAuth(OAuthErrorKind::Network),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("OAuth token endpoint rejected authorization code: {}", status);
            debug!("OAuth token endpoint error body: {}", body);
            return Err(oauth_error(
                OAuthErrorKind::Provider {
                    status: status.as_u16(),
                    body,
                },
                "token endpoint rejected authorization code",
            ));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            warn!("Failed to parse OAuth token response: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::OAuth(OAuthErrorKind::InvalidResponse),
            }
        })?;

        if token_response.access_token.is_empty() {
            warn!("OAuth token response carried an empty access token");
            return Err(oauth_error(
                OAuthErrorKind::InvalidResponse,
                "token response has no access token",
            ));
        }

        let tokens = token_response.into_token_set();
        info!(
            "Exchanged OAuth authorization code for {} token (expires_at: {:?}, refresh_token: {})",
            tokens.token_type,
            tokens.expires_at,
            tokens.has_refresh_token()
        );

        Ok(tokens)
    }
}
