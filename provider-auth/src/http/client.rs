//! HTTP client builder for calls to the OAuth provider.

use std::time::Duration;

use reqwest_middleware::ClientBuilder;
use reqwest_retry::RetryTransientMiddleware;

use super::BackoffPolicy;
use crate::error::Error;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout.
    pub timeout: Duration,
    /// Maximum number of retries. Zero disables the retry middleware.
    pub max_retries: u32,
    /// User agent string.
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 0,
            user_agent: format!("provider-auth/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client used to reach the provider.
pub type ProviderClient = reqwest_middleware::ClientWithMiddleware;

/// Builder for provider HTTP clients.
///
/// Clients use rustls for TLS. Retries are opt-in and only appropriate for idempotent calls.
pub struct ProviderClientBuilder {
    config: HttpClientConfig,
}

impl ProviderClientBuilder {
    /// Create a new client builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: HttpClientConfig::default(),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the maximum number of retries.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.config.max_retries = max_retries;
        self
    }

    /// Set the user agent string.
    pub fn with_user_agent(mut self, user_agent: String) -> Self {
        self.config.user_agent = user_agent;
        self
    }

    /// Build the configured HTTP client.
    pub fn build(self) -> Result<ProviderClient, Error> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(self.config.timeout)
            .user_agent(self.config.user_agent)
            .build()?;

        let mut builder = ClientBuilder::new(client);
        if self.config.max_retries > 0 {
            let policy = BackoffPolicy::new(self.config.max_retries);
            builder = builder.with(RetryTransientMiddleware::new_with_policy(policy));
        }

        Ok(builder.build())
    }
}

impl Default for ProviderClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
