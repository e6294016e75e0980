use config::Config;
use log::info;
use provider_auth::http::ProviderClientBuilder;
use provider_auth::oauth::{CallbackHandler, StateTokenGuard, TokenExchanger, TokenValidator};
use provider_auth::providers::ProviderConfig;
use provider_auth::Error;
use std::sync::Arc;
use std::time::Duration;

pub mod config;
pub mod logging;

// Service-level state shared by every request handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub provider: Arc<ProviderConfig>,
    pub state_guard: StateTokenGuard,
    pub exchanger: Arc<TokenExchanger>,
    pub validator: Arc<TokenValidator>,
}

impl AppState {
    /// Builds the login flow components from configuration.
    ///
    /// Fails on an unusable provider configuration, which is fatal at startup.
    pub fn new(app_config: Config) -> Result<Self, Error> {
        let provider = Arc::new(app_config.provider_config()?);
        let timeout = Duration::from_secs(app_config.provider_timeout_seconds);

        let state_guard =
            StateTokenGuard::try_with_ttl(Duration::from_secs(app_config.state_ttl_seconds))?;

        info!(
            "OAuth provider config: client_id={}, redirect_uri={}, scopes={:?}, \
             token_url={}, state_ttl={}s, validate_max_retries={}",
            provider.client_id(),
            provider.redirect_uri(),
            provider.scopes(),
            provider.token_endpoint(),
            state_guard.ttl().num_seconds(),
            app_config.validate_max_retries,
        );

        // Codes are single-use: the exchange client never retries.
        let exchange_client = ProviderClientBuilder::new()
            .with_timeout(timeout)
            .build()?;
        let validate_client = ProviderClientBuilder::new()
            .with_timeout(timeout)
            .with_max_retries(app_config.validate_max_retries)
            .build()?;

        Ok(Self {
            exchanger: Arc::new(TokenExchanger::new(Arc::clone(&provider), exchange_client)),
            validator: Arc::new(TokenValidator::new(Arc::clone(&provider), validate_client)),
            state_guard,
            provider,
            config: app_config,
        })
    }

    pub fn callback_handler(&self) -> CallbackHandler {
        CallbackHandler::new(self.state_guard.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use provider_auth::error::{ConfigErrorKind, ErrorKind};

    fn config_with_ttl(ttl: &str) -> Config {
        Config::from_args([
            "oauth_login_rs",
            "--client-id",
            "abc",
            "--client-secret",
            "s3cret",
            "--state-ttl-seconds",
            ttl,
        ])
    }

    #[test]
    fn test_app_state_uses_configured_ttl() {
        let app_state = AppState::new(config_with_ttl("300")).unwrap();
        assert_eq!(app_state.state_guard.ttl(), chrono::Duration::minutes(5));
    }

    #[test]
    fn test_app_state_rejects_out_of_range_ttl() {
        for ttl in ["0", "10000000000000", "18446744073709551615"] {
            let err = AppState::new(config_with_ttl(ttl)).err().unwrap();
            assert_eq!(
                err.error_kind,
                ErrorKind::Config(ConfigErrorKind::InvalidStateTtl),
                "ttl {ttl} should be rejected"
            );
        }
    }
}
