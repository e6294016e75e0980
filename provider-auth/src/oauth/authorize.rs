//! Authorization URL construction.

use url::Url;

use super::StateToken;
use crate::error::Error;
use crate::providers::ProviderConfig;

/// Authorization request the browser is redirected to.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    /// Provider authorization URL including all query parameters.
    pub target_url: Url,
}

/// Builds provider authorization URLs for the authorization code grant.
pub struct AuthorizationRequestBuilder;

impl AuthorizationRequestBuilder {
    /// Build the authorization URL for a login attempt.
    ///
    /// Appends `client_id`, `scope` (space-joined), `redirect_uri`, `response_type=code`
    /// and `state` to the provider's authorization endpoint. Scheme, host, path and any
    /// query parameters already present on the endpoint are preserved.
    ///
    /// # Errors
    ///
    /// Endpoint problems are configuration errors raised by [`ProviderConfig::new`]; a
    /// constructed `ProviderConfig` always yields a request.
    pub fn build(
        config: &ProviderConfig,
        state: &StateToken,
    ) -> Result<AuthorizationRequest, Error> {
        let mut target_url = config.auth_endpoint().clone();

        target_url
            .query_pairs_mut()
            .append_pair("client_id", config.client_id())
            .append_pair("scope", &config.scopes().join(" "))
            .append_pair("redirect_uri", config.redirect_uri())
            .append_pair("response_type", "code")
            .append_pair("state", state.as_str());

        Ok(AuthorizationRequest { target_url })
    }
}
