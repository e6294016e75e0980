//! Immutable OAuth provider configuration.

use secrecy::{ExposeSecret, SecretString};
use url::{Host, Url};

use crate::error::{config_error, ConfigErrorKind, Error};

/// Google's authorization endpoint.
pub const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/auth";
/// Google's token endpoint.
pub const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
/// Google's userinfo endpoint.
pub const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v2/userinfo";

// Values shipped in sample configuration that must never reach a running build.
const PLACEHOLDER_VALUES: &[&str] = &["CLIENT_ID", "CLIENT_SECRET", "changeme"];

/// Endpoint URLs of an OAuth provider, before validation.
#[derive(Debug, Clone)]
pub struct ProviderEndpoints {
    pub auth_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl ProviderEndpoints {
    /// Google's OAuth 2.0 endpoints.
    pub fn google() -> Self {
        Self {
            auth_url: GOOGLE_AUTH_URL.to_string(),
            token_url: GOOGLE_TOKEN_URL.to_string(),
            userinfo_url: GOOGLE_USERINFO_URL.to_string(),
        }
    }
}

/// Provider configuration shared read-only by every component of the login flow.
///
/// Built once at startup. All endpoint URLs are validated on construction, so a
/// `ProviderConfig` value is always usable: endpoints are absolute, reached over TLS
/// (loopback hosts excepted), and credentials are neither empty nor placeholders.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    client_id: String,
    client_secret: SecretString,
    /// Kept verbatim; the provider compares it byte for byte with the registered value.
    redirect_uri: String,
    scopes: Vec<String>,
    auth_endpoint: Url,
    token_endpoint: Url,
    userinfo_endpoint: Url,
}

impl ProviderConfig {
    /// Create a validated provider configuration.
    ///
    /// # Arguments
    ///
    /// * `client_id` - OAuth client ID registered with the provider
    /// * `client_secret` - OAuth client secret
    /// * `redirect_uri` - Callback URL, exactly as registered with the provider
    /// * `scopes` - Requested scopes; duplicates are dropped, order is kept
    /// * `endpoints` - Provider authorization, token and userinfo URLs
    pub fn new<I, S>(
        client_id: &str,
        client_secret: SecretString,
        redirect_uri: &str,
        scopes: I,
        endpoints: &ProviderEndpoints,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        check_credential("client_id", client_id)?;
        check_credential("client_secret", client_secret.expose_secret())?;

        Url::parse(redirect_uri).map_err(|e| {
            config_error(
                ConfigErrorKind::InvalidUrl,
                &format!("redirect_uri is not an absolute URL: {}", e),
            )
        })?;

        let mut unique: Vec<String> = Vec::new();
        for scope in scopes.into_iter().map(Into::into) {
            let scope = scope.trim().to_string();
            if !scope.is_empty() && !unique.contains(&scope) {
                unique.push(scope);
            }
        }
        if unique.is_empty() {
            return Err(config_error(
                ConfigErrorKind::Missing,
                "at least one scope must be requested",
            ));
        }

        Ok(Self {
            client_id: client_id.to_string(),
            client_secret,
            redirect_uri: redirect_uri.to_string(),
            scopes: unique,
            auth_endpoint: parse_endpoint("auth_url", &endpoints.auth_url)?,
            token_endpoint: parse_endpoint("token_url", &endpoints.token_url)?,
            userinfo_endpoint: parse_endpoint("userinfo_url", &endpoints.userinfo_url)?,
        })
    }

    /// Create a configuration against Google's endpoints.
    pub fn google<I, S>(
        client_id: &str,
        client_secret: SecretString,
        redirect_uri: &str,
        scopes: I,
    ) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            client_id,
            client_secret,
            redirect_uri,
            scopes,
            &ProviderEndpoints::google(),
        )
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &SecretString {
        &self.client_secret
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    pub fn scopes(&self) -> &[String] {
        &self.scopes
    }

    pub fn auth_endpoint(&self) -> &Url {
        &self.auth_endpoint
    }

    pub fn token_endpoint(&self) -> &Url {
        &self.token_endpoint
    }

    pub fn userinfo_endpoint(&self) -> &Url {
        &self.userinfo_endpoint
    }
}

fn check_credential(name: &str, value: &str) -> Result<(), Error> {
    if value.trim().is_empty() {
        return Err(config_error(
            ConfigErrorKind::Missing,
            &format!("{} is required", name),
        ));
    }
    if PLACEHOLDER_VALUES.contains(&value) {
        return Err(config_error(
            ConfigErrorKind::Placeholder,
            &format!("{} is still a placeholder value", name),
        ));
    }
    Ok(())
}

fn parse_endpoint(name: &str, raw: &str) -> Result<Url, Error> {
    let url = Url::parse(raw).map_err(|e| {
        config_error(
            ConfigErrorKind::InvalidUrl,
            &format!("{} is not an absolute URL: {}", name, e),
        )
    })?;

    if url.cannot_be_a_base() {
        return Err(config_error(
            ConfigErrorKind::InvalidUrl,
            &format!("{} has no host", name),
        ));
    }

    if !is_encrypted_transport(&url) {
        return Err(config_error(
            ConfigErrorKind::InsecureEndpoint,
            &format!("{} must use https", name),
        ));
    }

    Ok(url)
}

/// `https`, or plain `http` to a loopback host (local stub providers).
fn is_encrypted_transport(url: &Url) -> bool {
    match url.scheme() {
        "https" => true,
        "http" => match url.host() {
            Some(Host::Domain(domain)) => domain.eq_ignore_ascii_case("localhost"),
            Some(Host::Ipv4(ip)) => ip.is_loopback(),
            Some(Host::Ipv6(ip)) => ip.is_loopback(),
            None => false,
        },
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn secret(value: &str) -> SecretString {
        SecretString::new(value.to_string())
    }

    #[test]
    fn test_google_config() {
        let config = ProviderConfig::google(
            "abc",
            secret("s3cret"),
            "http://localhost:8080/callback",
            ["email", "profile"],
        )
        .unwrap();

        assert_eq!(config.client_id(), "abc");
        assert_eq!(config.redirect_uri(), "http://localhost:8080/callback");
        assert_eq!(config.scopes(), ["email", "profile"]);
        assert_eq!(config.auth_endpoint().as_str(), GOOGLE_AUTH_URL);
        assert_eq!(config.token_endpoint().as_str(), GOOGLE_TOKEN_URL);
    }

    #[test]
    fn test_duplicate_scopes_are_dropped() {
        let config = ProviderConfig::google(
            "abc",
            secret("s3cret"),
            "http://localhost:8080/callback",
            ["email", "profile", "email", " "],
        )
        .unwrap();

        assert_eq!(config.scopes(), ["email", "profile"]);
    }

    #[test]
    fn test_redirect_uri_is_kept_verbatim() {
        let config = ProviderConfig::google(
            "abc",
            secret("s3cret"),
            "https://example.com",
            ["email"],
        )
        .unwrap();

        // Url would normalise this to "https://example.com/".
        assert_eq!(config.redirect_uri(), "https://example.com");
    }

    #[test]
    fn test_placeholder_credentials_rejected() {
        let result = ProviderConfig::google(
            "CLIENT_ID",
            secret("s3cret"),
            "http://localhost:8080/callback",
            ["email"],
        );
        assert_eq!(
            result.unwrap_err().error_kind,
            ErrorKind::Config(ConfigErrorKind::Placeholder)
        );

        let result = ProviderConfig::google(
            "abc",
            secret("CLIENT_SECRET"),
            "http://localhost:8080/callback",
            ["email"],
        );
        assert_eq!(
            result.unwrap_err().error_kind,
            ErrorKind::Config(ConfigErrorKind::Placeholder)
        );
    }

    #[test]
    fn test_missing_scopes_rejected() {
        let result = ProviderConfig::google(
            "abc",
            secret("s3cret"),
            "http://localhost:8080/callback",
            Vec::<String>::new(),
        );
        assert_eq!(
            result.unwrap_err().error_kind,
            ErrorKind::Config(ConfigErrorKind::Missing)
        );
    }

    #[test]
    fn test_relative_endpoint_rejected() {
        let endpoints = ProviderEndpoints {
            auth_url: "/o/oauth2/auth".to_string(),
            ..ProviderEndpoints::google()
        };
        let result = ProviderConfig::new(
            "abc",
            secret("s3cret"),
            "http://localhost:8080/callback",
            ["email"],
            &endpoints,
        );
        assert_eq!(
            result.unwrap_err().error_kind,
            ErrorKind::Config(ConfigErrorKind::InvalidUrl)
        );
    }

    #[test]
    fn test_plaintext_token_endpoint_rejected() {
        let endpoints = ProviderEndpoints {
            token_url: "http://oauth2.example.com/token".to_string(),
            ..ProviderEndpoints::google()
        };
        let result = ProviderConfig::new(
            "abc",
            secret("s3cret"),
            "http://localhost:8080/callback",
            ["email"],
            &endpoints,
        );
        assert_eq!(
            result.unwrap_err().error_kind,
            ErrorKind::Config(ConfigErrorKind::InsecureEndpoint)
        );
    }

    #[test]
    fn test_loopback_endpoints_allowed() {
        let endpoints = ProviderEndpoints {
            auth_url: "http://localhost:9000/auth".to_string(),
            token_url: "http://127.0.0.1:9000/token".to_string(),
            userinfo_url: "http://[::1]:9000/userinfo".to_string(),
        };
        let result = ProviderConfig::new(
            "abc",
            secret("s3cret"),
            "http://localhost:8080/callback",
            ["email"],
            &endpoints,
        );
        assert!(result.is_ok());
    }
}
