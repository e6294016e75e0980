//! OAuth token set.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

/// Tokens issued for one completed authorization.
///
/// Owned by the caller for the duration of a single request and never persisted.
/// `Debug` output redacts both tokens.
#[derive(Debug, Clone)]
pub struct TokenSet {
    /// Access token for API requests.
    pub access_token: SecretString,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// When the access token expires, if the provider said.
    pub expires_at: Option<DateTime<Utc>>,
    /// Refresh token, if one was issued.
    pub refresh_token: Option<SecretString>,
    /// Granted scopes.
    pub scopes: Vec<String>,
}

impl TokenSet {
    /// Check if the access token is expired or about to expire soon.
    ///
    /// Returns true if token is expired or will expire within 5 minutes.
    pub fn is_expired(&self) -> bool {
        self.expires_at
            .map(|expires| {
                let now = Utc::now();
                let buffer = chrono::Duration::minutes(5);
                expires <= (now + buffer)
            })
            .unwrap_or(false)
    }

    /// Get the remaining time until expiration.
    pub fn time_until_expiry(&self) -> Option<chrono::Duration> {
        self.expires_at.map(|expires| expires - Utc::now())
    }

    /// Whether the provider issued a refresh token.
    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn token_set(expires_at: Option<DateTime<Utc>>) -> TokenSet {
        TokenSet {
            access_token: SecretString::new("ya29.secret-access".to_string()),
            token_type: "Bearer".to_string(),
            expires_at,
            refresh_token: Some(SecretString::new("1//secret-refresh".to_string())),
            scopes: vec![],
        }
    }

    #[test]
    fn test_token_not_expired() {
        assert!(!token_set(Some(Utc::now() + Duration::hours(1))).is_expired());
    }

    #[test]
    fn test_token_expired() {
        assert!(token_set(Some(Utc::now() - Duration::hours(1))).is_expired());
    }

    #[test]
    fn test_token_expiring_soon() {
        assert!(token_set(Some(Utc::now() + Duration::minutes(3))).is_expired());
    }

    #[test]
    fn test_token_without_expiry() {
        let tokens = token_set(None);
        assert!(!tokens.is_expired());
        assert!(tokens.time_until_expiry().is_none());
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", token_set(None));
        assert!(!rendered.contains("ya29.secret-access"));
        assert!(!rendered.contains("1//secret-refresh"));
        assert!(rendered.contains("Bearer"));
    }
}
