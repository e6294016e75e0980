//! CSRF state management for OAuth flows.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use hmac::{Hmac, Mac};
use log::*;
use rand::Rng;
use sha2::Sha256;

use crate::error::{config_error, ConfigErrorKind, Error};

type HmacSha256 = Hmac<Sha256>;

/// Opaque, unguessable value correlating a login attempt with its callback.
#[derive(Clone, PartialEq, Eq)]
pub struct StateToken(String);

impl StateToken {
    #[cfg(test)]
    pub(crate) fn new(value: &str) -> Self {
        Self(value.to_string())
    }

    /// Get the token string, as sent in the `state` query parameter.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// Keeps tokens out of log lines that format values with `{:?}`.
impl fmt::Debug for StateToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("StateToken(..)")
    }
}

/// A login attempt waiting for its callback.
#[derive(Debug, Clone)]
struct PendingAttempt {
    /// Keyed digest of the issued token.
    fingerprint: Vec<u8>,
    /// When this attempt expires.
    expires_at: DateTime<Utc>,
}

/// Issues and verifies single-use state tokens with expiration.
///
/// Pending attempts live in a concurrent map so simultaneous logins never contend on a
/// single lock. Entries are keyed by an HMAC-SHA256 fingerprint of the token under a
/// per-guard random key, so looking a token up never compares raw token bytes, and the
/// final match is checked in constant time.
#[derive(Clone)]
pub struct StateTokenGuard {
    pending: Arc<DashMap<String, PendingAttempt>>,
    key: Arc<[u8; 32]>,
    ttl: Duration,
}

impl StateTokenGuard {
    /// Create a new guard with default TTL of 10 minutes.
    pub fn new() -> Self {
        Self::with_ttl(Duration::minutes(10))
    }

    /// Create a new guard with custom TTL.
    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            pending: Arc::new(DashMap::new()),
            key: Arc::new(rand::thread_rng().gen()),
            ttl,
        }
    }

    /// Create a new guard from a configured lifetime.
    ///
    /// Fails when `ttl` is zero or too large to compute an expiry time from now.
    pub fn try_with_ttl(ttl: std::time::Duration) -> Result<Self, Error> {
        let ttl = Duration::from_std(ttl)
            .ok()
            .filter(|ttl| *ttl > Duration::zero())
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or_else(|| {
                config_error(
                    ConfigErrorKind::InvalidStateTtl,
                    &format!("state TTL of {}s is out of range", ttl.as_secs()),
                )
            })?;

        Ok(Self::with_ttl(ttl))
    }

    /// Issue a new state token for a login attempt.
    pub fn issue(&self) -> StateToken {
        let token = Self::generate_token();
        let fingerprint = self.fingerprint(&token);
        let attempt = PendingAttempt {
            fingerprint: fingerprint.clone(),
            expires_at: Utc::now()
                .checked_add_signed(self.ttl)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
        };

        self.pending.insert(hex::encode(fingerprint), attempt);
        debug!("Issued OAuth state, {} attempt(s) pending", self.pending.len());

        StateToken(token)
    }

    /// Verify and consume a presented state token.
    ///
    /// Returns `true` only if the token was issued by this guard, has not been presented
    /// before, and has not expired. A token is consumed by the first attempt to verify it,
    /// whatever the outcome.
    pub fn verify(&self, presented: &str) -> bool {
        self.verify_at(presented, Utc::now())
    }

    /// Verify and consume a presented state token against an explicit clock.
    pub fn verify_at(&self, presented: &str, now: DateTime<Utc>) -> bool {
        let fingerprint = self.fingerprint(presented);

        let Some((_, attempt)) = self.pending.remove(&hex::encode(&fingerprint)) else {
            return false;
        };

        if !self.matches(presented, &attempt.fingerprint) {
            return false;
        }

        if now > attempt.expires_at {
            debug!("Rejected expired OAuth state");
            return false;
        }

        true
    }

    /// Remove attempts whose callback never arrived.
    ///
    /// Should be called periodically to prevent memory leaks.
    pub fn cleanup_expired(&self) -> usize {
        let before = self.pending.len();
        let now = Utc::now();
        self.pending.retain(|_, attempt| attempt.expires_at > now);
        before.saturating_sub(self.pending.len())
    }

    /// Number of login attempts waiting for their callback.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Configured lifetime of an issued token.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn mac(&self) -> HmacSha256 {
        HmacSha256::new_from_slice(&self.key[..]).expect("HMAC accepts keys of any length")
    }

    fn fingerprint(&self, token: &str) -> Vec<u8> {
        let mut mac = self.mac();
        mac.update(token.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }

    fn matches(&self, presented: &str, expected: &[u8]) -> bool {
        let mut mac = self.mac();
        mac.update(presented.as_bytes());
        mac.verify_slice(expected).is_ok()
    }

    /// Generate a cryptographically random state token.
    fn generate_token() -> String {
        let random_bytes: [u8; 32] = rand::thread_rng().gen();
        hex::encode(random_bytes)
    }
}

impl Default for StateTokenGuard {
    fn default() -> Self {
        Self::new()
    }
}
