//! OAuth callback validation.
//!
//! The callback is walked through an explicit sequence of states:
//!
//! ```text
//! Received --check_state--> StateChecked --check_code--> CodeChecked --resolve--> Success
//!     |                          |
//!     +--> StateMismatch         +--> UserDenied | MissingCode
//! ```
//!
//! The authorization code is only readable from [`StateChecked`], which can only be
//! obtained by verifying the state token, so no code is ever used from an unverified
//! callback.

use std::collections::HashMap;

use log::*;

use super::exchange::CodeExchange;
use super::token::TokenSet;
use super::StateTokenGuard;
use crate::error::Error;

/// `error_reason` value sent when the user declines consent.
pub const USER_DENIED_REASON: &str = "user_denied";
/// Standard OAuth 2.0 `error` value for a declined consent.
const ACCESS_DENIED_ERROR: &str = "access_denied";

/// Terminal result of validating a callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackResult {
    /// State verified and an authorization code is present.
    Success { code: String },
    /// The user declined the authorization request.
    UserDenied { reason: String },
    /// The state token is absent, unknown, already used or expired.
    StateMismatch,
    /// State verified but neither a code nor a denial was returned.
    MissingCode,
}

/// Result of a completed callback.
#[derive(Debug)]
pub enum CallbackOutcome {
    /// The code was exchanged for tokens.
    Authorized(TokenSet),
    /// The callback ended without an exchange.
    Rejected(CallbackResult),
}

/// Callback as it arrived, nothing verified.
struct Received<'a> {
    params: &'a HashMap<String, String>,
}

/// State token verified and consumed.
struct StateChecked<'a> {
    params: &'a HashMap<String, String>,
}

/// An authorization code is present on a verified callback.
struct CodeChecked {
    code: String,
}

impl<'a> Received<'a> {
    fn new(params: &'a HashMap<String, String>) -> Self {
        Self { params }
    }

    fn check_state(self, guard: &StateTokenGuard) -> Result<StateChecked<'a>, CallbackResult> {
        match self.params.get("state") {
            Some(state) if !state.is_empty() && guard.verify(state) => Ok(StateChecked {
                params: self.params,
            }),
            _ => Err(CallbackResult::StateMismatch),
        }
    }
}

impl StateChecked<'_> {
    fn check_code(self) -> Result<CodeChecked, CallbackResult> {
        if let Some(code) = self.params.get("code").filter(|c| !c.is_empty()) {
            return Ok(CodeChecked { code: code.clone() });
        }

        let error_reason = self.params.get("error_reason").map(String::as_str);
        let error = self.params.get("error").map(String::as_str);

        if error_reason == Some(USER_DENIED_REASON) || error == Some(ACCESS_DENIED_ERROR) {
            let reason = error_reason.or(error).unwrap_or(USER_DENIED_REASON);
            return Err(CallbackResult::UserDenied {
                reason: reason.to_string(),
            });
        }

        Err(CallbackResult::MissingCode)
    }
}

impl CodeChecked {
    fn resolve(self) -> CallbackResult {
        CallbackResult::Success { code: self.code }
    }
}

/// Validates provider callbacks and drives the code exchange.
#[derive(Clone)]
pub struct CallbackHandler {
    guard: StateTokenGuard,
}

impl CallbackHandler {
    pub fn new(guard: StateTokenGuard) -> Self {
        Self { guard }
    }

    /// Validate callback query parameters.
    ///
    /// Consumes the presented state token. Nothing besides `state` is read unless the
    /// token verifies.
    pub fn handle(&self, query_params: &HashMap<String, String>) -> CallbackResult {
        let state_checked = match Received::new(query_params).check_state(&self.guard) {
            Ok(checked) => checked,
            Err(result) => {
                warn!("Rejected OAuth callback: state mismatch");
                return result;
            }
        };

        match state_checked.check_code() {
            Ok(code_checked) => code_checked.resolve(),
            Err(result) => {
                info!("OAuth callback carried no authorization code: {:?}", kind_of(&result));
                result
            }
        }
    }

    /// Validate a callback and, only on success, exchange its code for tokens.
    pub async fn complete<E>(
        &self,
        query_params: &HashMap<String, String>,
        exchanger: &E,
    ) -> Result<CallbackOutcome, Error>
    where
        E: CodeExchange + ?Sized,
    {
        match self.handle(query_params) {
            CallbackResult::Success { code } => {
                let tokens = exchanger.exchange(&code).await?;
                Ok(CallbackOutcome::Authorized(tokens))
            }
            rejected => Ok(CallbackOutcome::Rejected(rejected)),
        }
    }
}

// The denial reason is provider/attacker supplied; only the variant is logged.
fn kind_of(result: &CallbackResult) -> &'static str {
    match result {
        CallbackResult::Success { .. } => "success",
        CallbackResult::UserDenied { .. } => "user_denied",
        CallbackResult::StateMismatch => "state_mismatch",
        CallbackResult::MissingCode => "missing_code",
    }
}
