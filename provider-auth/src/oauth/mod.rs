//! OAuth 2.0 authorization code flow.
//!
//! Issues CSRF state, builds authorization URLs, validates callbacks, exchanges codes for
//! tokens and resolves bearer tokens into identity claims.

mod authorize;
mod callback;
mod exchange;
mod identity;
mod state;
mod validate;

pub mod token;

pub use authorize::{AuthorizationRequest, AuthorizationRequestBuilder};
pub use callback::{CallbackHandler, CallbackOutcome, CallbackResult, USER_DENIED_REASON};
pub use exchange::{CodeExchange, TokenExchanger};
pub use identity::IdentityClaims;
pub use state::{StateToken, StateTokenGuard};
pub use validate::TokenValidator;
