//! OAuth token types returned by the token endpoint.

mod tokens;

pub use tokens::TokenSet;
