use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use log::*;
use serde_json::json;

use provider_auth::error::{ErrorKind, OAuthErrorKind};
use provider_auth::Error as AuthError;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Auth(AuthError),
    Web(WebErrorKind),
}

#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// A required query parameter is absent or empty.
    MissingToken,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

impl Error {
    fn status_and_kind(&self) -> (StatusCode, &'static str) {
        match self {
            Error::Web(WebErrorKind::MissingToken) => (StatusCode::BAD_REQUEST, "missing_token"),
            Error::Auth(err) => match &err.error_kind {
                ErrorKind::OAuth(OAuthErrorKind::InvalidToken) => {
                    (StatusCode::UNAUTHORIZED, err.kind_name())
                }
                ErrorKind::OAuth(OAuthErrorKind::Network)
                | ErrorKind::OAuth(OAuthErrorKind::Provider { .. })
                | ErrorKind::OAuth(OAuthErrorKind::InvalidResponse) => {
                    (StatusCode::BAD_GATEWAY, err.kind_name())
                }
                ErrorKind::Config(_) | ErrorKind::Http(_) => {
                    (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
                }
            },
        }
    }
}

// Bodies carry only the error kind. Provider responses and error sources go to the
// operator log, never to the browser.
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, kind) = self.status_and_kind();

        match &self {
            Error::Auth(err) if status.is_server_error() => {
                error!("Request failed with {}: {:?}", status, err)
            }
            Error::Auth(err) => warn!("Request rejected with {}: {}", status, err),
            Error::Web(kind) => debug!("Request rejected with {}: {:?}", status, kind),
        }

        (status, Json(json!({ "error": kind }))).into_response()
    }
}

impl From<AuthError> for Error {
    fn from(err: AuthError) -> Self {
        Error::Auth(err)
    }
}
