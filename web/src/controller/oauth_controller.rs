//! Controller for the OAuth login flow.
//!
//! Note: these endpoints are reached through browser redirects, so they take all input from
//! the query string and answer with redirects where the browser should move on.

use std::collections::HashMap;

use crate::error::{Error, WebErrorKind};
use crate::AppState;

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Json, Redirect, Response};
use log::*;
use provider_auth::oauth::{AuthorizationRequestBuilder, CallbackOutcome, IdentityClaims};
use secrecy::ExposeSecret;
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters for token validation
#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ValidateParams {
    /// Bearer token to resolve
    pub token: Option<String>,
}

/// GET /login
///
/// Starts a login attempt by redirecting the browser to the provider's authorization endpoint.
#[utoipa::path(
    get,
    path = "/login",
    responses(
        (status = 307, description = "Redirect to the provider's authorization endpoint"),
        (status = 500, description = "Provider configuration unusable"),
    )
)]
pub async fn login(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let state = app_state.state_guard.issue();
    let request = AuthorizationRequestBuilder::build(&app_state.provider, &state)?;

    debug!("Redirecting browser to OAuth authorization endpoint");
    Ok(Redirect::temporary(request.target_url.as_str()))
}

/// GET /callback
///
/// Completes a login attempt: verifies the state, exchanges the code and returns the
/// identity claims of the signed-in user. Callbacks that do not carry a verified state and
/// an authorization code are redirected to the landing page without echoing any of their
/// parameters.
#[utoipa::path(
    get,
    path = "/callback",
    params(
        ("state" = Option<String>, Query, description = "State token issued by /login"),
        ("code" = Option<String>, Query, description = "Authorization code from the provider"),
        ("error_reason" = Option<String>, Query, description = "Reason the provider returned no code"),
    ),
    responses(
        (status = 200, description = "Identity claims of the signed-in user"),
        (status = 307, description = "Login did not complete, redirect to the landing page"),
        (status = 502, description = "Token exchange or identity lookup failed"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, Error> {
    let handler = app_state.callback_handler();

    match handler.complete(&params, app_state.exchanger.as_ref()).await? {
        CallbackOutcome::Authorized(tokens) => {
            let claims = app_state
                .validator
                .resolve(tokens.access_token.expose_secret())
                .await?;
            info!("Completed OAuth login");
            Ok(Json(claims).into_response())
        }
        CallbackOutcome::Rejected(_) => {
            Ok(Redirect::temporary(app_state.config.landing_path()).into_response())
        }
    }
}

/// GET /validate
///
/// Resolves a bearer token into the identity claims the provider holds for it.
#[utoipa::path(
    get,
    path = "/validate",
    params(ValidateParams),
    responses(
        (status = 200, description = "Identity claims for the token"),
        (status = 400, description = "No token supplied"),
        (status = 401, description = "Token expired, revoked or malformed"),
        (status = 502, description = "Provider unreachable or failing"),
    )
)]
pub async fn validate(
    State(app_state): State<AppState>,
    Query(params): Query<ValidateParams>,
) -> Result<Json<IdentityClaims>, Error> {
    let token = params
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or(Error::Web(WebErrorKind::MissingToken))?;

    let claims = app_state.validator.resolve(&token).await?;
    Ok(Json(claims))
}
