use crate::AppState;
use axum::{routing::get, Router};

use crate::controller::{health_check_controller, index_controller, oauth_controller};

use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

// This is the global definition of our OpenAPI document. To be a part
// of the rendered document, a path must be listed here.
#[derive(OpenApi)]
#[openapi(
        info(
            title = "OAuth Login API"
        ),
        paths(
            index_controller::index,
            oauth_controller::login,
            oauth_controller::callback,
            oauth_controller::validate,
            health_check_controller::health_check,
        ),
        tags(
            (name = "oauth_login", description = "Server-side OAuth2 authorization code login")
        )
    )]
struct ApiDoc;

pub fn define_routes(app_state: AppState) -> Router {
    Router::new()
        .merge(health_routes())
        .merge(index_routes())
        .merge(oauth_routes(app_state))
        .merge(RapiDoc::with_openapi("/api-docs/openapi.json", ApiDoc::openapi()).path("/rapidoc"))
}

fn health_routes() -> Router {
    Router::new().route("/health", get(health_check_controller::health_check))
}

fn index_routes() -> Router {
    Router::new().route("/", get(index_controller::index))
}

/// Routes for the OAuth login flow. None require a session: the callback arrives as a
/// browser redirect from the provider.
fn oauth_routes(app_state: AppState) -> Router {
    Router::new()
        .route("/login", get(oauth_controller::login))
        .route("/callback", get(oauth_controller::callback))
        .route("/validate", get(oauth_controller::validate))
        .with_state(app_state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in ["/", "/login", "/callback", "/validate", "/health"] {
            assert!(doc.paths.paths.contains_key(path), "{path} missing");
        }
    }
}
