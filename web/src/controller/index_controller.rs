use axum::response::{Html, IntoResponse};

const LOGIN_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="utf-8">
    <title>Sign in</title>
</head>
<body>
    <h1>Sign in</h1>
    <p><a href="/login">Log in with your provider account</a></p>
</body>
</html>
"#;

/// GET the landing page
///
/// Also the neutral page unfinished logins are redirected to, so it never renders request data.
#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Static landing page with a login link", body = String, content_type = "text/html"),
    )
)]
pub async fn index() -> impl IntoResponse {
    Html(LOGIN_PAGE)
}
