//! Minimal pages: the sign-in form and the dashboard.

use axum::extract::{Extension, Query, State};
use axum::response::Html;
use axum::Json;
use backoffice_models::PublicSession;
use serde::Deserialize;

use crate::session::SessionClaims;
use crate::state::AppState;

/// Query of `GET /auth/signIn`.
#[derive(Debug, Default, Deserialize)]
pub struct SignInQuery {
    #[serde(rename = "callbackUrl")]
    pub callback_url: Option<String>,
    pub error: Option<String>,
}

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// `GET /auth/signIn`: credential form posting to the auth API.
pub async fn sign_in_page(
    State(state): State<AppState>,
    Query(query): Query<SignInQuery>,
) -> Html<String> {
    let config = &state.config;
    let action = format!(
        "{}/callback/credentials",
        config.paths.auth_api.trim_end_matches('/')
    );
    let field = config.login_variant.identifier_field();
    let input_type = if field == "email" { "email" } else { "text" };

    let error = if query.error.is_some() {
        r#"<p class="error">Sign in failed. Check your details and try again.</p>"#
    } else {
        ""
    };
    let callback = query
        .callback_url
        .as_deref()
        .map(|url| {
            format!(
                r#"<input type="hidden" name="callbackUrl" value="{}">"#,
                escape(url)
            )
        })
        .unwrap_or_default();

    Html(format!(
        r#"<!doctype html>
<html>
<head><meta charset="utf-8"><title>Sign in</title></head>
<body>
<h1>Sign in</h1>
{error}
<form method="post" action="{action}">
{callback}
<label>{field} <input type="{input_type}" name="{field}" required></label>
<label>password <input type="password" name="password" required></label>
<button type="submit">Sign in</button>
</form>
</body>
</html>
"#
    ))
}

/// `GET /dashboard`: the current session as JSON.
///
/// Only reachable with a session; the route guard inserts the claims.
pub async fn dashboard(Extension(claims): Extension<SessionClaims>) -> Json<PublicSession> {
    Json(claims.to_public())
}
