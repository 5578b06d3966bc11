//! Back-office console gateway.
//!
//! Serves the console's authentication surface:
//!
//! 1. The sign-in form posts credentials to the auth API.
//! 2. [`identity::IdentityExchange`] trades them for an access token at the
//!    identity provider and decodes its claims.
//! 3. The [`session`] bridge turns the identity into a signed session cookie.
//! 4. [`guard::route_guard`] admits or redirects every request based on the
//!    path class and the presence of a valid session.
//! 5. Authenticated requests under `/api/backoffice` are forwarded to the
//!    back-office API with the session's bearer token.

pub mod claims;
pub mod config;
pub mod cookies;
pub mod error;
pub mod guard;
pub mod identity;
pub mod pages;
pub mod proxy;
pub mod routes;
pub mod session;
pub mod state;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::routing::{any, get};

use crate::state::AppState;

/// Build the gateway router with the route guard in front of every path.
pub fn app(state: AppState) -> Router {
    let paths = &state.config.paths;

    Router::new()
        .merge(routes::auth_routes(paths))
        .route(&paths.sign_in, get(pages::sign_in_page))
        .route(&paths.dashboard, get(pages::dashboard))
        .route(&format!("{}/{{*path}}", proxy::API_PREFIX), any(proxy::forward))
        .fallback(|| async { StatusCode::NOT_FOUND })
        .layer(middleware::from_fn_with_state(
            state.clone(),
            guard::route_guard,
        ))
        .with_state(state)
}
