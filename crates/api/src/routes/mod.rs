//! API route definitions.

use axum::{Router, middleware};

use crate::{AppState, middleware::auth::auth_middleware};

pub mod alerts;
pub mod auth;
pub mod health;
pub mod sessions;

/// Creates the API router with all routes.
///
/// Login, register, and refresh are public; everything else sits behind
/// the authentication middleware.
pub fn api_routes_with_state(state: AppState) -> Router<AppState> {
    let protected_routes = Router::new()
        .merge(auth::protected_routes())
        .merge(sessions::routes())
        .merge(alerts::routes())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(protected_routes)
}
