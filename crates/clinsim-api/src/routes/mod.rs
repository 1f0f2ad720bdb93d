//! Route modules organized by context.

pub mod cases;
pub mod health;
pub mod sessions;

use axum::Router;

use crate::state::AppState;

/// Builds the full application router without middleware.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(health::router())
        .nest("/api/v1/cases", cases::router())
        .nest("/api/v1/sessions", sessions::router())
        .with_state(state)
}
