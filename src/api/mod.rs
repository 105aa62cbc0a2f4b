//! HTTP surface: routing and JSON translation around the repositories.
//!
//! | Route | Methods |
//! |-------|---------|
//! | `/users/register` | POST |
//! | `/users/login` | POST |
//! | `/node` | GET, POST |
//! | `/node/{name}` | GET, DELETE (bearer token) |
//! | `/health` | GET |
//!
//! Unsupported methods on a known path answer 405.

mod auth;
mod nodes;
mod users;

use axum::extract::rejection::JsonRejection;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

use crate::context::Context;
use crate::error::AppError;

pub use auth::AuthUser;

/// Builds the application router.
pub fn router(ctx: Context) -> Router {
    Router::new()
        .route("/users/register", post(users::register))
        .route("/users/login", post(users::login))
        .route("/node", get(nodes::list).post(nodes::create))
        .route("/node/{name}", get(nodes::show).delete(nodes::remove))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Unwraps a JSON body, turning any decode failure into a 400.
fn payload<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::Validation(rejection.body_text()))
}
