//! `/node` handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use super::{payload, AuthUser};
use crate::error::AppError;
use crate::models::Node;
use crate::repositories::SharedNodeRepository;

/// `GET /node`
pub async fn list(State(nodes): State<SharedNodeRepository>) -> Result<Json<Vec<Node>>, AppError> {
    Ok(Json(nodes.find_all().await?))
}

/// `POST /node`
///
/// Any failure to store the node is reported as 409; the underlying kind
/// is logged.
pub async fn create(
    State(nodes): State<SharedNodeRepository>,
    body: Result<Json<Node>, JsonRejection>,
) -> Result<(StatusCode, Json<Node>), AppError> {
    let node = payload(body)?;
    node.validate()?;

    nodes.save(&node).await.map_err(|err| match err {
        AppError::Conflict(_) => err,
        other => {
            tracing::warn!(error = %other, name = %node.name, "node write failed");
            AppError::Conflict(format!("node '{}' could not be stored", node.name))
        }
    })?;

    tracing::info!(name = %node.name, "node created");
    Ok((StatusCode::CREATED, Json(node)))
}

/// `GET /node/{name}`
pub async fn show(
    State(nodes): State<SharedNodeRepository>,
    Path(name): Path<String>,
) -> Result<Json<Node>, AppError> {
    Ok(Json(nodes.find_by_name(&name).await?))
}

/// `DELETE /node/{name}`
pub async fn remove(
    user: AuthUser,
    State(nodes): State<SharedNodeRepository>,
    Path(name): Path<String>,
) -> Result<StatusCode, AppError> {
    nodes.delete_by_name(&name).await?;
    tracing::info!(name = %name, by = %user.username, "node deleted");
    Ok(StatusCode::NO_CONTENT)
}
