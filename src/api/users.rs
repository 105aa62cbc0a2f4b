//! `/users` handlers.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::payload;
use crate::error::AppError;
use crate::models::{LoginCredentials, NewUser, User, UserEnvelope, UserView};
use crate::repositories::SharedUserRepository;
use crate::security::{hash_password, TokenIssuer};

/// `POST /users/register`
///
/// The response echoes only username and email.
pub async fn register(
    State(users): State<SharedUserRepository>,
    body: Result<Json<UserEnvelope<NewUser>>, JsonRejection>,
) -> Result<(StatusCode, Json<UserEnvelope<UserView>>), AppError> {
    let new_user = payload(body)?.user;
    new_user.validate()?;

    let user = User {
        username: new_user.username,
        email: new_user.email,
        password_hash: hash_password(&new_user.password)?,
    };
    users.register_user(&user).await?;

    tracing::info!(username = %user.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope {
            user: UserView::from(&user),
        }),
    ))
}

/// `POST /users/login`
pub async fn login(
    State(users): State<SharedUserRepository>,
    State(tokens): State<Arc<TokenIssuer>>,
    body: Result<Json<UserEnvelope<LoginCredentials>>, JsonRejection>,
) -> Result<Json<UserEnvelope<UserView>>, AppError> {
    let credentials = payload(body)?.user;

    let user = users
        .find_by_email_and_password(&credentials.email, &credentials.password)
        .await
        .map_err(|err| match err {
            AppError::NotFound(_) => AppError::Unauthorized,
            other => other,
        })?;

    let token = tokens.issue(&user.username)?;
    Ok(Json(UserEnvelope {
        user: UserView {
            token: Some(token),
            ..UserView::from(&user)
        },
    }))
}
