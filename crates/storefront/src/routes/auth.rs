//! Account route handlers: registration and password login.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::json_body;
use crate::error::Result;
use crate::models::User;
use crate::services::AuthError;
use crate::state::AppState;

/// Body of `POST /register`.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Body of `POST /login`.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

/// `POST /register`
#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    body: std::result::Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>)> {
    let RegisterRequest {
        name: Some(name),
        email: Some(email),
        password: Some(password),
    } = json_body(body)?
    else {
        return Err(AuthError::MissingField(
            "name, email and password are required".to_string(),
        )
        .into());
    };

    let user = state.auth().register(&name, &email, &password).await?;
    tracing::info!(user_id = %user.id, "User registered");

    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// `POST /login`
#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    body: std::result::Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>> {
    let LoginRequest {
        email: Some(email),
        password: Some(password),
    } = json_body(body)?
    else {
        return Err(
            AuthError::MissingField("email and password are required".to_string()).into(),
        );
    };

    let outcome = state.auth().login(&email, &password).await?;
    tracing::info!(user_id = %outcome.user.id, "User logged in");

    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}
