use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::GrantResponseData;
use crate::inbound::http::router::AppState;
use crate::principal::errors::AuthenticationError;
use crate::principal::models::AuthenticateCommand;
use crate::principal::ports::IdentityServicePort;

pub async fn login<S: IdentityServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<ApiSuccess<GrantResponseData>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected login body");
        ApiError::from(AuthenticationError::MissingFields)
    })?;

    let command = AuthenticateCommand::parse(body.email, body.password)?;

    state
        .identity_service
        .authenticate(command)
        .await
        .map_err(ApiError::from)
        .map(|grant| ApiSuccess::new(StatusCode::OK, GrantResponseData::new("logged in", grant)))
}

/// HTTP request body for login (raw JSON)
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    email: Option<String>,
    password: Option<String>,
}
