use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::GrantResponseData;
use crate::inbound::http::router::AppState;
use crate::principal::errors::RegistrationError;
use crate::principal::models::RegisterCommand;
use crate::principal::ports::IdentityServicePort;

pub async fn register<S: IdentityServicePort>(
    State(state): State<AppState<S>>,
    body: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiSuccess<GrantResponseData>, ApiError> {
    // An unreadable body carries none of the required fields
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected registration body");
        ApiError::from(RegistrationError::MissingFields)
    })?;

    state
        .identity_service
        .register(body.try_into_command()?)
        .await
        .map_err(ApiError::from)
        .map(|grant| {
            ApiSuccess::new(
                StatusCode::CREATED,
                GrantResponseData::new("registered", grant),
            )
        })
}

/// HTTP request body for registration (raw JSON)
#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    username: Option<String>,
    email: Option<String>,
    password: Option<String>,
}

impl RegisterRequest {
    fn try_into_command(self) -> Result<RegisterCommand, RegistrationError> {
        RegisterCommand::parse(self.username, self.email, self.password)
    }
}
