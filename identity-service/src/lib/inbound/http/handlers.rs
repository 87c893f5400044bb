use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::Json;
use serde::Serialize;

use crate::principal::errors::AuthenticationError;
use crate::principal::errors::RegistrationError;
use crate::principal::models::AccessGrant;
use crate::principal::models::Principal;

pub mod health;
pub mod login;
pub mod me;
pub mod register;

#[derive(Debug, Clone)]
pub struct ApiSuccess<T: Serialize + PartialEq>(StatusCode, Json<T>);

impl<T> PartialEq for ApiSuccess<T>
where
    T: Serialize + PartialEq,
{
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0 && self.1 .0 == other.1 .0
    }
}

impl<T: Serialize + PartialEq> ApiSuccess<T> {
    pub fn new(status: StatusCode, data: T) -> Self {
        ApiSuccess(status, Json(data))
    }
}

impl<T: Serialize + PartialEq> IntoResponse for ApiSuccess<T> {
    fn into_response(self) -> Response {
        (self.0, self.1).into_response()
    }
}

/// Error responses of the public API.
///
/// Messages are caller-facing; infrastructure detail is logged before it
/// reaches this type and never included here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    InternalServerError(String),
    BadRequest(String),
    Unauthorized(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
        };

        (status, Json(ApiErrorBody { error: message })).into_response()
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::MissingFields
            | RegistrationError::InvalidDisplayName(_)
            | RegistrationError::InvalidContactAddress(_)
            | RegistrationError::AlreadyExists(_) => ApiError::BadRequest(err.to_string()),
            RegistrationError::Store(_)
            | RegistrationError::Password(_)
            | RegistrationError::Token(_)
            | RegistrationError::Task(_) => {
                tracing::error!(error = %err, "Registration failed");
                ApiError::InternalServerError("registration failed".to_string())
            }
        }
    }
}

impl From<AuthenticationError> for ApiError {
    fn from(err: AuthenticationError) -> Self {
        match err {
            AuthenticationError::MissingFields => ApiError::BadRequest(err.to_string()),
            AuthenticationError::InvalidCredentials => ApiError::Unauthorized(err.to_string()),
            AuthenticationError::Store(_)
            | AuthenticationError::Token(_)
            | AuthenticationError::Task(_) => {
                tracing::error!(error = %err, "Login failed");
                ApiError::InternalServerError("login failed".to_string())
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
}

/// Public view of a principal. Never carries the secret hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserData {
    pub id: i64,
    pub username: String,
    pub email: String,
}

impl From<&Principal> for UserData {
    fn from(principal: &Principal) -> Self {
        Self {
            id: principal.id.as_i64(),
            username: principal.display_name.as_str().to_string(),
            email: principal.contact_address.as_str().to_string(),
        }
    }
}

/// Body shared by successful registration and login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GrantResponseData {
    pub message: String,
    pub token: String,
    pub user: UserData,
}

impl GrantResponseData {
    pub fn new(message: &str, grant: AccessGrant) -> Self {
        Self {
            message: message.to_string(),
            user: (&grant.principal).into(),
            token: grant.token,
        }
    }
}
