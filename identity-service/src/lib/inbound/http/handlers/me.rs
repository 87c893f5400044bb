use axum::http::StatusCode;
use axum::Extension;
use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;

use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedPrincipal;

/// Echo the identity asserted by the caller's bearer token.
pub async fn me(
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiSuccess<MeResponseData> {
    ApiSuccess::new(
        StatusCode::OK,
        MeResponseData {
            user: TokenUserData {
                id: principal.principal_id.as_i64(),
                email: principal.email,
            },
            expires_at: principal.expires_at,
        },
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MeResponseData {
    pub user: TokenUserData,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenUserData {
    pub id: i64,
    pub email: String,
}
