use std::sync::Arc;

use auth::TokenIssuer;
use axum::extract::Request;
use axum::extract::State;
use axum::http;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use chrono::DateTime;
use chrono::Utc;

use crate::inbound::http::handlers::ApiError;
use crate::principal::models::PrincipalId;

/// Extension type to store the token's identity in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal {
    pub principal_id: PrincipalId,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

/// Middleware that validates bearer tokens and adds the asserted identity to request extensions
pub async fn authenticate(
    State(token_issuer): State<Arc<TokenIssuer>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req)?;

    let claims = token_issuer.validate(token).map_err(|e| {
        tracing::warn!(error = %e, "JWT validation failed");
        unauthorized("Invalid or expired token")
    })?;

    let principal_id = claims.sub.parse::<PrincipalId>().map_err(|e| {
        tracing::error!(error = %e, "Failed to parse principal ID from token");
        unauthorized("Invalid token format")
    })?;

    let expires_at = claims.expires_at().ok_or_else(|| {
        tracing::error!(exp = claims.exp, "Token expiration out of range");
        unauthorized("Invalid token format")
    })?;

    req.extensions_mut().insert(AuthenticatedPrincipal {
        principal_id,
        email: claims.email,
        expires_at,
    });

    Ok(next.run(req).await)
}

fn extract_token_from_header(req: &Request) -> Result<&str, Response> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or_else(|| unauthorized("Missing Authorization header"))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| unauthorized("Invalid Authorization header"))?;

    auth_str.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized("Invalid Authorization header format. Expected: Bearer <token>")
    })
}

fn unauthorized(message: &str) -> Response {
    ApiError::Unauthorized(message.to_string()).into_response()
}
