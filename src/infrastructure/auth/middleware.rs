use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use crate::error::AppError;

pub const USER_ID_HEADER: &str = "user-id";

/// Acting user injected into request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser {
    pub user_id: Uuid,
}

/// Reads the acting user from the `User-Id` header.
///
/// Identity is asserted by the upstream gateway; this service only checks
/// that the header carries a UUID.
pub async fn acting_user_middleware(mut request: Request, next: Next) -> Result<Response, AppError> {
    let user_id = parse_user_id(
        request
            .headers()
            .get(USER_ID_HEADER)
            .map(|v| v.to_str().unwrap_or_default()),
    )?;

    request.extensions_mut().insert(ActingUser { user_id });

    Ok(next.run(request).await)
}

fn parse_user_id(header: Option<&str>) -> Result<Uuid, AppError> {
    let raw = header
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::MissingParameters("User-Id header is required".to_string()))?;

    Uuid::parse_str(raw)
        .map_err(|_| AppError::BadRequest("User-Id header must be a UUID".to_string()))
}
