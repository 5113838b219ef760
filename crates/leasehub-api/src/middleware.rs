use axum::{
    extract::Request,
    http::header,
    middleware::Next,
    response::Response,
};
use jsonwebtoken::{DecodingKey, Validation, decode};

use leasehub_types::api::Claims;

use crate::error::ApiError;

/// Extract and validate JWT from Authorization header. An unresolved
/// identity rejects here, before any handler can touch state.
pub async fn require_auth(mut req: Request, next: Next) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(ApiError::Auth("missing authorization header"))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(ApiError::Auth("malformed authorization header"))?;

    let secret =
        std::env::var("LEASEHUB_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| ApiError::Auth("invalid token"))?;

    req.extensions_mut().insert(token_data.claims);
    Ok(next.run(req).await)
}
