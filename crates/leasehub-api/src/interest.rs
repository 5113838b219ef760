use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use leasehub_db::{Database, StoreError};
use leasehub_types::api::{Claims, UserView};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::view::user_view;

/// POST /leases/{lease_id}/interest — register interest and open the message
/// thread with the owner. Both effects land in one transaction; the guards
/// (own listing, duplicate) reject before anything is written.
pub async fn express_interest(
    State(state): State<AppState>,
    Path(lease_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let lid = lease_id.to_string();
    let view = tokio::task::spawn_blocking(move || {
        db.db.express_interest(&uid, &lid)?;
        load_view(&db.db, &uid)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {e}");
        ApiError::Internal
    })??;

    info!("user {} expressed interest in lease {}", claims.username, lease_id);

    Ok((StatusCode::CREATED, Json(view)))
}

/// DELETE /leases/{lease_id}/interest — withdraw. Idempotent; withdrawing an
/// absent interest succeeds. The greeting thread is left as-is.
pub async fn withdraw_interest(
    State(state): State<AppState>,
    Path(lease_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let lid = lease_id.to_string();
    let view = tokio::task::spawn_blocking(move || {
        db.db.withdraw_interest(&uid, &lid)?;
        load_view(&db.db, &uid)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {e}");
        ApiError::Internal
    })??;

    Ok(Json(view))
}

/// The refreshed acting-user view both mutations return.
fn load_view(db: &Database, user_id: &str) -> leasehub_db::Result<UserView> {
    let user = db
        .get_user_by_id(user_id)?
        .ok_or(StoreError::NotFound("user"))?;
    user_view(db, user)
}
