use axum::{Extension, Json, extract::State, response::IntoResponse};
use tracing::error;

use leasehub_types::api::Claims;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::view::user_view;

/// GET /me — the caller's full view: listing, interests, inbox.
pub async fn get_me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let view = tokio::task::spawn_blocking(move || {
        let user = db
            .db
            .get_user_by_id(&uid)?
            .ok_or(leasehub_db::StoreError::NotFound("user"))?;
        user_view(&db.db, user)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {e}");
        ApiError::Internal
    })??;

    Ok(Json(view))
}
