use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use leasehub_types::api::{Claims, ReplyRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::view::thread_view;

const MAX_REPLY_LEN: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct InboxQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

/// GET /inbox — the caller's threads, newest first.
pub async fn get_inbox(
    State(state): State<AppState>,
    Query(query): Query<InboxQuery>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let uid = claims.sub.to_string();
    let details = tokio::task::spawn_blocking(move || db.db.threads_for_user(&uid))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {e}");
            ApiError::Internal
        })??;

    let uid = claims.sub.to_string();
    let threads: Vec<_> = details
        .into_iter()
        .take(query.limit.min(200))
        .map(|detail| thread_view(detail, &uid))
        .collect();
    Ok(Json(threads))
}

/// POST /inbox/{thread_id}/replies — append to a thread the caller
/// participates in. The other side is resolved from the thread itself.
pub async fn reply(
    State(state): State<AppState>,
    Path(thread_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReplyRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let text = req.text.trim();
    validate_reply_text(text)?;

    state
        .db
        .reply_in_thread(&claims.sub.to_string(), &thread_id.to_string(), text)?;

    // Return the caller's refreshed view of the thread
    let uid = claims.sub.to_string();
    let details = state.db.threads_for_user(&uid)?;
    let updated = details
        .into_iter()
        .find(|d| d.thread.id == thread_id.to_string())
        .ok_or(ApiError::NotFound("thread"))?;
    Ok(Json(thread_view(updated, &uid)))
}

fn validate_reply_text(text: &str) -> Result<(), ApiError> {
    if text.is_empty() {
        return Err(ApiError::Validation("reply text is required".into()));
    }
    // Characters, not bytes; a multi-byte reply is not over-counted
    if text.chars().count() > MAX_REPLY_LEN {
        return Err(ApiError::Validation(format!(
            "reply text must be at most {MAX_REPLY_LEN} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_text_bounds() {
        assert!(validate_reply_text("").is_err());
        assert!(validate_reply_text("Is it still available?").is_ok());
        assert!(validate_reply_text(&"a".repeat(1000)).is_ok());
        assert!(validate_reply_text(&"a".repeat(1001)).is_err());
    }

    #[test]
    fn reply_length_counts_characters_not_bytes() {
        // 600 CJK chars is 1800 bytes but well within the 1000-char limit
        let cjk = "房".repeat(600);
        assert!(validate_reply_text(&cjk).is_ok());
        assert!(validate_reply_text(&"房".repeat(1001)).is_err());
    }
}
