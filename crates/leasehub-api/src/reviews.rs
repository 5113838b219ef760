use axum::{Extension, Json, extract::State, response::IntoResponse};
use uuid::Uuid;

use leasehub_types::api::{Claims, ReviewRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::view::review_view;

/// POST /reviews — one review per user; a resubmission replaces the old one.
pub async fn post_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let comment_chars = req.comment.chars().count();
    if comment_chars < 5 || comment_chars > 500 {
        return Err(ApiError::Validation(
            "review comment must be 5-500 characters".into(),
        ));
    }

    state
        .db
        .upsert_review(&Uuid::new_v4().to_string(), &claims.username, &req.comment)?;

    let rows = state.db.list_reviews()?;
    let reviews: Vec<_> = rows.into_iter().map(review_view).collect();
    Ok(Json(reviews))
}

pub async fn list_reviews(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_reviews()?;
    let reviews: Vec<_> = rows.into_iter().map(review_view).collect();
    Ok(Json(reviews))
}
