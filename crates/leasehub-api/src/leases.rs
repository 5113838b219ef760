use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use leasehub_db::models::NewLease;
use leasehub_types::api::{Claims, CreateLeaseRequest, LeaseSearchQuery, UpdateLeaseRequest};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::view::lease_view;

pub async fn search_leases(
    State(state): State<AppState>,
    Query(query): Query<LeaseSearchQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.search_leases(&query)?;
    let leases: Vec<_> = rows.into_iter().map(lease_view).collect();
    Ok(Json(leases))
}

pub async fn get_lease(
    State(state): State<AppState>,
    Path(lease_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_lease(&lease_id.to_string())?
        .ok_or(ApiError::NotFound("lease"))?;
    Ok(Json(lease_view(row)))
}

pub async fn create_lease(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateLeaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    validate_name(&req.name)?;
    validate_location(&req.city, &req.state, &req.zip_code)?;
    validate_rent(req.rent_per_month)?;

    let lease_id = Uuid::new_v4();
    let owner_id = claims.sub.to_string();
    let available_date = req.available_date.to_string();
    state.db.create_lease(&NewLease {
        id: &lease_id.to_string(),
        owner_id: &owner_id,
        name: &req.name,
        address: req.address.as_deref(),
        city: &req.city,
        state: &req.state,
        zip_code: &req.zip_code,
        rent_per_month: req.rent_per_month,
        available_date: &available_date,
        apartment_type: req.apartment_type.as_deref(),
        latitude: req.latitude,
        longitude: req.longitude,
        additional_info: req.additional_info.as_deref(),
    })?;

    info!("user {} listed lease {}", claims.username, lease_id);

    let row = state
        .db
        .get_lease(&lease_id.to_string())?
        .ok_or(ApiError::Internal)?;
    Ok((StatusCode::CREATED, Json(lease_view(row))))
}

pub async fn update_lease(
    State(state): State<AppState>,
    Path(lease_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateLeaseRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    if let Some(city) = &req.city {
        validate_city(city)?;
    }
    if let Some(st) = &req.state {
        validate_state(st)?;
    }
    if let Some(zip) = &req.zip_code {
        validate_zip(zip)?;
    }
    if let Some(rent) = req.rent_per_month {
        validate_rent(rent)?;
    }

    let id = lease_id.to_string();
    let existing = state.db.get_lease(&id)?.ok_or(ApiError::NotFound("lease"))?;
    if existing.owner_id != claims.sub.to_string() {
        return Err(ApiError::Forbidden("not the owner of this listing"));
    }

    state.db.update_lease(&id, &existing.owner_id, &req)?;

    let row = state.db.get_lease(&id)?.ok_or(ApiError::NotFound("lease"))?;
    Ok(Json(lease_view(row)))
}

/// Delist: removes the lease and cascades over every interest referencing
/// it. One transaction, so a failure means nothing was deleted.
pub async fn delete_lease(
    State(state): State<AppState>,
    Path(lease_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let id = lease_id.to_string();
    let actor = claims.sub.to_string();
    tokio::task::spawn_blocking(move || db.db.delist_lease(&id, &actor))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {e}");
            ApiError::Internal
        })??;

    info!("user {} delisted lease {}", claims.username, lease_id);
    Ok(Json(serde_json::json!({ "deleted": true })))
}

fn validate_name(name: &str) -> Result<(), ApiError> {
    if name.trim().is_empty() {
        return Err(ApiError::Validation("name is required".into()));
    }
    Ok(())
}

// Field limits count characters, not bytes; city names like "São Paulo"
// must not be over-counted.

fn validate_city(city: &str) -> Result<(), ApiError> {
    if city.chars().count() < 3 {
        return Err(ApiError::Validation("city must be at least 3 characters".into()));
    }
    Ok(())
}

fn validate_state(state: &str) -> Result<(), ApiError> {
    if state.chars().count() < 2 {
        return Err(ApiError::Validation("state must be at least 2 characters".into()));
    }
    Ok(())
}

fn validate_zip(zip_code: &str) -> Result<(), ApiError> {
    let chars = zip_code.chars().count();
    if chars < 5 || chars > 10 {
        return Err(ApiError::Validation("zip code must be 5-10 characters".into()));
    }
    Ok(())
}

fn validate_location(city: &str, state: &str, zip_code: &str) -> Result<(), ApiError> {
    validate_city(city)?;
    validate_state(state)?;
    validate_zip(zip_code)
}

fn validate_rent(rent: i64) -> Result<(), ApiError> {
    if rent <= 0 {
        return Err(ApiError::Validation("rent must be positive".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_short_city_and_state() {
        assert!(validate_location("ab", "CA", "94107").is_err());
        assert!(validate_location("Oakland", "C", "94107").is_err());
        assert!(validate_location("Oakland", "CA", "94107").is_ok());
    }

    #[test]
    fn zip_code_bounds() {
        assert!(validate_location("Oakland", "CA", "9410").is_err());
        assert!(validate_location("Oakland", "CA", "94107-12345").is_err());
        assert!(validate_location("Oakland", "CA", "94107-1234").is_ok());
    }

    #[test]
    fn location_limits_count_characters_not_bytes() {
        // "São" is 4 bytes but 3 characters
        assert!(validate_location("São", "SP", "01310-100").is_ok());
    }

    #[test]
    fn rent_must_be_positive() {
        assert!(validate_rent(0).is_err());
        assert!(validate_rent(-100).is_err());
        assert!(validate_rent(1450).is_ok());
    }
}
