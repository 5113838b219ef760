use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Lease, ThreadView};

// -- JWT Claims --

/// JWT claims shared between leasehub-api (REST middleware) and the server
/// binary. Canonical definition lives here in leasehub-types to eliminate
/// duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub username: String,
    pub exp: usize,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user_id: Uuid,
    pub token: String,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: Uuid,
    pub username: String,
    pub token: String,
}

// -- Leases --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateLeaseRequest {
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub rent_per_month: i64,
    pub available_date: NaiveDate,
    pub apartment_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub additional_info: Option<String>,
}

/// All fields optional; only the ones present are written.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateLeaseRequest {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub rent_per_month: Option<i64>,
    pub available_date: Option<NaiveDate>,
    pub apartment_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LeaseSearchQuery {
    pub city: Option<String>,
    pub state: Option<String>,
    pub max_rent: Option<i64>,
}

// -- Interest / inbox --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReplyRequest {
    pub text: String,
}

/// The full per-user view returned by `GET /me` and by every interest
/// mutation: the caller's listing, expressed interests, and inbox.
#[derive(Debug, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub username: String,
    pub listed_leases: Vec<Lease>,
    pub lease_interested_in: Vec<Lease>,
    pub messages: Vec<ThreadView>,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReviewRequest {
    pub comment: String,
}

// -- Errors --

/// Stable error body shape: `code` is machine-readable, `message` human
/// readable. `partial` distinguishes "nothing happened" from "partially
/// happened"; every mutation here is transactional, so it is always false.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub partial: bool,
}
