use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lease {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub owner_username: String,
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
    pub created_at: DateTime<Utc>,
}

/// Direction of a thread entry relative to the user viewing it. The same
/// entry renders as `Sent` to its author and `Received` to the other
/// participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Sent,
    Received,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadEntryView {
    pub direction: Direction,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// One participant's view of a message thread. Threads are stored once and
/// projected per viewer, so both sides always see the same conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadView {
    pub id: Uuid,
    pub title: String,
    pub counterpart: String,
    pub lease_id: Option<Uuid>,
    pub conversation: Vec<ThreadEntryView>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub reviewer: String,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}
