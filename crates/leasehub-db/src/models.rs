/// Database row types — these map directly to SQLite rows.
/// Distinct from leasehub-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub created_at: String,
}

/// Insert payload for a new listing.
pub struct NewLease<'a> {
    pub id: &'a str,
    pub owner_id: &'a str,
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub city: &'a str,
    pub state: &'a str,
    pub zip_code: &'a str,
    pub rent_per_month: i64,
    pub available_date: &'a str,
    pub apartment_type: Option<&'a str>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub additional_info: Option<&'a str>,
}

pub struct LeaseRow {
    pub id: String,
    pub owner_id: String,
    pub owner_username: String,
    pub name: String,
    pub address: Option<String>,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub rent_per_month: i64,
    pub available_date: String,
    pub apartment_type: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub additional_info: Option<String>,
    pub created_at: String,
}

pub struct ThreadRow {
    pub id: String,
    pub lease_id: Option<String>,
    pub initiator_id: String,
    pub recipient_id: String,
    pub title: String,
    pub created_at: String,
}

pub struct ThreadEntryRow {
    pub id: String,
    pub thread_id: String,
    pub sender_id: String,
    pub body: String,
    pub created_at: String,
}

/// A thread with both participant usernames resolved and its entries in
/// append order.
pub struct ThreadDetail {
    pub thread: ThreadRow,
    pub initiator_username: String,
    pub recipient_username: String,
    pub entries: Vec<ThreadEntryRow>,
}

pub struct ReviewRow {
    pub id: String,
    pub reviewer: String,
    pub comment: String,
    pub created_at: String,
}
