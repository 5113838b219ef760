use rusqlite::{Connection, OptionalExtension};

use leasehub_types::api::{LeaseSearchQuery, UpdateLeaseRequest};

use crate::models::{LeaseRow, NewLease, ReviewRow, UserRow};
use crate::{Database, Result, StoreError};

const LEASE_COLUMNS: &str = "l.id, l.owner_id, u.username, l.name, l.address, l.city, l.state, \
     l.zip_code, l.rent_per_month, l.available_date, l.apartment_type, \
     l.latitude, l.longitude, l.additional_info, l.created_at";

impl Database {
    // -- Users --

    pub fn create_user(&self, id: &str, username: &str, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (id, username, password) VALUES (?1, ?2, ?3)",
                (id, username, password_hash),
            )?;
            Ok(())
        })
    }

    pub fn get_user_by_username(&self, username: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "username", username))
    }

    pub fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user(conn, "id", id))
    }

    // -- Leases --

    /// Creates a listing. A user holds at most one active lease; a second
    /// insert fails with `ListingCapReached` before anything is written.
    pub fn create_lease(&self, lease: &NewLease<'_>) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: i64 = tx.query_row(
                "SELECT COUNT(*) FROM leases WHERE owner_id = ?1",
                [lease.owner_id],
                |row| row.get(0),
            )?;
            if existing > 0 {
                return Err(StoreError::ListingCapReached);
            }

            tx.execute(
                "INSERT INTO leases (id, owner_id, name, address, city, state, zip_code, \
                 rent_per_month, available_date, apartment_type, latitude, longitude, additional_info) \
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                rusqlite::params![
                    lease.id,
                    lease.owner_id,
                    lease.name,
                    lease.address,
                    lease.city,
                    lease.state,
                    lease.zip_code,
                    lease.rent_per_month,
                    lease.available_date,
                    lease.apartment_type,
                    lease.latitude,
                    lease.longitude,
                    lease.additional_info
                ],
            )?;

            tx.commit()?;
            Ok(())
        })
    }

    pub fn get_lease(&self, id: &str) -> Result<Option<LeaseRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {LEASE_COLUMNS} FROM leases l JOIN users u ON l.owner_id = u.id WHERE l.id = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], map_lease_row).optional()?;
            Ok(row)
        })
    }

    pub fn leases_by_owner(&self, owner_id: &str) -> Result<Vec<LeaseRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {LEASE_COLUMNS} FROM leases l JOIN users u ON l.owner_id = u.id \
                 WHERE l.owner_id = ?1 ORDER BY l.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id], map_lease_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Listing search with optional filters. Filters are ANDed; an empty
    /// query returns every listing, newest first.
    pub fn search_leases(&self, query: &LeaseSearchQuery) -> Result<Vec<LeaseRow>> {
        self.with_conn(|conn| {
            let mut sql = format!(
                "SELECT {LEASE_COLUMNS} FROM leases l JOIN users u ON l.owner_id = u.id WHERE 1=1"
            );
            let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(city) = &query.city {
                params.push(Box::new(city.clone()));
                sql.push_str(&format!(" AND l.city = ?{} COLLATE NOCASE", params.len()));
            }
            if let Some(state) = &query.state {
                params.push(Box::new(state.clone()));
                sql.push_str(&format!(" AND l.state = ?{} COLLATE NOCASE", params.len()));
            }
            if let Some(max_rent) = query.max_rent {
                params.push(Box::new(max_rent));
                sql.push_str(&format!(" AND l.rent_per_month <= ?{}", params.len()));
            }
            sql.push_str(" ORDER BY l.created_at DESC");

            let mut stmt = conn.prepare(&sql)?;
            let param_refs: Vec<&dyn rusqlite::types::ToSql> =
                params.iter().map(|p| p.as_ref()).collect();
            let rows = stmt
                .query_map(param_refs.as_slice(), map_lease_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Applies a partial update to an owned lease. Fails with `NotFound` if
    /// the lease does not exist or is not owned by `owner_id`.
    pub fn update_lease(&self, id: &str, owner_id: &str, patch: &UpdateLeaseRequest) -> Result<()> {
        self.with_conn(|conn| {
            let mut sets: Vec<String> = Vec::new();
            let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            let mut set = |column: &str, value: Box<dyn rusqlite::types::ToSql>| {
                params.push(value);
                sets.push(format!("{} = ?{}", column, params.len()));
            };

            if let Some(v) = &patch.name {
                set("name", Box::new(v.clone()));
            }
            if let Some(v) = &patch.address {
                set("address", Box::new(v.clone()));
            }
            if let Some(v) = &patch.city {
                set("city", Box::new(v.clone()));
            }
            if let Some(v) = &patch.state {
                set("state", Box::new(v.clone()));
            }
            if let Some(v) = &patch.zip_code {
                set("zip_code", Box::new(v.clone()));
            }
            if let Some(v) = patch.rent_per_month {
                set("rent_per_month", Box::new(v));
            }
            if let Some(v) = patch.available_date {
                set("available_date", Box::new(v.to_string()));
            }
            if let Some(v) = &patch.apartment_type {
                set("apartment_type", Box::new(v.clone()));
            }
            if let Some(v) = patch.latitude {
                set("latitude", Box::new(v));
            }
            if let Some(v) = patch.longitude {
                set("longitude", Box::new(v));
            }
            if let Some(v) = &patch.additional_info {
                set("additional_info", Box::new(v.clone()));
            }

            if sets.is_empty() {
                // Nothing to write; still report NotFound for a bad id.
                let exists: i64 = conn.query_row(
                    "SELECT COUNT(*) FROM leases WHERE id = ?1 AND owner_id = ?2",
                    [id, owner_id],
                    |row| row.get(0),
                )?;
                if exists == 0 {
                    return Err(StoreError::NotFound("lease"));
                }
                return Ok(());
            }

            params.push(Box::new(id.to_string()));
            let id_pos = params.len();
            params.push(Box::new(owner_id.to_string()));
            let owner_pos = params.len();

            let sql = format!(
                "UPDATE leases SET {} WHERE id = ?{} AND owner_id = ?{}",
                sets.join(", "),
                id_pos,
                owner_pos
            );
            let param_refs: Vec<&dyn rusqlite::types::ToSql> =
                params.iter().map(|p| p.as_ref()).collect();
            let changed = conn.execute(&sql, param_refs.as_slice())?;
            if changed == 0 {
                return Err(StoreError::NotFound("lease"));
            }
            Ok(())
        })
    }

    // -- Reviews --

    /// One review per reviewer: inserts on first submission, replaces the
    /// comment on subsequent ones.
    pub fn upsert_review(&self, id: &str, reviewer: &str, comment: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO reviews (id, reviewer, comment) VALUES (?1, ?2, ?3) \
                 ON CONFLICT(reviewer) DO UPDATE SET \
                 comment = excluded.comment, created_at = datetime('now')",
                (id, reviewer, comment),
            )?;
            Ok(())
        })
    }

    pub fn list_reviews(&self) -> Result<Vec<ReviewRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, reviewer, comment, created_at FROM reviews ORDER BY created_at DESC",
            )?;
            let rows = stmt
                .query_map([], |row| {
                    Ok(ReviewRow {
                        id: row.get(0)?,
                        reviewer: row.get(1)?,
                        comment: row.get(2)?,
                        created_at: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

fn query_user(conn: &Connection, column: &str, value: &str) -> Result<Option<UserRow>> {
    // column is a compile-time constant ("id" or "username"), never input
    let sql = format!("SELECT id, username, password, created_at FROM users WHERE {column} = ?1");
    let mut stmt = conn.prepare(&sql)?;

    let row = stmt
        .query_row([value], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                username: row.get(1)?,
                password: row.get(2)?,
                created_at: row.get(3)?,
            })
        })
        .optional()?;

    Ok(row)
}

pub(crate) fn map_lease_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<LeaseRow> {
    Ok(LeaseRow {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        owner_username: row.get(2)?,
        name: row.get(3)?,
        address: row.get(4)?,
        city: row.get(5)?,
        state: row.get(6)?,
        zip_code: row.get(7)?,
        rent_per_month: row.get(8)?,
        available_date: row.get(9)?,
        apartment_type: row.get(10)?,
        latitude: row.get(11)?,
        longitude: row.get(12)?,
        additional_info: row.get(13)?,
        created_at: row.get(14)?,
    })
}
