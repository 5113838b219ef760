//! The interest/inbox coordinator: the operations that keep a user's
//! listing, expressed interests, and message threads mutually consistent.
//!
//! Every multi-row mutation here runs inside a single SQLite transaction, so
//! a request either fully lands or leaves no trace. Guards run first and
//! write nothing. Threads are stored once with two participants; each side
//! sees entries as `sent` or `received` relative to itself, so the two views
//! can never drift apart.

use std::collections::HashMap;

use rusqlite::{Connection, OptionalExtension, Transaction};
use uuid::Uuid;

use crate::models::{LeaseRow, ThreadDetail, ThreadEntryRow, ThreadRow};
use crate::queries::map_lease_row;
use crate::{Database, Result, StoreError};

impl Database {
    /// Registers `user_id`'s interest in `lease_id` and opens the message
    /// thread between the two parties.
    ///
    /// Guard order matters: self-interest is checked before duplication, so
    /// an owner poking their own listing always gets `SelfInterest`.
    /// Returns the new thread id.
    pub fn express_interest(&self, user_id: &str, lease_id: &str) -> Result<String> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let username = username_of(&tx, user_id)?.ok_or(StoreError::NotFound("user"))?;

            let (owner_id, lease_name): (String, String) = tx
                .query_row(
                    "SELECT owner_id, name FROM leases WHERE id = ?1",
                    [lease_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or(StoreError::NotFound("lease"))?;

            if owner_id == user_id {
                return Err(StoreError::SelfInterest);
            }

            let already: i64 = tx.query_row(
                "SELECT COUNT(*) FROM interests WHERE lease_id = ?1 AND user_id = ?2",
                [lease_id, user_id],
                |row| row.get(0),
            )?;
            if already > 0 {
                return Err(StoreError::DuplicateInterest);
            }

            tx.execute(
                "INSERT INTO interests (id, lease_id, user_id) VALUES (?1, ?2, ?3)",
                (Uuid::new_v4().to_string(), lease_id, user_id),
            )?;

            let thread_id = Uuid::new_v4().to_string();
            let title = format!("From {username}: {lease_name}");
            tx.execute(
                "INSERT INTO threads (id, lease_id, initiator_id, recipient_id, title) \
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                (&thread_id, lease_id, user_id, &owner_id, &title),
            )?;

            let greeting = format!(
                "Hi, I'm {username} and I'm interested in your listing \"{lease_name}\". \
                 Is it still available?"
            );
            tx.execute(
                "INSERT INTO thread_entries (id, thread_id, sender_id, body) \
                 VALUES (?1, ?2, ?3, ?4)",
                (Uuid::new_v4().to_string(), &thread_id, user_id, &greeting),
            )?;

            tx.commit()?;
            Ok(thread_id)
        })
    }

    /// Removes `user_id`'s interest in `lease_id`. Idempotent: withdrawing
    /// an absent interest is a no-op success. Threads are left untouched;
    /// the greeting already sent is never retracted.
    pub fn withdraw_interest(&self, user_id: &str, lease_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "DELETE FROM interests WHERE lease_id = ?1 AND user_id = ?2",
                [lease_id, user_id],
            )?;
            Ok(())
        })
    }

    /// Delists a lease: drops every interest referencing it (one indexed
    /// DELETE, no user scan) and the lease row itself. Thread lease
    /// references go NULL via the FK action; conversations survive.
    pub fn delist_lease(&self, lease_id: &str, acting_user_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let owner_id: String = tx
                .query_row("SELECT owner_id FROM leases WHERE id = ?1", [lease_id], |row| {
                    row.get(0)
                })
                .optional()?
                .ok_or(StoreError::NotFound("lease"))?;
            if owner_id != acting_user_id {
                return Err(StoreError::NotOwner);
            }

            tx.execute("DELETE FROM interests WHERE lease_id = ?1", [lease_id])?;
            tx.execute("DELETE FROM leases WHERE id = ?1", [lease_id])?;

            tx.commit()?;
            Ok(())
        })
    }

    /// Appends a reply to a thread. The receiver is derived from the thread
    /// row, never passed by the caller; a sender who is not a participant
    /// gets `ThreadNotFound`, indistinguishable from a missing thread.
    pub fn reply_in_thread(&self, sender_id: &str, thread_id: &str, text: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let (initiator_id, recipient_id): (String, String) = tx
                .query_row(
                    "SELECT initiator_id, recipient_id FROM threads WHERE id = ?1",
                    [thread_id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?
                .ok_or(StoreError::ThreadNotFound)?;

            if sender_id != initiator_id && sender_id != recipient_id {
                return Err(StoreError::ThreadNotFound);
            }

            tx.execute(
                "INSERT INTO thread_entries (id, thread_id, sender_id, body) \
                 VALUES (?1, ?2, ?3, ?4)",
                (Uuid::new_v4().to_string(), thread_id, sender_id, text),
            )?;

            tx.commit()?;
            Ok(())
        })
    }

    /// Leases the user has expressed interest in, in expression order.
    pub fn interests_for_user(&self, user_id: &str) -> Result<Vec<LeaseRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT l.id, l.owner_id, u.username, l.name, l.address, l.city, l.state, \
                        l.zip_code, l.rent_per_month, l.available_date, l.apartment_type, \
                        l.latitude, l.longitude, l.additional_info, l.created_at \
                 FROM interests i \
                 JOIN leases l ON i.lease_id = l.id \
                 JOIN users u ON l.owner_id = u.id \
                 WHERE i.user_id = ?1 \
                 ORDER BY i.rowid",
            )?;
            let rows = stmt
                .query_map([user_id], map_lease_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// All threads the user participates in, newest first, each with its
    /// entries in append order. Entries are batch-fetched in one IN query.
    pub fn threads_for_user(&self, user_id: &str) -> Result<Vec<ThreadDetail>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT t.id, t.lease_id, t.initiator_id, t.recipient_id, t.title, t.created_at, \
                        ui.username, ur.username \
                 FROM threads t \
                 JOIN users ui ON t.initiator_id = ui.id \
                 JOIN users ur ON t.recipient_id = ur.id \
                 WHERE t.initiator_id = ?1 OR t.recipient_id = ?1 \
                 ORDER BY t.created_at DESC, t.rowid DESC",
            )?;

            let mut details = stmt
                .query_map([user_id], |row| {
                    Ok(ThreadDetail {
                        thread: ThreadRow {
                            id: row.get(0)?,
                            lease_id: row.get(1)?,
                            initiator_id: row.get(2)?,
                            recipient_id: row.get(3)?,
                            title: row.get(4)?,
                            created_at: row.get(5)?,
                        },
                        initiator_username: row.get(6)?,
                        recipient_username: row.get(7)?,
                        entries: Vec::new(),
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            let thread_ids: Vec<String> = details.iter().map(|d| d.thread.id.clone()).collect();
            let mut grouped = fetch_entries(conn, &thread_ids)?;
            for detail in &mut details {
                if let Some(entries) = grouped.remove(&detail.thread.id) {
                    detail.entries = entries;
                }
            }

            Ok(details)
        })
    }
}

fn username_of(tx: &Transaction<'_>, user_id: &str) -> Result<Option<String>> {
    let name = tx
        .query_row("SELECT username FROM users WHERE id = ?1", [user_id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(name)
}

/// Batch-fetch entries for a set of thread ids, grouped by thread, each group
/// in append (rowid) order.
fn fetch_entries(
    conn: &Connection,
    thread_ids: &[String],
) -> Result<HashMap<String, Vec<ThreadEntryRow>>> {
    if thread_ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders: Vec<String> = (1..=thread_ids.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "SELECT id, thread_id, sender_id, body, created_at FROM thread_entries \
         WHERE thread_id IN ({}) ORDER BY rowid",
        placeholders.join(", ")
    );

    let mut stmt = conn.prepare(&sql)?;
    let params: Vec<&dyn rusqlite::types::ToSql> = thread_ids
        .iter()
        .map(|id| id as &dyn rusqlite::types::ToSql)
        .collect();

    let mut grouped: HashMap<String, Vec<ThreadEntryRow>> = HashMap::new();
    let rows = stmt.query_map(params.as_slice(), |row| {
        Ok(ThreadEntryRow {
            id: row.get(0)?,
            thread_id: row.get(1)?,
            sender_id: row.get(2)?,
            body: row.get(3)?,
            created_at: row.get(4)?,
        })
    })?;
    for row in rows {
        let entry = row?;
        grouped.entry(entry.thread_id.clone()).or_default().push(entry);
    }

    Ok(grouped)
}
