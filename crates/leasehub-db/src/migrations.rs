use rusqlite::Connection;
use tracing::info;

use crate::Result;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS leases (
            id              TEXT PRIMARY KEY,
            owner_id        TEXT NOT NULL REFERENCES users(id),
            name            TEXT NOT NULL,
            address         TEXT,
            city            TEXT NOT NULL,
            state           TEXT NOT NULL,
            zip_code        TEXT NOT NULL,
            rent_per_month  INTEGER NOT NULL,
            available_date  TEXT NOT NULL,
            apartment_type  TEXT,
            latitude        REAL,
            longitude       REAL,
            additional_info TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_leases_owner
            ON leases(owner_id);

        -- Reverse lookup lease -> interested users; the UNIQUE constraint
        -- backs the duplicate-interest guard even under concurrent writes.
        CREATE TABLE IF NOT EXISTS interests (
            id          TEXT PRIMARY KEY,
            lease_id    TEXT NOT NULL REFERENCES leases(id),
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(lease_id, user_id)
        );

        CREATE INDEX IF NOT EXISTS idx_interests_lease
            ON interests(lease_id);

        CREATE INDEX IF NOT EXISTS idx_interests_user
            ON interests(user_id);

        -- One thread row per interest event, shared by both participants.
        -- lease_id goes NULL when the lease is delisted; conversations are
        -- never retracted.
        CREATE TABLE IF NOT EXISTS threads (
            id              TEXT PRIMARY KEY,
            lease_id        TEXT REFERENCES leases(id) ON DELETE SET NULL,
            initiator_id    TEXT NOT NULL REFERENCES users(id),
            recipient_id    TEXT NOT NULL REFERENCES users(id),
            title           TEXT NOT NULL,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_threads_initiator
            ON threads(initiator_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_threads_recipient
            ON threads(recipient_id, created_at);

        -- Append-only; rowid order is append order.
        CREATE TABLE IF NOT EXISTS thread_entries (
            id          TEXT PRIMARY KEY,
            thread_id   TEXT NOT NULL REFERENCES threads(id),
            sender_id   TEXT NOT NULL REFERENCES users(id),
            body        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_entries_thread
            ON thread_entries(thread_id);

        -- One site review per reviewer, upserted in place.
        CREATE TABLE IF NOT EXISTS reviews (
            id          TEXT PRIMARY KEY,
            reviewer    TEXT NOT NULL UNIQUE,
            comment     TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
