//! Row-to-API conversions. SQLite hands back TEXT ids and timestamps; the
//! API speaks UUIDs and RFC 3339. Corrupt values are logged and defaulted
//! rather than failing the whole response, matching how reads degrade
//! elsewhere in the stack.

use chrono::{DateTime, NaiveDate, Utc};
use tracing::warn;
use uuid::Uuid;

use leasehub_db::models::{LeaseRow, ReviewRow, ThreadDetail, UserRow};
use leasehub_db::{Database, Result};
use leasehub_types::api::UserView;
use leasehub_types::models::{Direction, Lease, Review, ThreadEntryView, ThreadView};

pub fn parse_id(raw: &str, what: &str) -> Uuid {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {what} id '{raw}': {e}");
        Uuid::default()
    })
}

pub fn parse_timestamp(raw: &str, what: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without
            // timezone. Parse as naive UTC and convert.
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt {what} timestamp '{raw}': {e}");
            DateTime::default()
        })
}

fn parse_date(raw: &str, what: &str) -> NaiveDate {
    raw.parse().unwrap_or_else(|e| {
        warn!("Corrupt {what} date '{raw}': {e}");
        NaiveDate::default()
    })
}

pub fn lease_view(row: LeaseRow) -> Lease {
    Lease {
        id: parse_id(&row.id, "lease"),
        owner_id: parse_id(&row.owner_id, "owner"),
        owner_username: row.owner_username,
        name: row.name,
        address: row.address,
        city: row.city,
        state: row.state,
        zip_code: row.zip_code,
        rent_per_month: row.rent_per_month,
        available_date: parse_date(&row.available_date, "lease"),
        apartment_type: row.apartment_type,
        latitude: row.latitude,
        longitude: row.longitude,
        additional_info: row.additional_info,
        created_at: parse_timestamp(&row.created_at, "lease"),
    }
}

/// Projects a shared thread onto one participant's view: entries sent by the
/// viewer are `sent`, everything else `received`.
pub fn thread_view(detail: ThreadDetail, viewer_id: &str) -> ThreadView {
    let counterpart = if detail.thread.initiator_id == viewer_id {
        detail.recipient_username
    } else {
        detail.initiator_username
    };

    let conversation = detail
        .entries
        .into_iter()
        .map(|entry| ThreadEntryView {
            direction: if entry.sender_id == viewer_id {
                Direction::Sent
            } else {
                Direction::Received
            },
            text: entry.body,
            created_at: parse_timestamp(&entry.created_at, "thread entry"),
        })
        .collect();

    ThreadView {
        id: parse_id(&detail.thread.id, "thread"),
        title: detail.thread.title,
        counterpart,
        lease_id: detail.thread.lease_id.as_deref().map(|id| parse_id(id, "lease")),
        conversation,
        created_at: parse_timestamp(&detail.thread.created_at, "thread"),
    }
}

pub fn review_view(row: ReviewRow) -> Review {
    Review {
        id: parse_id(&row.id, "review"),
        reviewer: row.reviewer,
        comment: row.comment,
        created_at: parse_timestamp(&row.created_at, "review"),
    }
}

/// Assembles the full per-user view: profile, listed lease, interests, inbox.
pub fn user_view(db: &Database, user: UserRow) -> Result<UserView> {
    let listed = db.leases_by_owner(&user.id)?;
    let interests = db.interests_for_user(&user.id)?;
    let threads = db.threads_for_user(&user.id)?;

    Ok(UserView {
        id: parse_id(&user.id, "user"),
        username: user.username,
        listed_leases: listed.into_iter().map(lease_view).collect(),
        lease_interested_in: interests.into_iter().map(lease_view).collect(),
        messages: threads
            .into_iter()
            .map(|detail| thread_view(detail, &user.id))
            .collect(),
    })
}
