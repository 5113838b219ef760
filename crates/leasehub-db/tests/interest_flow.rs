/// Interest/inbox coordinator tests against an in-memory database: the
/// guards, the thread opened on a successful expression, withdrawal
/// idempotence, the delist cascade, and replies.

use leasehub_db::models::NewLease;
use leasehub_db::{Database, StoreError};

fn db() -> Database {
    Database::open_in_memory().unwrap()
}

fn add_user(db: &Database, id: &str, username: &str) {
    db.create_user(id, username, "argon2-hash-not-relevant-here").unwrap();
}

fn new_lease<'a>(id: &'a str, owner_id: &'a str, name: &'a str) -> NewLease<'a> {
    NewLease {
        id,
        owner_id,
        name,
        address: None,
        city: "Austin",
        state: "TX",
        zip_code: "78701",
        rent_per_month: 1500,
        available_date: "2026-09-01",
        apartment_type: None,
        latitude: None,
        longitude: None,
        additional_info: None,
    }
}

fn add_lease(db: &Database, id: &str, owner_id: &str, name: &str) {
    db.create_lease(&new_lease(id, owner_id, name)).unwrap();
}

#[test]
fn self_interest_is_rejected_without_mutation() {
    let db = db();
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    let err = db.express_interest("u-bob", "l-1").unwrap_err();
    assert!(matches!(err, StoreError::SelfInterest));

    assert!(db.interests_for_user("u-bob").unwrap().is_empty());
    assert!(db.threads_for_user("u-bob").unwrap().is_empty());
}

#[test]
fn duplicate_interest_is_rejected_and_list_unchanged() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    db.express_interest("u-alice", "l-1").unwrap();
    let err = db.express_interest("u-alice", "l-1").unwrap_err();
    assert!(matches!(err, StoreError::DuplicateInterest));

    assert_eq!(db.interests_for_user("u-alice").unwrap().len(), 1);
    // No second thread was opened either
    assert_eq!(db.threads_for_user("u-alice").unwrap().len(), 1);
}

#[test]
fn interest_in_missing_lease_is_not_found() {
    let db = db();
    add_user(&db, "u-alice", "alice01");

    let err = db.express_interest("u-alice", "l-missing").unwrap_err();
    assert!(matches!(err, StoreError::NotFound("lease")));
}

#[test]
fn successful_interest_records_lease_and_opens_mirrored_thread() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    db.express_interest("u-alice", "l-1").unwrap();

    let interests = db.interests_for_user("u-alice").unwrap();
    assert_eq!(interests.len(), 1);
    assert_eq!(interests[0].id, "l-1");

    // Initiator's newest thread: one greeting entry, sent by alice
    let alice_threads = db.threads_for_user("u-alice").unwrap();
    assert_eq!(alice_threads.len(), 1);
    let thread = &alice_threads[0];
    assert!(thread.thread.title.starts_with("From alice01"));
    assert_eq!(thread.recipient_username, "bob2024");
    assert_eq!(thread.entries.len(), 1);
    assert_eq!(thread.entries[0].sender_id, "u-alice");
    assert!(thread.entries[0].body.contains("alice01"));
    assert!(thread.entries[0].body.contains("Maple Loft"));

    // The owner sees the very same thread and entry text
    let bob_threads = db.threads_for_user("u-bob").unwrap();
    assert_eq!(bob_threads.len(), 1);
    assert_eq!(bob_threads[0].thread.id, thread.thread.id);
    assert_eq!(bob_threads[0].entries.len(), 1);
    assert_eq!(bob_threads[0].entries[0].body, thread.entries[0].body);
    assert_ne!(bob_threads[0].entries[0].sender_id, "u-bob");
}

#[test]
fn withdraw_is_idempotent() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    db.express_interest("u-alice", "l-1").unwrap();
    db.withdraw_interest("u-alice", "l-1").unwrap();
    assert!(db.interests_for_user("u-alice").unwrap().is_empty());

    // Second withdrawal, and one for a lease never expressed: both no-ops
    db.withdraw_interest("u-alice", "l-1").unwrap();
    db.withdraw_interest("u-alice", "l-nope").unwrap();
    assert!(db.interests_for_user("u-alice").unwrap().is_empty());
}

#[test]
fn withdraw_leaves_the_thread_in_place() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    db.express_interest("u-alice", "l-1").unwrap();
    db.withdraw_interest("u-alice", "l-1").unwrap();

    assert_eq!(db.threads_for_user("u-alice").unwrap().len(), 1);
    assert_eq!(db.threads_for_user("u-bob").unwrap().len(), 1);
}

#[test]
fn delist_cascades_over_all_interested_users() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_user(&db, "u-carol", "carol_88");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");
    add_lease(&db, "l-2", "u-carol", "Pine Studio");

    db.express_interest("u-alice", "l-1").unwrap();
    db.express_interest("u-alice", "l-2").unwrap();
    db.express_interest("u-carol", "l-1").unwrap();

    db.delist_lease("l-1", "u-bob").unwrap();

    // Lease gone, every dangling interest gone, other interests intact
    assert!(db.get_lease("l-1").unwrap().is_none());
    let alice = db.interests_for_user("u-alice").unwrap();
    assert_eq!(alice.len(), 1);
    assert_eq!(alice[0].id, "l-2");
    assert!(db.interests_for_user("u-carol").unwrap().is_empty());
    assert!(db.leases_by_owner("u-bob").unwrap().is_empty());
}

#[test]
fn delist_requires_ownership() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    let err = db.delist_lease("l-1", "u-alice").unwrap_err();
    assert!(matches!(err, StoreError::NotOwner));
    assert!(db.get_lease("l-1").unwrap().is_some());

    let err = db.delist_lease("l-missing", "u-bob").unwrap_err();
    assert!(matches!(err, StoreError::NotFound("lease")));
}

#[test]
fn threads_survive_delisting() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    db.express_interest("u-alice", "l-1").unwrap();
    db.delist_lease("l-1", "u-bob").unwrap();

    let threads = db.threads_for_user("u-alice").unwrap();
    assert_eq!(threads.len(), 1);
    // The lease reference is nulled, the conversation is not retracted
    assert!(threads[0].thread.lease_id.is_none());
    assert_eq!(threads[0].entries.len(), 1);
}

#[test]
fn reply_appends_to_both_views_in_order() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    let thread_id = db.express_interest("u-alice", "l-1").unwrap();
    db.reply_in_thread("u-bob", &thread_id, "Yes, still available!").unwrap();
    db.reply_in_thread("u-alice", &thread_id, "Great, can I visit Saturday?").unwrap();

    for user in ["u-alice", "u-bob"] {
        let threads = db.threads_for_user(user).unwrap();
        let entries = &threads[0].entries;
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[1].body, "Yes, still available!");
        assert_eq!(entries[1].sender_id, "u-bob");
        assert_eq!(entries[2].body, "Great, can I visit Saturday?");
        assert_eq!(entries[2].sender_id, "u-alice");
    }
}

#[test]
fn reply_rejects_non_participants_and_missing_threads() {
    let db = db();
    add_user(&db, "u-alice", "alice01");
    add_user(&db, "u-bob", "bob2024");
    add_user(&db, "u-mallory", "mallory99");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    let thread_id = db.express_interest("u-alice", "l-1").unwrap();

    let err = db.reply_in_thread("u-mallory", &thread_id, "let me in").unwrap_err();
    assert!(matches!(err, StoreError::ThreadNotFound));

    let err = db.reply_in_thread("u-alice", "t-missing", "hello?").unwrap_err();
    assert!(matches!(err, StoreError::ThreadNotFound));

    // Nothing was appended by the failed attempts
    assert_eq!(db.threads_for_user("u-alice").unwrap()[0].entries.len(), 1);
}

#[test]
fn one_active_listing_per_user() {
    let db = db();
    add_user(&db, "u-bob", "bob2024");
    add_lease(&db, "l-1", "u-bob", "Maple Loft");

    let err = db
        .create_lease(&new_lease("l-2", "u-bob", "Second Place"))
        .unwrap_err();
    assert!(matches!(err, StoreError::ListingCapReached));
    assert_eq!(db.leases_by_owner("u-bob").unwrap().len(), 1);

    // Delisting frees the slot
    db.delist_lease("l-1", "u-bob").unwrap();
    add_lease(&db, "l-2", "u-bob", "Second Place");
}
