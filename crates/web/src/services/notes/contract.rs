//! Behaviour every [`NoteStore`] backend must share.
//!
//! Each backend's test module calls these against its own store. Owners get a
//! unique suffix so runs against a shared database do not see each other.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::time::Duration;

use notetaker_core::{NoteId, Username};

use super::{NoteError, NoteStore};

fn fresh_owner(name: &str) -> Username {
    Username::parse(&format!("{name}-{}", NoteId::generate())).unwrap()
}

/// Keeps consecutive timestamps apart on coarse clocks.
async fn tick() {
    tokio::time::sleep(Duration::from_millis(5)).await;
}

fn contents(notes: &[crate::models::Note]) -> Vec<&str> {
    notes.iter().map(|note| note.content.as_str()).collect()
}

pub async fn create_then_read(store: &dyn NoteStore) {
    let owner = fresh_owner("alice");
    let id = store.create(&owner, "hello world").await.unwrap();

    let note = store.read(&id).await.unwrap();
    assert_eq!(note.id, id);
    assert_eq!(note.owner, owner);
    assert_eq!(note.content, "hello world");
    assert_eq!(note.view_count, 0);
    assert_eq!(note.created_at, note.last_modified_at);
}

pub async fn record_view_counts_each_call(store: &dyn NoteStore) {
    let owner = fresh_owner("alice");
    let id = store.create(&owner, "popular").await.unwrap();

    for _ in 0..3 {
        store.record_view(&id).await.unwrap();
    }

    assert_eq!(store.read(&id).await.unwrap().view_count, 3);
}

pub async fn missing_note_is_not_found(store: &dyn NoteStore) {
    let owner = fresh_owner("alice");
    let kept = store.create(&owner, "kept").await.unwrap();
    let missing = NoteId::generate();

    assert!(matches!(store.read(&missing).await, Err(NoteError::NotFound(id)) if id == missing));
    assert!(matches!(
        store.update(&missing, "x").await,
        Err(NoteError::NotFound(_))
    ));
    assert!(matches!(
        store.record_view(&missing).await,
        Err(NoteError::NotFound(_))
    ));
    assert!(matches!(
        store.delete(&missing).await,
        Err(NoteError::NotFound(_))
    ));

    let note = store.read(&kept).await.unwrap();
    assert_eq!(note.content, "kept");
    assert_eq!(note.view_count, 0);
    assert_eq!(store.list_by_owner(&owner).await.unwrap().len(), 1);
}

pub async fn update_refreshes_modification_time(store: &dyn NoteStore) {
    let owner = fresh_owner("alice");
    let id = store.create(&owner, "old").await.unwrap();
    let before = store.read(&id).await.unwrap();

    tick().await;
    store.update(&id, "new").await.unwrap();

    let after = store.read(&id).await.unwrap();
    assert_eq!(after.content, "new");
    assert!(after.last_modified_at >= before.last_modified_at);
    assert_eq!(after.created_at, before.created_at);
    assert_eq!(after.owner, before.owner);
}

pub async fn delete_keeps_order_of_the_rest(store: &dyn NoteStore) {
    let owner = fresh_owner("alice");
    store.create(&owner, "first").await.unwrap();
    tick().await;
    let second = store.create(&owner, "second").await.unwrap();
    tick().await;
    store.create(&owner, "third").await.unwrap();

    store.delete(&second).await.unwrap();

    assert!(matches!(
        store.read(&second).await,
        Err(NoteError::NotFound(_))
    ));
    let notes = store.list_by_owner(&owner).await.unwrap();
    assert_eq!(contents(&notes), vec!["third", "first"]);
}

pub async fn list_is_scoped_to_owner(store: &dyn NoteStore) {
    let alice = fresh_owner("alice");
    let bob = fresh_owner("bob");
    let nobody = fresh_owner("carol");

    store.create(&alice, "alice's").await.unwrap();
    store.create(&bob, "bob's").await.unwrap();

    let notes = store.list_by_owner(&alice).await.unwrap();
    assert_eq!(contents(&notes), vec!["alice's"]);
    assert!(store.list_by_owner(&nobody).await.unwrap().is_empty());
}

pub async fn list_orders_by_last_modification(store: &dyn NoteStore) {
    let owner = fresh_owner("alice");
    let a = store.create(&owner, "a").await.unwrap();
    tick().await;
    store.create(&owner, "b").await.unwrap();
    tick().await;
    store.create(&owner, "c").await.unwrap();

    let notes = store.list_by_owner(&owner).await.unwrap();
    assert_eq!(contents(&notes), vec!["c", "b", "a"]);

    tick().await;
    store.update(&a, "a2").await.unwrap();

    let notes = store.list_by_owner(&owner).await.unwrap();
    assert_eq!(contents(&notes), vec!["a2", "c", "b"]);
}

pub async fn buy_milk_scenario(store: &dyn NoteStore) {
    let alice = fresh_owner("alice");
    let id = store.create(&alice, "buy milk").await.unwrap();

    let notes = store.list_by_owner(&alice).await.unwrap();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].content, "buy milk");
    assert_eq!(notes[0].view_count, 0);

    store.read(&id).await.unwrap();
    store.record_view(&id).await.unwrap();
    assert_eq!(store.read(&id).await.unwrap().view_count, 1);

    store.delete(&id).await.unwrap();
    assert!(store.list_by_owner(&alice).await.unwrap().is_empty());
}
