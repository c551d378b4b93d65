//! Tests for the in-memory repository used behind a trait object.

#![allow(clippy::unwrap_used)] // Tests can unwrap
#![allow(clippy::expect_used)] // Tests can expect

use rsvp_core::repository::{EventRepository, Version};
use rsvp_core::StoreError;
use rsvp_runtime::{EventAggregateStore, RetryPolicy};
use rsvp_testing::{InMemoryEventRepository, init_test_tracing, seeded_codes};
use std::sync::Arc;

#[tokio::test]
async fn works_as_dyn_repository() {
    init_test_tracing();
    let repo = InMemoryEventRepository::new();
    let shared: Arc<dyn EventRepository> = Arc::new(repo.clone());
    let store: EventAggregateStore =
        EventAggregateStore::with_generator(shared, RetryPolicy::immediate(4), seeded_codes(1));

    let event = store.create_event("Launch").await.unwrap();
    store.add_guest(event.id(), "Ana", "ana@x", "host@x").await.unwrap();

    // The clone shares storage with the handle behind the trait object.
    assert_eq!(repo.len(), 1);
    assert_eq!(repo.version_of(event.id()), Some(Version::new(2)));
}

#[tokio::test]
async fn conflicts_beyond_the_budget_surface_to_the_caller() {
    init_test_tracing();
    let repo = Arc::new(InMemoryEventRepository::new());
    let store = EventAggregateStore::with_generator(
        Arc::clone(&repo),
        RetryPolicy::immediate(1),
        seeded_codes(2),
    );
    let event = store.create_event("Launch").await.unwrap();
    repo.inject_conflicts(5);

    let err = store
        .rename_event(event.id(), "Renamed")
        .await
        .expect_err("two attempts cannot beat five conflicts");

    assert_eq!(
        err,
        StoreError::ConcurrencyConflict {
            event_id: event.id(),
            attempts: 2,
        }
    );
    assert!(err.is_transient());
    assert_eq!(repo.pending_conflicts(), 3);
    assert_eq!(store.get_event(event.id()).await.unwrap().name(), "Launch");
}
