//! In-memory event repository for tests.
//!
//! [`InMemoryEventRepository`] implements the full versioned contract of
//! [`EventRepository`] over a `BTreeMap`, and can be told to fail upcoming
//! saves with a write conflict as if another writer had just committed.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Lock poisoning only follows a panicking test

use rsvp_core::event::{Event, EventId, EventSummary};
use rsvp_core::repository::{
    EventRepository, RepositoryError, RepositoryFuture, Version, Versioned,
};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Inner {
    last_id: i64,
    events: BTreeMap<EventId, Versioned<Event>>,
    pending_conflicts: usize,
    loads: usize,
    saves: usize,
}

/// In-memory repository for fast, deterministic testing.
///
/// Clones share the same storage.
///
/// # Example
///
/// ```
/// use rsvp_core::repository::{EventRepository, RepositoryError};
/// use rsvp_testing::InMemoryEventRepository;
///
/// # async fn example() -> Result<(), RepositoryError> {
/// let repo = InMemoryEventRepository::new();
/// let event = repo.insert("Launch".to_string()).await?;
/// let snapshot = repo.load(event.id()).await?.unwrap();
///
/// // The next save fails as though someone else wrote first.
/// repo.inject_conflicts(1);
/// let result = repo.save(snapshot.value.clone(), snapshot.version).await;
/// assert!(matches!(result, Err(RepositoryError::Conflict { .. })));
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryEventRepository {
    inner: Arc<RwLock<Inner>>,
}

impl InMemoryEventRepository {
    /// Create a new empty repository
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail the next `count` saves with a write conflict.
    ///
    /// Each injected conflict bumps the stored version, so the retrying
    /// writer has to re-read before it can commit.
    pub fn inject_conflicts(&self, count: usize) {
        self.inner.write().unwrap().pending_conflicts += count;
    }

    /// Injected conflicts not yet consumed
    #[must_use]
    pub fn pending_conflicts(&self) -> usize {
        self.inner.read().unwrap().pending_conflicts
    }

    /// Number of `load` calls so far
    #[must_use]
    pub fn load_count(&self) -> usize {
        self.inner.read().unwrap().loads
    }

    /// Number of `save` calls so far, failed ones included
    #[must_use]
    pub fn save_count(&self) -> usize {
        self.inner.read().unwrap().saves
    }

    /// Current version of an event, if it exists
    #[must_use]
    pub fn version_of(&self, id: EventId) -> Option<Version> {
        self.inner.read().unwrap().events.get(&id).map(|e| e.version)
    }

    /// Number of stored events
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().unwrap().events.len()
    }

    /// Check if no events are stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().unwrap().events.is_empty()
    }

    /// Drop all events and counters
    pub fn clear(&self) {
        *self.inner.write().unwrap() = Inner::default();
    }

    fn save_now(&self, event: Event, expected: Version) -> Result<Version, RepositoryError> {
        let mut guard = self.inner.write().unwrap();
        let inner = &mut *guard;
        inner.saves += 1;

        let event_id = event.id();
        let stored = inner
            .events
            .get_mut(&event_id)
            .ok_or(RepositoryError::NotFound(event_id))?;

        if inner.pending_conflicts > 0 {
            inner.pending_conflicts -= 1;
            stored.version = stored.version.next();
        }

        if stored.version != expected {
            return Err(RepositoryError::Conflict {
                event_id,
                expected,
                actual: stored.version,
            });
        }

        let version = expected.next();
        *stored = Versioned::new(event, version);
        Ok(version)
    }
}

impl EventRepository for InMemoryEventRepository {
    fn insert(&self, name: String) -> RepositoryFuture<'_, Event> {
        let event = {
            let mut inner = self.inner.write().unwrap();
            inner.last_id += 1;
            let event = Event::new(EventId::new(inner.last_id), name);
            inner
                .events
                .insert(event.id(), Versioned::new(event.clone(), Version::INITIAL));
            event
        };
        Box::pin(async move { Ok(event) })
    }

    fn load(&self, id: EventId) -> RepositoryFuture<'_, Option<Versioned<Event>>> {
        let snapshot = {
            let mut inner = self.inner.write().unwrap();
            inner.loads += 1;
            inner.events.get(&id).cloned()
        };
        Box::pin(async move { Ok(snapshot) })
    }

    fn save(&self, event: Event, expected_version: Version) -> RepositoryFuture<'_, Version> {
        let result = self.save_now(event, expected_version);
        Box::pin(async move { result })
    }

    fn delete(&self, id: EventId) -> RepositoryFuture<'_, ()> {
        let removed = self.inner.write().unwrap().events.remove(&id);
        Box::pin(async move {
            removed
                .map(|_| ())
                .ok_or(RepositoryError::NotFound(id))
        })
    }

    fn list_summaries(&self) -> RepositoryFuture<'_, Vec<EventSummary>> {
        let summaries: Vec<EventSummary> = self
            .inner
            .read()
            .unwrap()
            .events
            .values()
            .map(|stored| stored.value.summary())
            .collect();
        Box::pin(async move { Ok(summaries) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_assigns_increasing_ids_at_initial_version() {
        let repo = InMemoryEventRepository::new();
        let a = repo.insert("A".to_string()).await.unwrap();
        let b = repo.insert("B".to_string()).await.unwrap();

        assert!(a.id() < b.id());
        assert_eq!(repo.version_of(a.id()), Some(Version::INITIAL));
        assert_eq!(repo.len(), 2);
    }

    #[tokio::test]
    async fn stale_save_conflicts() {
        let repo = InMemoryEventRepository::new();
        let event = repo.insert("A".to_string()).await.unwrap();
        let first = repo.load(event.id()).await.unwrap().unwrap();
        let second = repo.load(event.id()).await.unwrap().unwrap();

        repo.save(first.value, first.version).await.unwrap();
        let result = repo.save(second.value, second.version).await;

        assert_eq!(
            result,
            Err(RepositoryError::Conflict {
                event_id: event.id(),
                expected: Version::INITIAL,
                actual: Version::new(2),
            })
        );
    }

    #[tokio::test]
    async fn injected_conflicts_are_consumed_in_order() {
        let repo = InMemoryEventRepository::new();
        let event = repo.insert("A".to_string()).await.unwrap();
        repo.inject_conflicts(1);

        let stale = repo.load(event.id()).await.unwrap().unwrap();
        assert!(repo.save(stale.value, stale.version).await.is_err());
        assert_eq!(repo.pending_conflicts(), 0);

        let fresh = repo.load(event.id()).await.unwrap().unwrap();
        assert_eq!(fresh.version, Version::new(2));
        assert_eq!(repo.save(fresh.value, fresh.version).await, Ok(Version::new(3)));
        assert_eq!(repo.save_count(), 2);
        assert_eq!(repo.load_count(), 2);
    }

    #[tokio::test]
    async fn save_and_delete_of_missing_event_are_not_found() {
        let repo = InMemoryEventRepository::new();
        let ghost = Event::new(EventId::new(7), "Ghost");

        assert_eq!(
            repo.save(ghost, Version::INITIAL).await,
            Err(RepositoryError::NotFound(EventId::new(7)))
        );
        assert_eq!(
            repo.delete(EventId::new(7)).await,
            Err(RepositoryError::NotFound(EventId::new(7)))
        );
    }

    #[tokio::test]
    async fn summaries_are_ordered_by_id() {
        let repo = InMemoryEventRepository::new();
        for name in ["c", "a", "b"] {
            repo.insert(name.to_string()).await.unwrap();
        }

        let names: Vec<String> = repo
            .list_summaries()
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, ["c", "a", "b"]);
    }

    #[tokio::test]
    async fn clear_resets_everything() {
        let repo = InMemoryEventRepository::new();
        repo.insert("A".to_string()).await.unwrap();
        repo.inject_conflicts(3);
        repo.clear();

        assert!(repo.is_empty());
        assert_eq!(repo.pending_conflicts(), 0);
    }
}
