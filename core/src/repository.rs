//! Persistence trait for event aggregates.
//!
//! This module defines the storage abstraction the mutation executor runs on:
//! whole-aggregate reads and writes guarded by optimistic versioning.
//!
//! # Design
//!
//! Every stored event carries a [`Version`]. A write names the version its
//! input was read at; if another writer committed in between, the store
//! rejects it with [`RepositoryError::Conflict`] instead of overwriting. The
//! executor treats that as the signal to re-read and re-apply its transform.
//!
//! # Implementations
//!
//! - `PostgresEventRepository` (in `rsvp-postgres`): production storage
//! - `InMemoryEventRepository` (in `rsvp-testing`): fast, deterministic tests
//!   with injectable conflicts
//!
//! # Example
//!
//! ```no_run
//! use rsvp_core::event::EventId;
//! use rsvp_core::repository::{EventRepository, RepositoryError};
//!
//! async fn rename<R: EventRepository>(repo: &R, id: EventId) -> Result<(), RepositoryError> {
//!     let Some(snapshot) = repo.load(id).await? else {
//!         return Err(RepositoryError::NotFound(id));
//!     };
//!     let mut event = snapshot.value;
//!     event.rename("Renamed");
//!
//!     // Fails with Conflict if someone else wrote since `load`.
//!     repo.save(event, snapshot.version).await?;
//!     Ok(())
//! }
//! ```

use crate::event::{Event, EventId, EventSummary};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Boxed future returned by repository methods.
pub type RepositoryFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, RepositoryError>> + Send + 'a>>;

/// Stored version of an aggregate, for optimistic concurrency control.
///
/// A freshly inserted event is at [`Version::INITIAL`]; each successful save
/// moves it to [`Version::next`].
///
/// # Examples
///
/// ```
/// use rsvp_core::repository::Version;
///
/// let v1 = Version::INITIAL;
/// assert_eq!(v1.next(), Version::new(2));
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(u64);

impl Version {
    /// Version of a newly inserted aggregate.
    pub const INITIAL: Self = Self(1);

    /// Create a version with the given value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// The version number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// The version after one more write.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

/// A value together with the version it was read at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned<T> {
    /// The stored value.
    pub value: T,
    /// Version of `value` in the store.
    pub version: Version,
}

impl<T> Versioned<T> {
    /// Pair a value with its version.
    #[must_use]
    pub const fn new(value: T, version: Version) -> Self {
        Self { value, version }
    }
}

/// Errors raised by repository implementations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// Optimistic concurrency conflict: the stored version moved on.
    ///
    /// Another writer committed to the same event after our read.
    #[error("Write conflict on event {event_id}: expected version {expected}, found {actual}")]
    Conflict {
        /// The contended event.
        event_id: EventId,
        /// Version the write was based on.
        expected: Version,
        /// Version currently stored.
        actual: Version,
    },

    /// The event does not exist (or was deleted before the write).
    #[error("Event not found: {0}")]
    NotFound(EventId),

    /// Connection or query failure.
    #[error("Database error: {0}")]
    Database(String),

    /// Stored data could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RepositoryError {
    /// Whether this is a write conflict that a fresh attempt may resolve.
    #[must_use]
    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }
}

/// Whole-aggregate storage for events.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one repository is shared by every
/// concurrent request.
///
/// # Dyn Compatibility
///
/// Methods return boxed futures so the trait can be used as
/// `Arc<dyn EventRepository>`.
pub trait EventRepository: Send + Sync {
    /// Store a new event with no guests and assign it an id.
    ///
    /// The stored event starts at [`Version::INITIAL`].
    ///
    /// # Errors
    ///
    /// - `Database`: the insert failed
    fn insert(&self, name: String) -> RepositoryFuture<'_, Event>;

    /// Read an event and its current version.
    ///
    /// Returns `Ok(None)` if no event has `id`.
    ///
    /// # Errors
    ///
    /// - `Database`: the read failed
    /// - `Serialization`: the stored guest list could not be decoded
    fn load(&self, id: EventId) -> RepositoryFuture<'_, Option<Versioned<Event>>>;

    /// Overwrite an event if it is still at `expected_version`.
    ///
    /// Returns the new version on success.
    ///
    /// # Errors
    ///
    /// - `Conflict`: the stored version differs from `expected_version`
    /// - `NotFound`: the event no longer exists
    /// - `Database` / `Serialization`: the write failed
    fn save(&self, event: Event, expected_version: Version) -> RepositoryFuture<'_, Version>;

    /// Delete an event and, with it, its guests.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no event has `id`
    /// - `Database`: the delete failed
    fn delete(&self, id: EventId) -> RepositoryFuture<'_, ()>;

    /// List id and name of every event, ordered by id.
    ///
    /// This is a projection query: guest lists are not read.
    ///
    /// # Errors
    ///
    /// - `Database`: the query failed
    fn list_summaries(&self) -> RepositoryFuture<'_, Vec<EventSummary>>;
}
