//! The mutation executor: read, transform, write back, retry on conflict.
//!
//! Every change to an event goes through [`MutationExecutor::mutate`] with a
//! transform closure. One attempt:
//!
//! 1. loads a fresh snapshot and its version,
//! 2. applies the transform to it,
//! 3. saves the result, conditional on the version being unchanged.
//!
//! A write conflict in step 3 restarts from step 1 with a new snapshot, up to
//! the policy's retry bound. `NotFound`, `InvalidInput` and the other errors a
//! transform or store can raise end the mutation at once.
//!
//! Because of the restarts a transform may run more than once. It must be a
//! pure function of its input snapshot: anything it does besides returning a
//! value (sending mail, bumping counters) would repeat under contention.

use crate::metrics::MutationMetrics;
use crate::retry::{RetryPolicy, retry_with_predicate};
use rsvp_core::error::{Result, StoreError};
use rsvp_core::event::{Event, EventId};
use rsvp_core::repository::{EventRepository, RepositoryError};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Runs transform closures against stored events with conflict retries.
///
/// Mutations of the same event are linearized by the repository's version
/// check; mutations of different events never wait on each other.
pub struct MutationExecutor<R: ?Sized> {
    repository: Arc<R>,
    policy: RetryPolicy,
}

impl<R: ?Sized> Clone for MutationExecutor<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            policy: self.policy.clone(),
        }
    }
}

/// Outcome of a single attempt.
#[derive(Debug)]
enum AttemptError {
    /// Another writer committed first; worth another attempt.
    Conflict(RepositoryError),
    /// Anything else; ends the mutation.
    Rejected(StoreError),
}

impl AttemptError {
    const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Conflict(err) => write!(f, "{err}"),
            Self::Rejected(err) => write!(f, "{err}"),
        }
    }
}

impl From<RepositoryError> for AttemptError {
    fn from(err: RepositoryError) -> Self {
        if err.is_conflict() {
            Self::Conflict(err)
        } else {
            Self::Rejected(err.into())
        }
    }
}

impl<R> MutationExecutor<R>
where
    R: EventRepository + ?Sized,
{
    /// Create an executor over `repository`.
    #[must_use]
    pub const fn new(repository: Arc<R>, policy: RetryPolicy) -> Self {
        Self { repository, policy }
    }

    /// The underlying repository.
    #[must_use]
    pub const fn repository(&self) -> &Arc<R> {
        &self.repository
    }

    /// The conflict retry policy.
    #[must_use]
    pub const fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    /// Read the current state of an event.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if no event has `event_id`
    /// - [`StoreError::Repository`] if the read fails
    pub async fn read(&self, event_id: EventId) -> Result<Event> {
        self.repository
            .load(event_id)
            .await?
            .map(|snapshot| snapshot.value)
            .ok_or_else(|| StoreError::event_not_found(event_id))
    }

    /// Apply `transform` to an event atomically.
    ///
    /// `transform` receives the current snapshot and returns the next state
    /// plus a value handed back to the caller. Returning an error aborts
    /// without writing.
    ///
    /// # Errors
    ///
    /// - [`StoreError::NotFound`] if the event does not exist
    /// - whatever `transform` returns
    /// - [`StoreError::ConcurrencyConflict`] once the retry budget is spent
    /// - [`StoreError::Repository`] if the store fails
    #[tracing::instrument(skip(self, transform), name = "mutate_event")]
    pub async fn mutate<T, F>(&self, event_id: EventId, transform: F) -> Result<T>
    where
        F: Fn(Event) -> Result<(Event, T)> + Send + Sync,
        T: Send,
    {
        let started = Instant::now();
        let transform = &transform;

        let outcome = retry_with_predicate(
            &self.policy,
            move || self.attempt(event_id, transform),
            AttemptError::is_conflict,
        )
        .await;

        match outcome {
            Ok(output) => {
                MutationMetrics::record_commit(started.elapsed());
                Ok(output)
            }
            Err(AttemptError::Conflict(err)) => {
                MutationMetrics::record_exhausted();
                let attempts = self.policy.max_attempts();
                tracing::error!(%event_id, attempts, error = %err, "Giving up on contended event");
                Err(StoreError::ConcurrencyConflict { event_id, attempts })
            }
            Err(AttemptError::Rejected(err)) => {
                MutationMetrics::record_failure();
                Err(err)
            }
        }
    }

    async fn attempt<T, F>(
        &self,
        event_id: EventId,
        transform: &F,
    ) -> std::result::Result<T, AttemptError>
    where
        F: Fn(Event) -> Result<(Event, T)>,
    {
        let snapshot = self
            .repository
            .load(event_id)
            .await?
            .ok_or_else(|| AttemptError::Rejected(StoreError::event_not_found(event_id)))?;

        let (next, output) = transform(snapshot.value).map_err(AttemptError::Rejected)?;
        if next.id() != event_id {
            return Err(AttemptError::Rejected(StoreError::InvalidInput(format!(
                "Transform of event {event_id} produced event {}",
                next.id()
            ))));
        }

        match self.repository.save(next, snapshot.version).await {
            Ok(version) => {
                tracing::debug!(%event_id, %version, "Mutation committed");
                Ok(output)
            }
            Err(err) => {
                if err.is_conflict() {
                    MutationMetrics::record_conflict();
                }
                Err(err.into())
            }
        }
    }
}
