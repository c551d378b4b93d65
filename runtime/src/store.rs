//! Typed operations on the event aggregate.
//!
//! [`EventAggregateStore`] is what the HTTP layer calls. Reads go straight to
//! the repository; every mutation is a transform handed to the
//! [`MutationExecutor`], so retries and version checks live in one place.
//!
//! Access control is not checked here. Callers gate each call with
//! [`rsvp_core::access::Requester::authorize`] first.

use crate::config::RetryConfig;
use crate::executor::MutationExecutor;
use crate::metrics::GuestCodeMetrics;
use crate::retry::RetryPolicy;
use rand::RngCore;
use rand::rngs::StdRng;
use rsvp_core::code::GuestCodeGenerator;
use rsvp_core::error::Result;
use rsvp_core::event::{Event, EventDetail, EventId, EventSummary, Invitation, validate_event_name};
use rsvp_core::guest::{Guest, GuestCode, GuestDetails};
use rsvp_core::repository::EventRepository;
use std::sync::Arc;

/// The event aggregate store.
///
/// # Type Parameters
///
/// - `R`: repository; `dyn EventRepository` by default
/// - `G`: random source of the guest code generator
///
/// # Example
///
/// ```no_run
/// use rsvp_core::repository::EventRepository;
/// use rsvp_runtime::retry::RetryPolicy;
/// use rsvp_runtime::store::EventAggregateStore;
/// use std::sync::Arc;
///
/// # async fn example(repo: Arc<dyn EventRepository>) -> rsvp_core::Result<()> {
/// let store: EventAggregateStore = EventAggregateStore::new(repo, RetryPolicy::default());
///
/// let event = store.create_event("Launch Party").await?;
/// let code = store.add_guest(event.id(), "Ana", "ana@x", "host@x").await?;
/// store.record_response(event.id(), &code, true).await?;
/// # Ok(())
/// # }
/// ```
pub struct EventAggregateStore<R: ?Sized = dyn EventRepository, G = StdRng> {
    executor: MutationExecutor<R>,
    codes: Arc<GuestCodeGenerator<G>>,
}

impl<R: ?Sized, G> Clone for EventAggregateStore<R, G> {
    fn clone(&self) -> Self {
        Self {
            executor: self.executor.clone(),
            codes: Arc::clone(&self.codes),
        }
    }
}

impl<R> EventAggregateStore<R, StdRng>
where
    R: EventRepository + ?Sized,
{
    /// Create a store with an entropy-seeded code generator.
    #[must_use]
    pub fn new(repository: Arc<R>, policy: RetryPolicy) -> Self {
        Self::with_generator(repository, policy, GuestCodeGenerator::from_entropy())
    }

    /// Create a store whose retry policy comes from configuration.
    #[must_use]
    pub fn from_config(repository: Arc<R>, config: &RetryConfig) -> Self {
        Self::new(repository, config.policy())
    }
}

impl<R, G> EventAggregateStore<R, G>
where
    R: EventRepository + ?Sized,
    G: RngCore + Send,
{
    /// Create a store with a caller-supplied code generator.
    #[must_use]
    pub fn with_generator(
        repository: Arc<R>,
        policy: RetryPolicy,
        codes: GuestCodeGenerator<G>,
    ) -> Self {
        Self {
            executor: MutationExecutor::new(repository, policy),
            codes: Arc::new(codes),
        }
    }

    /// The executor mutations run through.
    #[must_use]
    pub const fn executor(&self) -> &MutationExecutor<R> {
        &self.executor
    }

    /// Create an event with an empty guest list.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` if `name` is empty
    /// - `StoreError::Repository` if the insert fails
    pub async fn create_event(&self, name: &str) -> Result<Event> {
        validate_event_name(name, "New event name must not be empty")?;
        let event = self.executor.repository().insert(name.to_string()).await?;
        tracing::info!(event_id = %event.id(), name = event.name(), "Event created");
        Ok(event)
    }

    /// Read an event with its full guest list.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if no event has `event_id`.
    pub async fn get_event(&self, event_id: EventId) -> Result<Event> {
        self.executor.read(event_id).await
    }

    /// Id and name of every event, ordered by id.
    ///
    /// # Errors
    ///
    /// `StoreError::Repository` if the query fails.
    pub async fn list_events(&self) -> Result<Vec<EventSummary>> {
        let events = self.executor.repository().list_summaries().await?;
        tracing::debug!(count = events.len(), "Listed events");
        Ok(events)
    }

    /// Replace an event's name.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` if `name` is empty
    /// - `StoreError::NotFound` if the event does not exist
    pub async fn rename_event(&self, event_id: EventId, name: &str) -> Result<()> {
        validate_event_name(name, "The event name must not be empty")?;
        self.executor
            .mutate(event_id, |mut event| {
                event.rename(name);
                Ok((event, ()))
            })
            .await?;
        tracing::debug!(%event_id, name, "Event renamed");
        Ok(())
    }

    /// Delete an event together with its guests.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the event does not exist.
    pub async fn delete_event(&self, event_id: EventId) -> Result<()> {
        self.executor.repository().delete(event_id).await?;
        tracing::info!(%event_id, "Event deleted");
        Ok(())
    }

    /// Add a guest and return the code generated for them.
    ///
    /// The code is drawn while the current guest list is in hand, so it is
    /// unique among the codes committed alongside it.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` if a field is empty
    /// - `StoreError::NotFound` if the event does not exist
    /// - `StoreError::CodeGenerationExhausted` if no free code was drawn
    pub async fn add_guest(
        &self,
        event_id: EventId,
        name: &str,
        email: &str,
        host_email: &str,
    ) -> Result<GuestCode> {
        let details = GuestDetails::new(name, email, host_email)?;
        let codes = &self.codes;

        let code = self
            .executor
            .mutate(event_id, move |mut event| {
                let code = codes.generate(&event.codes())?;
                event.add_guest(Guest::new(code.clone(), details.clone()))?;
                Ok((event, code))
            })
            .await?;

        GuestCodeMetrics::record_generated();
        tracing::debug!(%event_id, %code, "Guest added");
        Ok(code)
    }

    /// Replace a guest's name and email addresses. The code is kept.
    ///
    /// # Errors
    ///
    /// - `StoreError::InvalidInput` if a field is empty
    /// - `StoreError::NotFound` if the event or guest does not exist
    pub async fn edit_guest(
        &self,
        event_id: EventId,
        code: &GuestCode,
        name: &str,
        email: &str,
        host_email: &str,
    ) -> Result<()> {
        let details = GuestDetails::new(name, email, host_email)?;
        self.executor
            .mutate(event_id, move |mut event| {
                event.edit_guest(code, details.clone())?;
                Ok((event, ()))
            })
            .await?;
        tracing::debug!(%event_id, %code, "Guest edited");
        Ok(())
    }

    /// Remove a guest and return the removed record.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the event or guest does not exist.
    pub async fn remove_guest(&self, event_id: EventId, code: &GuestCode) -> Result<Guest> {
        let removed = self
            .executor
            .mutate(event_id, |mut event| {
                let removed = event.remove_guest(code)?;
                Ok((event, removed))
            })
            .await?;
        tracing::debug!(%event_id, %code, "Guest removed");
        Ok(removed)
    }

    /// Record a guest's attendance answer and return the updated invitation.
    ///
    /// Answering again overwrites the previous answer.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the event or guest does not exist.
    pub async fn record_response(
        &self,
        event_id: EventId,
        code: &GuestCode,
        attending: bool,
    ) -> Result<Invitation> {
        let invitation = self
            .executor
            .mutate(event_id, |mut event| {
                event.record_response(code, attending)?;
                let invitation = event.invitation(code)?;
                Ok((event, invitation))
            })
            .await?;
        tracing::debug!(%event_id, %code, attending, "Response recorded");
        Ok(invitation)
    }

    /// An event as shown to one host.
    ///
    /// Unless `show_all` is set, only guests whose host email matches
    /// `viewer_email` (ignoring case) are listed. `total_guests` always
    /// counts the whole list.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the event does not exist.
    pub async fn event_detail(
        &self,
        event_id: EventId,
        viewer_email: &str,
        show_all: bool,
    ) -> Result<EventDetail> {
        let event = self.executor.read(event_id).await?;
        Ok(event.detail_for(viewer_email, show_all))
    }

    /// Look up one guest.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the event or guest does not exist.
    pub async fn get_guest(&self, event_id: EventId, code: &GuestCode) -> Result<Guest> {
        let event = self.executor.read(event_id).await?;
        event.require_guest(code).cloned()
    }

    /// The invitation a guest sees before answering.
    ///
    /// # Errors
    ///
    /// `StoreError::NotFound` if the event or guest does not exist.
    pub async fn invitation(&self, event_id: EventId, code: &GuestCode) -> Result<Invitation> {
        self.executor.read(event_id).await?.invitation(code)
    }
}
