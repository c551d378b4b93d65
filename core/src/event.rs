//! The Event aggregate.
//!
//! An [`Event`] owns an ordered list of [`Guest`]s and is the unit of storage,
//! locking and transactional consistency. Guests are only reachable through
//! their event.
//!
//! # Invariants
//!
//! - No two guests in one event share a [`GuestCode`].
//! - The event id is assigned by the store and never changes.
//! - Guest order is insertion order.

use crate::error::{Result, StoreError};
use crate::guest::{Guest, GuestCode, GuestDetails};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// Store-assigned identifier of an event.
///
/// Round-trips through its decimal text form so it can be embedded in
/// RSVP links.
///
/// # Examples
///
/// ```
/// use rsvp_core::event::EventId;
///
/// let id: EventId = "5629499534213120".parse().unwrap();
/// assert_eq!(id.to_string(), "5629499534213120");
/// assert!("abc".parse::<EventId>().is_err());
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EventId(i64);

impl EventId {
    /// Wrap a raw store id.
    #[must_use]
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// The raw store id.
    #[must_use]
    pub const fn value(self) -> i64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EventId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse::<i64>()
            .map(Self)
            .map_err(|_| StoreError::InvalidInput(format!("Invalid ID '{s}'")))
    }
}

impl From<i64> for EventId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// Check an event name before it is stored.
///
/// Only the empty string is refused; whitespace is kept as given.
///
/// # Errors
///
/// Returns [`StoreError::InvalidInput`] carrying `message` for an empty name.
pub fn validate_event_name(name: &str, message: &str) -> Result<()> {
    if name.is_empty() {
        return Err(StoreError::InvalidInput(message.to_string()));
    }
    Ok(())
}

/// An event together with its embedded guest list.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    name: String,
    guests: Vec<Guest>,
}

impl Event {
    /// A new event with no guests.
    #[must_use]
    pub fn new(id: EventId, name: impl Into<String>) -> Self {
        Self::with_guests(id, name, Vec::new())
    }

    /// Rebuild an event from stored parts.
    #[must_use]
    pub fn with_guests(id: EventId, name: impl Into<String>, guests: Vec<Guest>) -> Self {
        Self {
            id,
            name: name.into(),
            guests,
        }
    }

    /// The event id.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// The event name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Guests in insertion order.
    #[must_use]
    pub fn guests(&self) -> &[Guest] {
        &self.guests
    }

    /// Consume the event and return its guest list.
    #[must_use]
    pub fn into_guests(self) -> Vec<Guest> {
        self.guests
    }

    /// Codes currently in use, for exclusion during code generation.
    #[must_use]
    pub fn codes(&self) -> HashSet<&str> {
        self.guests.iter().map(|g| g.code().as_str()).collect()
    }

    /// Look up a guest by code.
    #[must_use]
    pub fn guest(&self, code: &GuestCode) -> Option<&Guest> {
        self.guests.iter().find(|g| g.code() == code)
    }

    /// Look up a guest by code, failing with `NotFound`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no guest has `code`.
    pub fn require_guest(&self, code: &GuestCode) -> Result<&Guest> {
        self.guest(code)
            .ok_or_else(|| StoreError::guest_not_found(self.id, code))
    }

    fn require_guest_mut(&mut self, code: &GuestCode) -> Result<&mut Guest> {
        let id = self.id;
        self.guests
            .iter_mut()
            .find(|g| g.code() == code)
            .ok_or_else(|| StoreError::guest_not_found(id, code))
    }

    /// Replace the event name. The name must already be validated.
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Append a guest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] if the guest's code is already taken.
    pub fn add_guest(&mut self, guest: Guest) -> Result<()> {
        if self.guest(guest.code()).is_some() {
            return Err(StoreError::InvalidInput(format!(
                "Guest code {} already used in event {}",
                guest.code(),
                self.id
            )));
        }
        self.guests.push(guest);
        Ok(())
    }

    /// Replace a guest's editable fields.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no guest has `code`.
    pub fn edit_guest(&mut self, code: &GuestCode, details: GuestDetails) -> Result<()> {
        self.require_guest_mut(code)?.update_details(details);
        Ok(())
    }

    /// Remove a guest, keeping the order of the others.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no guest has `code`.
    pub fn remove_guest(&mut self, code: &GuestCode) -> Result<Guest> {
        let index = self
            .guests
            .iter()
            .position(|g| g.code() == code)
            .ok_or_else(|| StoreError::guest_not_found(self.id, code))?;
        Ok(self.guests.remove(index))
    }

    /// Record a guest's attendance answer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no guest has `code`.
    pub fn record_response(&mut self, code: &GuestCode, attending: bool) -> Result<&Guest> {
        let guest = self.require_guest_mut(code)?;
        guest.record_response(attending);
        Ok(guest)
    }

    /// The id + name projection used in listings.
    #[must_use]
    pub fn summary(&self) -> EventSummary {
        EventSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    /// The detail view for a host.
    ///
    /// Unless `show_all` is set, only guests invited by `viewer_email` are kept.
    #[must_use]
    pub fn detail_for(self, viewer_email: &str, show_all: bool) -> EventDetail {
        let total_guests = self.guests.len();
        let event = if show_all {
            self
        } else {
            let Self { id, name, guests } = self;
            let guests = guests
                .into_iter()
                .filter(|g| g.is_hosted_by(viewer_email))
                .collect();
            Self { id, name, guests }
        };
        EventDetail {
            event,
            total_guests,
            show_all,
        }
    }

    /// The invitation view for one guest.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] if no guest has `code`.
    pub fn invitation(&self, code: &GuestCode) -> Result<Invitation> {
        let guest = self.require_guest(code)?.clone();
        Ok(Invitation {
            event_id: self.id,
            event_name: self.name.clone(),
            guest,
        })
    }
}

/// Listing projection of an event: id and name only.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event id.
    pub id: EventId,
    /// Event name.
    pub name: String,
}

/// An event as shown to one host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EventDetail {
    /// The event, possibly with a filtered guest list.
    pub event: Event,
    /// Size of the unfiltered guest list.
    pub total_guests: usize,
    /// Whether the guest list was left unfiltered.
    pub show_all: bool,
}

/// What a guest sees on the RSVP page.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Invitation {
    /// Event id.
    pub event_id: EventId,
    /// Event name.
    pub event_name: String,
    /// The invited guest.
    pub guest: Guest,
}

impl Invitation {
    /// Relative link to this guest's RSVP page.
    #[must_use]
    pub fn respond_path(&self) -> String {
        format!(
            "/respond?event_id={}&guest_code={}",
            self.event_id,
            self.guest.code()
        )
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;

    fn guest(code: &str, name: &str, host: &str) -> Guest {
        Guest::new(
            code.parse().unwrap(),
            GuestDetails::new(name, format!("{name}@x"), host).unwrap(),
        )
    }

    fn party() -> Event {
        let mut event = Event::new(EventId::new(1), "Launch Party");
        event.add_guest(guest("AAAAA", "ana", "host@x")).unwrap();
        event.add_guest(guest("BBBBB", "bo", "other@x")).unwrap();
        event.add_guest(guest("CCCCC", "cy", "Host@X")).unwrap();
        event
    }

    #[test]
    fn event_id_parses_text() {
        assert_eq!("42".parse::<EventId>().unwrap(), EventId::new(42));
        assert_eq!(EventId::new(-3).to_string(), "-3");
        for bad in ["", "4.2", "x1", "99999999999999999999"] {
            assert!(matches!(bad.parse::<EventId>(), Err(StoreError::InvalidInput(_))));
        }
    }

    #[test]
    fn only_empty_names_are_refused() {
        assert!(validate_event_name("Launch", "empty").is_ok());
        assert!(validate_event_name("   ", "empty").is_ok());
        assert_eq!(
            validate_event_name("", "New event name must not be empty"),
            Err(StoreError::InvalidInput(
                "New event name must not be empty".to_string()
            ))
        );
    }

    #[test]
    fn add_guest_rejects_duplicate_code() {
        let mut event = party();
        let result = event.add_guest(guest("AAAAA", "dup", "host@x"));
        assert!(matches!(result, Err(StoreError::InvalidInput(_))));
        assert_eq!(event.guests().len(), 3);
    }

    #[test]
    fn remove_keeps_order() {
        let mut event = party();
        let removed = event.remove_guest(&"BBBBB".parse().unwrap()).unwrap();
        assert_eq!(removed.name(), "bo");

        let codes: Vec<&str> = event.guests().iter().map(|g| g.code().as_str()).collect();
        assert_eq!(codes, ["AAAAA", "CCCCC"]);
    }

    #[test]
    fn missing_guest_is_not_found() {
        let mut event = party();
        let code: GuestCode = "ZZZZZ".parse().unwrap();
        assert!(matches!(event.remove_guest(&code), Err(StoreError::NotFound(_))));
        assert!(matches!(event.record_response(&code, true), Err(StoreError::NotFound(_))));
        let details = GuestDetails::new("a", "b", "c").unwrap();
        assert!(matches!(event.edit_guest(&code, details), Err(StoreError::NotFound(_))));
        assert!(matches!(event.invitation(&code), Err(StoreError::NotFound(_))));
    }

    #[test]
    fn edit_keeps_code() {
        let mut event = party();
        let code: GuestCode = "AAAAA".parse().unwrap();
        event
            .edit_guest(&code, GuestDetails::new("Ana B", "anab@x", "host@x").unwrap())
            .unwrap();

        let edited = event.guest(&code).unwrap();
        assert_eq!(edited.name(), "Ana B");
        assert_eq!(edited.code(), &code);
    }

    #[test]
    fn detail_filters_by_host_case_insensitively() {
        let detail = party().detail_for("HOST@x", false);
        assert_eq!(detail.total_guests, 3);
        let names: Vec<&str> = detail.event.guests().iter().map(Guest::name).collect();
        assert_eq!(names, ["ana", "cy"]);

        let all = party().detail_for("nobody@x", true);
        assert_eq!(all.event.guests().len(), 3);
        assert!(all.show_all);
    }

    #[test]
    fn invitation_link_embeds_ids() {
        let invitation = party().invitation(&"CCCCC".parse().unwrap()).unwrap();
        assert_eq!(invitation.event_name, "Launch Party");
        assert_eq!(invitation.respond_path(), "/respond?event_id=1&guest_code=CCCCC");
    }
}
