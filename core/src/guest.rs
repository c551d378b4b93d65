//! Guest records embedded in an event.
//!
//! A [`Guest`] has no identity outside its owning event. It is addressed by a
//! [`GuestCode`] that is unique within that event's guest list and never
//! changes after creation.

use crate::code::{GUEST_CODE_ALPHABET, GUEST_CODE_LEN};
use crate::error::{Result, StoreError};
use crate::rsvp::RsvpState;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Short identifier of a guest within one event.
///
/// # Validation
///
/// - `FromStr::from_str()`: checks length and alphabet (use for external input)
/// - `new_unchecked()`: no validation (for codes produced by the generator)
///
/// # Examples
///
/// ```
/// use rsvp_core::guest::GuestCode;
///
/// let code: GuestCode = "a1B2c".parse().unwrap();
/// assert_eq!(code.as_str(), "a1B2c");
/// assert!("a1B2".parse::<GuestCode>().is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestCode(String);

impl GuestCode {
    /// Wrap a code already known to be well formed.
    #[must_use]
    pub(crate) const fn new_unchecked(code: String) -> Self {
        Self(code)
    }

    /// The code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for GuestCode {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let well_formed =
            s.len() == GUEST_CODE_LEN && s.bytes().all(|b| GUEST_CODE_ALPHABET.contains(&b));
        if !well_formed {
            return Err(StoreError::InvalidInput(format!("Invalid guest code '{s}'")));
        }
        Ok(Self(s.to_string()))
    }
}

impl AsRef<str> for GuestCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The editable fields of a guest.
///
/// All three are required; construction rejects empty values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestDetails {
    name: String,
    email: String,
    host_email: String,
}

impl GuestDetails {
    /// Validate and build guest details.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidInput`] if any field is empty.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        host_email: impl Into<String>,
    ) -> Result<Self> {
        let (name, email, host_email) = (name.into(), email.into(), host_email.into());
        if [&name, &email, &host_email]
            .iter()
            .any(|field| field.is_empty())
        {
            return Err(StoreError::InvalidInput(
                "Name, Email and HostEmail must not be empty".to_string(),
            ));
        }
        Ok(Self {
            name,
            email,
            host_email,
        })
    }

    /// Guest display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Guest email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Email of the host who invited this guest.
    #[must_use]
    pub fn host_email(&self) -> &str {
        &self.host_email
    }
}

/// A guest invited to an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    code: GuestCode,
    #[serde(flatten)]
    details: GuestDetails,
    #[serde(default)]
    rsvp: RsvpState,
}

impl Guest {
    /// A new guest that has not responded yet.
    #[must_use]
    pub const fn new(code: GuestCode, details: GuestDetails) -> Self {
        Self {
            code,
            details,
            rsvp: RsvpState::NoResponse,
        }
    }

    /// The guest's code. Fixed at creation.
    #[must_use]
    pub const fn code(&self) -> &GuestCode {
        &self.code
    }

    /// The editable fields.
    #[must_use]
    pub const fn details(&self) -> &GuestDetails {
        &self.details
    }

    /// Guest display name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.details.name()
    }

    /// Guest email address.
    #[must_use]
    pub fn email(&self) -> &str {
        self.details.email()
    }

    /// Email of the inviting host.
    #[must_use]
    pub fn host_email(&self) -> &str {
        self.details.host_email()
    }

    /// Current RSVP state.
    #[must_use]
    pub const fn rsvp(&self) -> RsvpState {
        self.rsvp
    }

    /// Whether the guest has answered.
    #[must_use]
    pub const fn has_responded(&self) -> bool {
        self.rsvp.has_responded()
    }

    /// The attendance answer; only meaningful when [`Guest::has_responded`].
    #[must_use]
    pub const fn response(&self) -> bool {
        self.rsvp.response()
    }

    /// Replace name, email and host email. The code is untouched.
    pub fn update_details(&mut self, details: GuestDetails) {
        self.details = details;
    }

    /// Record an attendance answer.
    pub const fn record_response(&mut self, attending: bool) {
        self.rsvp = self.rsvp.respond(attending);
    }

    /// Whether `email` invited this guest (case-insensitive).
    #[must_use]
    pub fn is_hosted_by(&self, email: &str) -> bool {
        self.details.host_email.to_lowercase() == email.to_lowercase()
    }
}
