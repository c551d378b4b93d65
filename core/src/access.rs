//! Access guard for aggregate operations.
//!
//! Authentication happens elsewhere; the HTTP layer only hands over two facts
//! about the caller, whether they are logged in (an email is known) and
//! whether they are an admin. [`Requester::authorize`] turns those into a
//! yes/no for each [`Operation`].
//!
//! | Operation | Needs |
//! |---|---|
//! | create / rename / delete event | admin |
//! | list, view event, add / edit / remove guest | logged in |
//! | respond | nothing |

use crate::error::{Result, StoreError};

/// Operations exposed by the event aggregate store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// Create an event.
    CreateEvent,
    /// List all events.
    ListEvents,
    /// View one event and its guests.
    ViewEvent,
    /// Rename an event.
    RenameEvent,
    /// Delete an event.
    DeleteEvent,
    /// Add a guest.
    AddGuest,
    /// Edit a guest's details.
    EditGuest,
    /// Remove a guest.
    RemoveGuest,
    /// View or answer an invitation.
    Respond,
}

/// Minimum access an operation needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Access {
    /// Anyone, including anonymous callers holding an RSVP link.
    Public,
    /// Any logged-in user.
    LoggedIn,
    /// Administrators only.
    Admin,
}

impl Operation {
    /// The access level this operation requires.
    #[must_use]
    pub const fn required_access(self) -> Access {
        match self {
            Self::CreateEvent | Self::RenameEvent | Self::DeleteEvent => Access::Admin,
            Self::ListEvents
            | Self::ViewEvent
            | Self::AddGuest
            | Self::EditGuest
            | Self::RemoveGuest => Access::LoggedIn,
            Self::Respond => Access::Public,
        }
    }
}

/// The caller of an operation as seen by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Requester {
    email: Option<String>,
    is_admin: bool,
}

impl Requester {
    /// A caller that is not logged in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            email: None,
            is_admin: false,
        }
    }

    /// A logged-in, non-admin user.
    #[must_use]
    pub fn user(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            is_admin: false,
        }
    }

    /// A logged-in administrator.
    #[must_use]
    pub fn admin(email: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            is_admin: true,
        }
    }

    /// The caller's email, if logged in.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// The access level this caller holds.
    #[must_use]
    pub const fn access(&self) -> Access {
        match (&self.email, self.is_admin) {
            (Some(_), true) => Access::Admin,
            (Some(_), false) => Access::LoggedIn,
            (None, _) => Access::Public,
        }
    }

    /// Check that this caller may run `operation`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Forbidden`] when the caller's access is too low.
    pub fn authorize(&self, operation: Operation) -> Result<()> {
        if self.access() >= operation.required_access() {
            Ok(())
        } else {
            Err(StoreError::Forbidden(format!(
                "{operation:?} requires {:?} access",
                operation.required_access()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_can_only_respond() {
        let anon = Requester::anonymous();
        assert!(anon.authorize(Operation::Respond).is_ok());
        assert!(matches!(
            anon.authorize(Operation::ListEvents),
            Err(StoreError::Forbidden(_))
        ));
        assert!(anon.authorize(Operation::AddGuest).is_err());
    }

    #[test]
    fn users_manage_guests_but_not_events() {
        let user = Requester::user("host@x");
        for op in [
            Operation::ListEvents,
            Operation::ViewEvent,
            Operation::AddGuest,
            Operation::EditGuest,
            Operation::RemoveGuest,
            Operation::Respond,
        ] {
            assert!(user.authorize(op).is_ok(), "{op:?}");
        }
        for op in [Operation::CreateEvent, Operation::RenameEvent, Operation::DeleteEvent] {
            assert!(user.authorize(op).is_err(), "{op:?}");
        }
    }

    #[test]
    fn admins_can_do_everything() {
        let admin = Requester::admin("root@x");
        assert_eq!(admin.email(), Some("root@x"));
        assert!(admin.authorize(Operation::DeleteEvent).is_ok());
        assert!(admin.authorize(Operation::AddGuest).is_ok());
    }
}
