//! Error taxonomy for event aggregate operations.
//!
//! Every failure that reaches a caller carries one of a small set of kinds
//! (see [`ErrorKind`]) so the transport layer can map it to a status without
//! inspecting messages. Store-level write conflicts never appear here directly:
//! the mutation executor retries them and only surfaces
//! [`StoreError::ConcurrencyConflict`] once its retry budget is spent.

use crate::event::EventId;
use crate::guest::GuestCode;
use crate::repository::RepositoryError;
use thiserror::Error;

/// Convenience alias for results of store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by event aggregate operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A required field was empty or an identifier was malformed.
    ///
    /// Never retried.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The event id, or a guest code inside an existing event, does not exist.
    ///
    /// Both cases share this kind; callers tell them apart by which
    /// identifier they supplied.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The retry budget for write conflicts was exhausted.
    ///
    /// Transient: the whole request is safe to retry.
    #[error("Concurrency conflict on event {event_id}: gave up after {attempts} attempts")]
    ConcurrencyConflict {
        /// The contended event.
        event_id: EventId,
        /// Number of read-transform-write attempts made.
        attempts: u32,
    },

    /// No unused guest code was found within the attempt budget.
    #[error("Failed to generate unique guest code after {attempts} attempts")]
    CodeGenerationExhausted {
        /// Number of codes drawn before giving up.
        attempts: u32,
    },

    /// The requester lacks the access an operation needs.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The underlying store failed (connection, query or encoding error).
    #[error("Repository error: {0}")]
    Repository(String),
}

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`StoreError::InvalidInput`].
    InvalidInput,
    /// See [`StoreError::NotFound`].
    NotFound,
    /// See [`StoreError::ConcurrencyConflict`].
    ConcurrencyConflict,
    /// See [`StoreError::CodeGenerationExhausted`].
    CodeGenerationExhausted,
    /// See [`StoreError::Forbidden`].
    Forbidden,
    /// See [`StoreError::Repository`].
    Repository,
}

impl StoreError {
    /// `NotFound` for a missing event.
    #[must_use]
    pub fn event_not_found(event_id: EventId) -> Self {
        Self::NotFound(format!("event {event_id}"))
    }

    /// `NotFound` for a guest code missing from an existing event.
    #[must_use]
    pub fn guest_not_found(event_id: EventId, code: &GuestCode) -> Self {
        Self::NotFound(format!("guest {code} in event {event_id}"))
    }

    /// The kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::ConcurrencyConflict { .. } => ErrorKind::ConcurrencyConflict,
            Self::CodeGenerationExhausted { .. } => ErrorKind::CodeGenerationExhausted,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            Self::Repository(_) => ErrorKind::Repository,
        }
    }

    /// Whether the caller may retry the whole request unchanged.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self.kind(),
            ErrorKind::ConcurrencyConflict
                | ErrorKind::CodeGenerationExhausted
                | ErrorKind::Repository
        )
    }
}

impl From<RepositoryError> for StoreError {
    /// Map a store-level failure for operations that are not retried.
    ///
    /// A lone write conflict counts as one exhausted attempt.
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Conflict { event_id, .. } => Self::ConcurrencyConflict {
                event_id,
                attempts: 1,
            },
            RepositoryError::NotFound(event_id) => Self::event_not_found(event_id),
            RepositoryError::Database(_) | RepositoryError::Serialization(_) => {
                Self::Repository(error.to_string())
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::*;
    use crate::repository::Version;

    #[test]
    fn guest_and_event_not_found_share_kind() {
        let code: GuestCode = "aB3dE".parse().unwrap();
        let event = StoreError::event_not_found(EventId::new(7));
        let guest = StoreError::guest_not_found(EventId::new(7), &code);

        assert_eq!(event.kind(), ErrorKind::NotFound);
        assert_eq!(guest.kind(), ErrorKind::NotFound);
        assert!(guest.to_string().contains("aB3dE"));
        assert!(event.to_string().contains('7'));
    }

    #[test]
    fn transient_kinds() {
        let conflict = StoreError::ConcurrencyConflict {
            event_id: EventId::new(1),
            attempts: 4,
        };
        assert!(conflict.is_transient());
        assert!(StoreError::CodeGenerationExhausted { attempts: 10 }.is_transient());
        assert!(!StoreError::InvalidInput("name".into()).is_transient());
        assert!(!StoreError::NotFound("event 1".into()).is_transient());
        assert!(!StoreError::Forbidden("admin".into()).is_transient());
    }

    #[test]
    fn repository_errors_map_to_kinds() {
        let id = EventId::new(5);
        assert_eq!(
            StoreError::from(RepositoryError::NotFound(id)).kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            StoreError::from(RepositoryError::Database("down".into())),
            StoreError::Repository("Database error: down".into())
        );
        assert!(matches!(
            StoreError::from(RepositoryError::Conflict {
                event_id: id,
                expected: Version::new(1),
                actual: Version::new(2),
            }),
            StoreError::ConcurrencyConflict { attempts: 1, .. }
        ));
    }

    #[test]
    fn conflict_display_mentions_attempts() {
        let error = StoreError::ConcurrencyConflict {
            event_id: EventId::new(42),
            attempts: 9,
        };
        let display = format!("{error}");
        assert!(display.contains("event 42"));
        assert!(display.contains("9 attempts"));
    }
}
