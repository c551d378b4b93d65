//! Per-guest RSVP state.
//!
//! A guest starts in [`RsvpState::NoResponse`]. Recording a response moves it to
//! [`RsvpState::Responded`]; responding again only overwrites the attendance
//! flag. There is no way back to `NoResponse` short of removing the guest.

use crate::error::{Result, StoreError};
use serde::{Deserialize, Serialize};

/// Attendance response tracked for one guest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RsvpState {
    /// The guest has not answered yet.
    #[default]
    NoResponse,
    /// The guest answered.
    Responded {
        /// `true` when attending.
        attending: bool,
    },
}

impl RsvpState {
    /// The state after the guest answers `attending`.
    #[must_use]
    pub const fn respond(self, attending: bool) -> Self {
        Self::Responded { attending }
    }

    /// Whether any response has been recorded.
    #[must_use]
    pub const fn has_responded(self) -> bool {
        matches!(self, Self::Responded { .. })
    }

    /// The recorded attendance flag.
    ///
    /// `false` while no response exists; use [`RsvpState::has_responded`] to
    /// tell "declined" from "not answered".
    #[must_use]
    pub const fn response(self) -> bool {
        match self {
            Self::NoResponse => false,
            Self::Responded { attending } => attending,
        }
    }

    /// The attendance flag, if a response exists.
    #[must_use]
    pub const fn attending(self) -> Option<bool> {
        match self {
            Self::NoResponse => None,
            Self::Responded { attending } => Some(attending),
        }
    }
}

/// Parse a submitted RSVP answer.
///
/// Accepts `1`, `t`, `T`, `TRUE`, `true`, `True` and their false
/// counterparts `0`, `f`, `F`, `FALSE`, `false`, `False`.
///
/// # Errors
///
/// Returns [`StoreError::InvalidInput`] for any other text.
pub fn parse_response(text: &str) -> Result<bool> {
    match text {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(StoreError::InvalidInput(format!("Invalid response '{text}'"))),
    }
}
