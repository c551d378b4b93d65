//! # RSVP Core
//!
//! Types and traits for the event aggregate store of the RSVP service.
//!
//! An **event** embeds an ordered list of **guests**. The event is the unit of
//! storage and consistency: guests are added, edited, removed and answer their
//! invitation only by rewriting the whole event inside one optimistic
//! transaction.
//!
//! ## Modules
//!
//! - [`event`]: the `Event` aggregate, its id and read views
//! - [`guest`]: guest records and guest codes
//! - [`rsvp`]: per-guest response state
//! - [`code`]: collision-free guest code generation
//! - [`repository`]: versioned persistence trait
//! - [`access`]: admin / logged-in gate for operations
//! - [`error`]: the error taxonomy surfaced to callers
//!
//! ## Example
//!
//! ```
//! use rsvp_core::code::GuestCodeGenerator;
//! use rsvp_core::event::{Event, EventId};
//! use rsvp_core::guest::{Guest, GuestDetails};
//!
//! let codes = GuestCodeGenerator::seeded(1);
//! let mut event = Event::new(EventId::new(1), "Launch Party");
//!
//! let code = codes.generate(&event.codes()).unwrap();
//! let details = GuestDetails::new("Ana", "ana@x", "host@x").unwrap();
//! event.add_guest(Guest::new(code.clone(), details)).unwrap();
//!
//! event.record_response(&code, true).unwrap();
//! assert!(event.guest(&code).unwrap().has_responded());
//! ```

pub mod access;
pub mod code;
pub mod error;
pub mod event;
pub mod guest;
pub mod repository;
pub mod rsvp;

pub use error::{ErrorKind, Result, StoreError};
pub use event::{Event, EventDetail, EventId, EventSummary, Invitation};
pub use guest::{Guest, GuestCode, GuestDetails};
pub use rsvp::RsvpState;
