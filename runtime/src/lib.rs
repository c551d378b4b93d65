//! # RSVP Runtime
//!
//! Runtime for the RSVP event aggregate store.
//!
//! This crate turns the types and repository trait of `rsvp-core` into the
//! operations the HTTP layer calls, with every mutation running as a
//! retried read-transform-write cycle.
//!
//! ## Core Components
//!
//! - **Store**: typed operations (create, list, rename, delete, guests, RSVP)
//! - **Mutation Executor**: applies transform closures with optimistic retries
//! - **Retry**: bounded exponential backoff used for write conflicts
//! - **Config / Metrics**: environment configuration and Prometheus metrics
//!
//! ## Example
//!
//! ```ignore
//! use rsvp_runtime::{EventAggregateStore, RetryConfig};
//! use std::sync::Arc;
//!
//! let store = EventAggregateStore::from_config(Arc::new(repository), &RetryConfig::from_env());
//!
//! let event = store.create_event("Launch Party").await?;
//! let code = store.add_guest(event.id(), "Ana", "ana@x", "host@x").await?;
//! let invitation = store.record_response(event.id(), &code, true).await?;
//! println!("{}", invitation.respond_path());
//! ```

/// Environment configuration
pub mod config;

/// Read-transform-write engine with conflict retries
pub mod executor;

/// Prometheus metrics for observability
pub mod metrics;

/// Retry logic with exponential backoff
pub mod retry;

/// Event aggregate store operations
pub mod store;

pub use config::RetryConfig;
pub use executor::MutationExecutor;
pub use retry::RetryPolicy;
pub use store::EventAggregateStore;
