//! `PostgreSQL` storage for the RSVP event aggregate store.
//!
//! This crate provides [`PostgresEventRepository`], an implementation of the
//! `EventRepository` trait from `rsvp-core`. It supports:
//!
//! - Whole-aggregate reads and writes (guest lists stored as JSONB)
//! - Optimistic concurrency through a per-row version column
//! - Connection pooling configured from the environment
//! - Embedded migrations
//!
//! # Example
//!
//! ```ignore
//! use rsvp_postgres::{PostgresConfig, PostgresEventRepository};
//! use rsvp_runtime::{EventAggregateStore, RetryConfig};
//! use std::sync::Arc;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let repo = PostgresEventRepository::from_config(&PostgresConfig::from_env()).await?;
//!     repo.migrate().await?;
//!     let store = EventAggregateStore::from_config(Arc::new(repo), &RetryConfig::from_env());
//!     Ok(())
//! }
//! ```

mod config;
mod repository;

pub use config::PostgresConfig;
pub use repository::PostgresEventRepository;
