//! # RSVP Testing
//!
//! Testing utilities for the RSVP event aggregate store.
//!
//! This crate provides:
//! - An in-memory `EventRepository` with write-conflict injection
//! - Deterministic guest code generators and store fixtures
//! - Property-based testing strategies
//!
//! ## Example
//!
//! ```
//! use rsvp_testing::test_store;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let (repo, store) = test_store();
//! let event = store.create_event("Launch Party").await.unwrap();
//!
//! repo.inject_conflicts(2);
//! let code = store.add_guest(event.id(), "Ana", "ana@x", "host@x").await.unwrap();
//!
//! let event = store.get_event(event.id()).await.unwrap();
//! assert_eq!(event.guests()[0].code(), &code);
//! # }
//! ```

mod repository_mocks;

pub use repository_mocks::InMemoryEventRepository;

/// Deterministic fixtures.
pub mod fixtures {
    use crate::InMemoryEventRepository;
    use rsvp_core::code::GuestCodeGenerator;
    use rsvp_runtime::{EventAggregateStore, RetryPolicy};
    use std::sync::Arc;

    /// Seed used by [`test_store`].
    pub const TEST_SEED: u64 = 0x5253_5650;

    /// Conflict retries allowed by [`test_store`].
    ///
    /// High enough that fan-out tests with dozens of concurrent writers on
    /// one event do not exhaust it.
    pub const TEST_MAX_RETRIES: u32 = 256;

    /// Store type returned by the fixtures.
    pub type TestStore = EventAggregateStore<InMemoryEventRepository>;

    /// Guest code generator with a fixed seed.
    #[must_use]
    pub fn seeded_codes(seed: u64) -> GuestCodeGenerator {
        GuestCodeGenerator::seeded(seed)
    }

    /// An empty in-memory store that retries without waiting.
    ///
    /// The repository handle is returned so tests can inject conflicts and
    /// inspect counters.
    #[must_use]
    pub fn test_store() -> (Arc<InMemoryEventRepository>, TestStore) {
        test_store_with_policy(RetryPolicy::immediate(TEST_MAX_RETRIES))
    }

    /// Like [`test_store`] with a caller-chosen retry policy.
    #[must_use]
    pub fn test_store_with_policy(policy: RetryPolicy) -> (Arc<InMemoryEventRepository>, TestStore) {
        let repo = Arc::new(InMemoryEventRepository::new());
        let store =
            EventAggregateStore::with_generator(Arc::clone(&repo), policy, seeded_codes(TEST_SEED));
        (repo, store)
    }

    /// Install a `tracing` subscriber that writes through the test harness.
    ///
    /// Filtered by `RUST_LOG`. Safe to call from every test; only the first
    /// call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_target(false)
            .with_test_writer()
            .try_init();
    }
}

/// Property-based testing strategies using proptest.
pub mod properties {
    use proptest::prelude::*;
    use rsvp_core::code::GUEST_CODE_ALPHABET;
    use rsvp_core::guest::{GuestCode, GuestDetails};

    /// A name made of letters and spaces, starting with a letter.
    pub fn name() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z ]{0,15}"
    }

    /// A simple `local@domain` address.
    pub fn email() -> impl Strategy<Value = String> {
        "[a-z]{1,8}@[a-z]{1,6}\\.(com|org|net)"
    }

    /// Valid guest details.
    pub fn guest_details() -> impl Strategy<Value = GuestDetails> {
        (name(), email(), email()).prop_filter_map("details are non-empty", |(n, e, h)| {
            GuestDetails::new(n, e, h).ok()
        })
    }

    /// Any well-formed guest code.
    pub fn guest_code() -> impl Strategy<Value = GuestCode> {
        proptest::collection::vec(proptest::sample::select(GUEST_CODE_ALPHABET.to_vec()), 5)
            .prop_filter_map("code is well-formed", |symbols| {
                String::from_utf8(symbols).ok()?.parse().ok()
            })
    }

    /// Text made only of whitespace, possibly none.
    pub fn blank() -> impl Strategy<Value = String> {
        "[ \t]{0,4}"
    }
}

pub use fixtures::{init_test_tracing, seeded_codes, test_store, test_store_with_policy};

#[cfg(test)]
#[allow(clippy::unwrap_used)] // Test code can use unwrap
mod tests {
    use super::properties::*;
    use super::*;
    use proptest::prelude::*;
    use rsvp_core::error::StoreError;
    use rsvp_core::guest::GuestDetails;

    #[test]
    fn seeded_codes_are_reproducible() {
        let none = std::collections::HashSet::new();
        let a = seeded_codes(3).generate(&none).unwrap();
        let b = seeded_codes(3).generate(&none).unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_store_starts_empty() {
        let (repo, store) = test_store();
        assert!(repo.is_empty());
        assert!(store.list_events().await.unwrap().is_empty());
    }

    proptest! {
        #[test]
        fn generated_details_are_accepted(details in guest_details()) {
            prop_assert!(!details.name().trim().is_empty());
            prop_assert!(details.email().contains('@'));
        }

        #[test]
        fn generated_codes_round_trip(code in guest_code()) {
            prop_assert_eq!(code.as_str().parse::<rsvp_core::GuestCode>().unwrap(), code);
        }

        #[test]
        fn only_empty_fields_are_rejected(text in blank(), other in email()) {
            let result = GuestDetails::new(text.clone(), other.clone(), other);
            if text.is_empty() {
                prop_assert!(matches!(result, Err(StoreError::InvalidInput(_))));
            } else {
                let details = result.unwrap();
                prop_assert_eq!(details.name(), text.as_str());
            }
        }
    }
}
