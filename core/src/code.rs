//! Guest code generation.
//!
//! Codes are 5 symbols drawn uniformly from a 62-symbol alphabet
//! (digits, upper and lower case ASCII letters), giving 62^5 (about 9.16e8)
//! combinations. Guest lists are small, so a collision with an existing code
//! is rare; the generator redraws on collision and gives up with
//! [`StoreError::CodeGenerationExhausted`] after [`GUEST_CODE_ATTEMPTS`] draws.
//!
//! The random source is injected. Production uses an entropy-seeded
//! [`StdRng`]; tests pass a fixed seed or a mock rng.
//!
//! # Example
//!
//! ```
//! use rsvp_core::code::GuestCodeGenerator;
//! use std::collections::HashSet;
//!
//! let generator = GuestCodeGenerator::seeded(7);
//! let code = generator.generate(&HashSet::new()).unwrap();
//! assert_eq!(code.as_str().len(), 5);
//! ```

use crate::error::{Result, StoreError};
use crate::guest::GuestCode;
use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// Number of symbols in a guest code.
pub const GUEST_CODE_LEN: usize = 5;

/// Symbols a guest code is drawn from.
pub const GUEST_CODE_ALPHABET: &[u8; 62] =
    b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz";

/// Draws attempted before giving up.
pub const GUEST_CODE_ATTEMPTS: u32 = 10;

/// Produces guest codes unique within one event.
///
/// Shareable across tasks; the random source sits behind a mutex held for
/// the duration of one [`GuestCodeGenerator::generate`] call.
#[derive(Debug)]
pub struct GuestCodeGenerator<R = StdRng> {
    rng: Mutex<R>,
    attempts: u32,
}

impl GuestCodeGenerator<StdRng> {
    /// Generator seeded from operating-system entropy.
    #[must_use]
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Deterministic generator for tests and reproducible runs.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }
}

impl Default for GuestCodeGenerator<StdRng> {
    fn default() -> Self {
        Self::from_entropy()
    }
}

impl<R: RngCore> GuestCodeGenerator<R> {
    /// Generator over a caller-supplied random source.
    #[must_use]
    pub const fn with_rng(rng: R) -> Self {
        Self {
            rng: Mutex::new(rng),
            attempts: GUEST_CODE_ATTEMPTS,
        }
    }

    /// Override the number of draws before giving up.
    #[must_use]
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Draw a code not contained in `exclude`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::CodeGenerationExhausted`] if every draw collided.
    pub fn generate(&self, exclude: &HashSet<&str>) -> Result<GuestCode> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        for _ in 0..self.attempts {
            let code = draw(&mut *rng);
            if !exclude.contains(code.as_str()) {
                return Ok(GuestCode::new_unchecked(code));
            }
        }

        Err(StoreError::CodeGenerationExhausted {
            attempts: self.attempts,
        })
    }
}

fn draw<R: RngCore + ?Sized>(rng: &mut R) -> String {
    (0..GUEST_CODE_LEN)
        .map(|_| char::from(GUEST_CODE_ALPHABET[rng.gen_range(0..GUEST_CODE_ALPHABET.len())]))
        .collect()
}
