//! Shared market quotes.
//!
//! A [`Quote`] is a cheap handle to a value that may change between
//! bootstraps. Clones share the same storage, so a market data feed can
//! hold one clone and the rate helpers another:
//!
//! ```rust
//! use pillar_curves::quote::Quote;
//!
//! let feed = Quote::new(0.0425);
//! let held_by_helper = feed.clone();
//! feed.set_value(0.0430);
//! assert_eq!(held_by_helper.value(), 0.0430);
//! ```
//!
//! Bootstraps read each quote exactly once and solve against that snapshot,
//! so a concurrent update never changes a quote in the middle of a solve.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Thread-safe observable scalar.
///
/// An empty quote holds `NaN` and reports `is_valid() == false`.
#[derive(Clone)]
pub struct Quote {
    bits: Arc<AtomicU64>,
}

impl Quote {
    /// Creates a quote holding `value`.
    #[must_use]
    pub fn new(value: f64) -> Self {
        Self {
            bits: Arc::new(AtomicU64::new(value.to_bits())),
        }
    }

    /// Creates a quote with no value.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(f64::NAN)
    }

    /// Current value (`NaN` when empty).
    #[must_use]
    pub fn value(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    /// Replaces the value seen by every clone of this quote.
    pub fn set_value(&self, value: f64) {
        self.bits.store(value.to_bits(), Ordering::Release);
    }

    /// True when the quote holds a finite value.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.value().is_finite()
    }

    /// True when both handles share storage.
    #[must_use]
    pub fn same_as(&self, other: &Quote) -> bool {
        Arc::ptr_eq(&self.bits, &other.bits)
    }
}

impl Default for Quote {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<f64> for Quote {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl fmt::Debug for Quote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Quote").field(&self.value()).finish()
    }
}
