//! Identifier generation for saved diffs
//!
//! A candidate id is the digit string of a random fraction, cut or
//! zero-padded on the left to exactly `ID_DIGITS` digits, then encoded as
//! unpadded URL-safe base64, so every id is `ID_LEN` characters.
//! Candidates are checked against the store and redrawn on collision, at
//! most `max_attempts` times.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::Rng;

use crate::errors::{DiffError, ExResult};
use crate::model::DiffId;
use crate::ops::DiffStore;

/// Decimal digits fed to the encoder
pub const ID_DIGITS: usize = 12;

/// Length of every generated id: 12 bytes encode to 16 base64 characters
pub const ID_LEN: usize = 16;

/// Default bound on collision redraws
pub const DEFAULT_MAX_ATTEMPTS: u32 = 16;

/// Source of random fractions in `[0, 1)`
pub trait RandomSource: Send + Sync {
    fn next_fraction(&self) -> f64;
}

/// Default source backed by the thread-local RNG
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadRngSource;

impl RandomSource for ThreadRngSource {
    fn next_fraction(&self) -> f64 {
        rand::thread_rng().gen::<f64>()
    }
}

/// Replays a fixed list of fractions, wrapping around at the end
///
/// # Example
/// ```
/// use jsondiff_core::id_gen::{RandomSource, SequenceSource};
///
/// let source = SequenceSource::new(vec![0.25, 0.5]);
/// assert_eq!(source.next_fraction(), 0.25);
/// assert_eq!(source.next_fraction(), 0.5);
/// assert_eq!(source.next_fraction(), 0.25);
/// ```
#[derive(Debug)]
pub struct SequenceSource {
    values: Vec<f64>,
    next: AtomicUsize,
}

impl SequenceSource {
    /// An empty list behaves like a source that always returns 0.0
    pub fn new(values: Vec<f64>) -> Self {
        Self {
            values,
            next: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceSource {
    fn next_fraction(&self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }
        let i = self.next.fetch_add(1, Ordering::Relaxed);
        self.values[i % self.values.len()]
    }
}

/// Turn a fraction into a candidate identifier
///
/// Values outside `[0, 1)` are folded back into range by taking the
/// fractional part of their absolute value; NaN becomes 0.
pub fn candidate_from_fraction(fraction: f64) -> DiffId {
    let fraction = if fraction.is_finite() {
        fraction.abs().fract()
    } else {
        0.0
    };
    let repr = fraction.to_string();
    let digits: String = repr
        .strip_prefix("0.")
        .unwrap_or("")
        .chars()
        .take(ID_DIGITS)
        .collect();
    let padded = format!("{:0>width$}", digits, width = ID_DIGITS);

    DiffId::from_encoded(URL_SAFE_NO_PAD.encode(padded.as_bytes()))
}

/// Generates identifiers that are free in a given store
#[derive(Clone)]
pub struct IdGenerator {
    source: Arc<dyn RandomSource>,
    max_attempts: u32,
}

impl IdGenerator {
    pub fn new(source: Arc<dyn RandomSource>, max_attempts: u32) -> Self {
        Self {
            source,
            max_attempts,
        }
    }

    /// Thread RNG with the default attempt bound
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(ThreadRngSource), DEFAULT_MAX_ATTEMPTS)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Draw one candidate without checking the store
    pub fn candidate(&self) -> DiffId {
        candidate_from_fraction(self.source.next_fraction())
    }

    /// Draw candidates until one is not present in `store`
    ///
    /// A free id can still be taken by a concurrent writer before it is
    /// used; `DiffStore::put` refuses duplicates, so callers must handle
    /// `AlreadyExists`.
    ///
    /// # Errors
    ///
    /// Returns `IdSpaceExhausted` after `max_attempts` collisions, or the
    /// store's error if a lookup fails.
    pub fn generate_unique_id(&self, store: &dyn DiffStore) -> ExResult<DiffId> {
        for attempt in 1..=self.max_attempts {
            let candidate = self.candidate();
            if !store.contains(&candidate)? {
                return Ok(candidate);
            }
            tracing::debug!(
                attempt,
                model_id = %candidate,
                "identifier collision, drawing again"
            );
        }
        Err(DiffError::IdSpaceExhausted {
            attempts: self.max_attempts,
        }
        .into())
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl std::fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdGenerator")
            .field("max_attempts", &self.max_attempts)
            .finish_non_exhaustive()
    }
}
