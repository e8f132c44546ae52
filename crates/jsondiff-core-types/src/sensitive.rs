//! Redaction wrapper for client-supplied payloads
//!
//! Saved diffs are user content. Request structs hold the raw `state_json`
//! text inside `Sensitive<T>` so that `Debug` output (and therefore any
//! `?request` field in a log line) never echoes it.

use std::fmt;

/// Wrapper that redacts its contents in Debug and Display
///
/// # Example
///
/// ```
/// use jsondiff_core_types::Sensitive;
///
/// let payload = Sensitive::new(r#"{"left": "private"}"#.to_string());
/// assert_eq!(format!("{:?}", payload), "***REDACTED***");
/// assert!(payload.expose().contains("private"));
/// ```
pub struct Sensitive<T>(T);

impl<T> Sensitive<T> {
    /// Wrap a value
    pub fn new(value: T) -> Self {
        Self(value)
    }

    /// Borrow the underlying value
    pub fn expose(&self) -> &T {
        &self.0
    }

    /// Consume the wrapper and return the inner value
    pub fn into_inner(self) -> T {
        self.0
    }

    /// Transform the inner value without unwrapping it
    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> Sensitive<U> {
        Sensitive(f(self.0))
    }
}

impl<T> From<T> for Sensitive<T> {
    fn from(value: T) -> Self {
        Self(value)
    }
}

impl<T> fmt::Debug for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T> fmt::Display for Sensitive<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***REDACTED***")
    }
}

impl<T: Clone> Clone for Sensitive<T> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
