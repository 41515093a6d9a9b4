//! Values that expire on their own.

use chrono::{DateTime, Duration, Utc};

/// A value visible until a deadline.
///
/// The owner checks it against the current time on every read, so expiry
/// needs no background timer and cannot fire after the owner is gone.
/// Cancelling is dropping the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transient<T> {
    value: T,
    expires_at: DateTime<Utc>,
}

impl<T> Transient<T> {
    /// Value visible from `now` for `lifetime`.
    #[must_use]
    pub fn new(value: T, now: DateTime<Utc>, lifetime: Duration) -> Self {
        Self {
            value,
            expires_at: now + lifetime,
        }
    }

    /// The value, unless it has expired at `now`.
    #[must_use]
    pub fn get(&self, now: DateTime<Utc>) -> Option<&T> {
        (now < self.expires_at).then_some(&self.value)
    }

    /// When the value stops being visible.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }
}
