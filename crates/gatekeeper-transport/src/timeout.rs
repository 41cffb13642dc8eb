//! Timeout normalization (§4.5, §8): every caller-supplied timeout is
//! clamped into `[50 ms, 30 s]`; anything outside that domain falls back to
//! the default.

use std::time::Duration;

/// Default per-call timeout when the caller does not specify one.
pub const DEFAULT: Duration = Duration::from_millis(2_500);

const MIN: Duration = Duration::from_millis(50);
const MAX: Duration = Duration::from_secs(30);

/// Clamps `timeout` into `[50 ms, 30 s]`. A `None` timeout yields
/// [`DEFAULT`].
#[must_use]
pub fn normalize(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(t) if t < MIN || t > MAX => DEFAULT,
        Some(t) => t,
        None => DEFAULT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn within_range_is_unchanged() {
        assert_eq!(normalize(Some(Duration::from_secs(1))), Duration::from_secs(1));
    }

    #[test]
    fn below_minimum_falls_back_to_default() {
        assert_eq!(normalize(Some(Duration::from_millis(1))), DEFAULT);
    }

    #[test]
    fn above_maximum_falls_back_to_default() {
        assert_eq!(normalize(Some(Duration::from_secs(60))), DEFAULT);
    }

    #[test]
    fn none_is_default() {
        assert_eq!(normalize(None), DEFAULT);
    }

    #[test]
    fn boundaries_are_inclusive() {
        assert_eq!(normalize(Some(Duration::from_millis(50))), Duration::from_millis(50));
        assert_eq!(normalize(Some(Duration::from_secs(30))), Duration::from_secs(30));
    }
}
