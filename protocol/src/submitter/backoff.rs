//! Pause policies between failed attempts.

use std::time::Duration;

/// Decides how long to wait after the `failures`-th consecutive failure.
///
/// Implementations must be pure functions of the count so that tests can
/// substitute them without touching the state machine.
pub trait BackoffPolicy: Send + Sync {
    fn delay(&self, failures: u32) -> Duration;
}

/// The same pause after every failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedBackoff(pub Duration);

impl FixedBackoff {
    /// No pause at all. Handy for devnets and tests.
    pub const NONE: FixedBackoff = FixedBackoff(Duration::ZERO);
}

impl BackoffPolicy for FixedBackoff {
    fn delay(&self, _failures: u32) -> Duration {
        self.0
    }
}

impl<F> BackoffPolicy for F
where
    F: Fn(u32) -> Duration + Send + Sync,
{
    fn delay(&self, failures: u32) -> Duration {
        self(failures)
    }
}
