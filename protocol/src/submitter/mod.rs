//! # Transaction Submitter
//!
//! Gets a state-changing contract call mined despite flaky nodes, stuck
//! nonces and underpriced transactions, without ever having two competing
//! mutations in flight for the same signer.
//!
//! - `engine.rs`: [`Submitter`], its config and the Build/Submit/Confirm loop.
//! - `attempt.rs`: [`SubmissionAttempt`], the per-attempt state value.
//! - `backoff.rs`: [`BackoffPolicy`] and [`FixedBackoff`].
//! - `sequencer.rs`: [`NonceSequencer`], one in-flight submission per signer.
//! - `metrics.rs`: Prometheus counters.
//! - `error.rs`: [`SubmitError`] and [`AttemptFailure`].

pub mod attempt;
pub mod backoff;
pub mod engine;
pub mod metrics;
pub mod sequencer;

mod error;

pub use attempt::SubmissionAttempt;
pub use backoff::{BackoffPolicy, FixedBackoff};
pub use engine::{ConfigError, Intent, SubmitOutcome, Submitter, SubmitterConfig};
pub use error::{AttemptFailure, SubmitError};
pub use metrics::SubmitterMetrics;
pub use sequencer::{IdentityGuard, NonceSequencer};
