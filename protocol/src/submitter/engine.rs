//! The submission state machine.
//!
//! ```text
//!            ┌──────── send failed (≤ S) ────────┐
//!            ▼                                    │
//!   ──▶  Build ──prepared──▶ Submit ──sent──▶ Confirm ──mined──▶ Confirmed
//!            ▲                  │                 │
//!            │                  └─ nonce too low, │
//!            │                     escalated ─────┼──────────▶ Superseded
//!            └──────── confirm failed (≤ C) ──────┘
//! ```
//!
//! Every rebuild after the first prepared transaction keeps its nonce and
//! raises the gas price by one increment, so at most one of the attempts
//! can ever be mined. A `NonceTooLow` rejection of an escalated attempt,
//! after an earlier attempt at that nonce was sent, means that earlier
//! attempt already landed; that is success. The same rejection before
//! anything was sent only means the nonce was stale, and the next attempt
//! lets the ledger assign a new one.
//!
//! Submissions for one signer are serialized through a [`NonceSequencer`]
//! and each runs inside its own tracing span carrying a submission id.
//! Callers that must keep other work under the same slot acquire it
//! themselves and use [`Submitter::submit_holding`].

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::attempt::SubmissionAttempt;
use super::backoff::{BackoffPolicy, FixedBackoff};
use super::error::{AttemptFailure, SubmitError};
use super::metrics::SubmitterMetrics;
use super::sequencer::{IdentityGuard, NonceSequencer};
use crate::config;
use crate::crypto::ChannelKeypair;
use crate::ledger::{
    ConfirmationChecker, ConfirmationFailure, ContractCall, LedgerClient, LedgerError, Receipt,
    SignedTx, TxTarget,
};

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Tunable submission parameters. Defaults come from [`crate::config`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmitterConfig {
    /// Gas price of every first attempt, in wei.
    pub base_gas_price_wei: u64,
    /// Added to the previous attempt's price on every rebuild, in wei.
    pub gas_price_increment_wei: u64,
    pub gas_limit: u64,
    /// Send failures tolerated; the next one ends the submission.
    pub send_retry_limit: u32,
    /// Confirmation failures tolerated; the next one ends the submission.
    pub confirm_retry_limit: u32,
    /// Pause after each send failure, in milliseconds.
    pub send_backoff_ms: u64,
}

impl Default for SubmitterConfig {
    fn default() -> Self {
        Self {
            base_gas_price_wei: config::DEFAULT_GAS_PRICE_WEI,
            gas_price_increment_wei: config::GAS_PRICE_INCREMENT_WEI,
            gas_limit: config::DEFAULT_GAS_LIMIT,
            send_retry_limit: config::SEND_RETRY_LIMIT,
            confirm_retry_limit: config::CONFIRM_RETRY_LIMIT,
            send_backoff_ms: config::RETRY_TX_BACKOFF.as_millis() as u64,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gas price increment must be positive")]
    ZeroIncrement,

    #[error("gas limit must be positive")]
    ZeroGasLimit,

    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),
}

impl SubmitterConfig {
    /// Loads a JSON config file. Missing fields fall back to the defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let cfg: Self = serde_json::from_str(&text)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.gas_price_increment_wei == 0 {
            return Err(ConfigError::ZeroIncrement);
        }
        if self.gas_limit == 0 {
            return Err(ConfigError::ZeroGasLimit);
        }
        Ok(())
    }

    pub fn base_gas_price(&self) -> U256 {
        U256::from(self.base_gas_price_wei)
    }

    pub fn gas_price_increment(&self) -> U256 {
        U256::from(self.gas_price_increment_wei)
    }

    pub fn send_backoff(&self) -> Duration {
        Duration::from_millis(self.send_backoff_ms)
    }
}

// ---------------------------------------------------------------------------
// Intent & Outcome
// ---------------------------------------------------------------------------

/// What a submission is trying to get mined.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Intent {
    pub target: TxTarget,
    pub call: ContractCall,
    /// Value attached, in wei.
    pub value: U256,
}

impl Intent {
    /// Contract creation; `call` must be a constructor call.
    pub fn create(call: ContractCall, value: U256) -> Self {
        Self {
            target: TxTarget::Create,
            call,
            value,
        }
    }

    /// Call on an existing contract, no value attached.
    pub fn call(to: Address, call: ContractCall) -> Self {
        Self {
            target: TxTarget::Call(to),
            call,
            value: U256::ZERO,
        }
    }
}

/// How a submission succeeded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// `tx` was mined and executed.
    Confirmed {
        tx: SignedTx,
        receipt: Receipt,
        attempts: u32,
    },
    /// The nonce was consumed by one of the earlier attempts, which are all
    /// replacements of one another. `tx` is the attempt that was rejected;
    /// `replaced` the most recent attempt before it.
    SupersededByReplacement {
        tx: SignedTx,
        replaced: Option<SignedTx>,
        attempts: u32,
    },
}

impl SubmitOutcome {
    /// The last transaction this submission produced.
    pub fn tx(&self) -> &SignedTx {
        match self {
            SubmitOutcome::Confirmed { tx, .. } => tx,
            SubmitOutcome::SupersededByReplacement { tx, .. } => tx,
        }
    }

    pub fn tx_hash(&self) -> B256 {
        self.tx().hash
    }

    pub fn attempts(&self) -> u32 {
        match self {
            SubmitOutcome::Confirmed { attempts, .. } => *attempts,
            SubmitOutcome::SupersededByReplacement { attempts, .. } => *attempts,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, SubmitOutcome::Confirmed { .. })
    }

    /// Address of the created contract. Replacements share a nonce and
    /// therefore the address, so this is known even when superseded.
    pub fn contract_address(&self) -> Option<Address> {
        match self {
            SubmitOutcome::Confirmed { tx, receipt, .. } => {
                receipt.contract_address.or(tx.contract_address)
            }
            SubmitOutcome::SupersededByReplacement { tx, .. } => tx.contract_address,
        }
    }

    fn label(&self) -> &'static str {
        match self {
            SubmitOutcome::Confirmed { .. } => "confirmed",
            SubmitOutcome::SupersededByReplacement { .. } => "superseded",
        }
    }
}

// ---------------------------------------------------------------------------
// Submitter
// ---------------------------------------------------------------------------

enum Step {
    Build(SubmissionAttempt),
    Submit(SubmissionAttempt, SignedTx),
    Confirm(SubmissionAttempt, SignedTx),
}

/// Drives state-changing calls to completion. Cheap to clone; clones share
/// the ledger, sequencer and metrics.
#[derive(Clone)]
pub struct Submitter {
    ledger: Arc<dyn LedgerClient>,
    checker: Arc<dyn ConfirmationChecker>,
    config: SubmitterConfig,
    backoff: Arc<dyn BackoffPolicy>,
    sequencer: NonceSequencer,
    metrics: Option<SubmitterMetrics>,
}

impl Submitter {
    /// Fails if `config` does not validate. The submitter starts out on the
    /// process-wide [`NonceSequencer::global`].
    pub fn new(
        ledger: Arc<dyn LedgerClient>,
        checker: Arc<dyn ConfirmationChecker>,
        config: SubmitterConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let backoff = Arc::new(FixedBackoff(config.send_backoff()));
        Ok(Self {
            ledger,
            checker,
            config,
            backoff,
            sequencer: NonceSequencer::global(),
            metrics: None,
        })
    }

    pub fn with_backoff(mut self, policy: Arc<dyn BackoffPolicy>) -> Self {
        self.backoff = policy;
        self
    }

    /// Serialize through `sequencer` instead of the global one.
    pub fn with_sequencer(mut self, sequencer: NonceSequencer) -> Self {
        self.sequencer = sequencer;
        self
    }

    pub fn with_metrics(mut self, metrics: SubmitterMetrics) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn config(&self) -> &SubmitterConfig {
        &self.config
    }

    pub fn sequencer(&self) -> &NonceSequencer {
        &self.sequencer
    }

    /// Submit `intent` signed by `signer` and wait for a terminal state.
    ///
    /// Waits for any other submission by the same signer to finish first.
    pub async fn submit(
        &self,
        signer: &ChannelKeypair,
        intent: Intent,
    ) -> Result<SubmitOutcome, SubmitError> {
        let slot = self.sequencer.acquire(signer.address()).await;
        self.submit_holding(&slot, signer, intent).await
    }

    /// [`submit`](Self::submit) for a caller that already holds the
    /// signer's slot on this submitter's sequencer, so that reads and
    /// writes around the submission happen under the same slot.
    pub async fn submit_holding(
        &self,
        slot: &IdentityGuard,
        signer: &ChannelKeypair,
        intent: Intent,
    ) -> Result<SubmitOutcome, SubmitError> {
        let from = signer.address();
        if slot.identity() != from {
            return Err(SubmitError::SlotMismatch {
                held: slot.identity(),
                signer: from,
            });
        }

        let span = info_span!(
            "submission",
            submission_id = %Uuid::new_v4(),
            method = %intent.call.method,
            from = %from,
        );

        async move {
            let result = self.drive(signer, &intent).await;
            self.record(&result);
            result
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        signer: &ChannelKeypair,
        intent: &Intent,
    ) -> Result<SubmitOutcome, SubmitError> {
        let from = signer.address();
        let base = self.config.base_gas_price();
        let mut step = Step::Build(SubmissionAttempt::first(base));

        loop {
            step = match step {
                Step::Build(attempt) => {
                    if let Some(m) = &self.metrics {
                        m.attempts_total.inc();
                    }
                    debug!(
                        attempt = attempt.number,
                        nonce = ?attempt.nonce,
                        gas_price = %attempt.gas_price,
                        "building transaction"
                    );
                    let request = attempt.request(from, intent, self.config.gas_limit);
                    match self.ledger.prepare(&request, signer).await {
                        Ok(tx) => Step::Submit(attempt, tx),
                        Err(LedgerError::InvalidKey(reason)) => {
                            warn!(%reason, "signing context unavailable");
                            return Err(SubmitError::SigningContext(reason));
                        }
                        Err(err) => self.send_failed(attempt, None, err).await?,
                    }
                }

                Step::Submit(attempt, tx) => match self.ledger.send(&tx).await {
                    Ok(hash) => {
                        debug!(tx = %hash, nonce = tx.nonce, "transaction sent");
                        Step::Confirm(attempt, SignedTx { hash, ..tx })
                    }
                    Err(err)
                        if err.is_nonce_too_low()
                            && attempt.maybe_landed
                            && attempt.is_escalated(base) =>
                    {
                        info!(
                            attempt = attempt.number,
                            nonce = tx.nonce,
                            "nonce already used by an earlier attempt, treating as replaced"
                        );
                        return Ok(SubmitOutcome::SupersededByReplacement {
                            replaced: attempt.last.clone(),
                            attempts: attempt.number,
                            tx,
                        });
                    }
                    Err(err) if err.is_nonce_too_low() && !attempt.maybe_landed => {
                        self.nonce_taken(attempt, &tx, err).await?
                    }
                    Err(err) => self.send_failed(attempt, Some(&tx), err).await?,
                },

                Step::Confirm(attempt, tx) => match self.checker.wait_mined(&tx).await {
                    Ok(receipt) => {
                        info!(
                            tx = %tx.hash,
                            block = receipt.block_number,
                            attempts = attempt.number,
                            "transaction confirmed"
                        );
                        return Ok(SubmitOutcome::Confirmed {
                            tx,
                            receipt,
                            attempts: attempt.number,
                        });
                    }
                    Err(failure) => self.confirm_failed(attempt, &tx, failure)?,
                },
            };
        }
    }

    async fn send_failed(
        &self,
        attempt: SubmissionAttempt,
        prepared: Option<&SignedTx>,
        err: LedgerError,
    ) -> Result<Step, SubmitError> {
        let next = attempt.after_send_failure(prepared, self.config.gas_price_increment());
        self.retry_send(attempt, next, err).await
    }

    /// The nonce was used by something other than this submission. Rebuild
    /// on a fresh ledger-assigned nonce instead of pinning the stale one.
    async fn nonce_taken(
        &self,
        attempt: SubmissionAttempt,
        tx: &SignedTx,
        err: LedgerError,
    ) -> Result<Step, SubmitError> {
        debug!(nonce = tx.nonce, "nonce taken outside this submission, releasing pin");
        let next = attempt.after_stale_nonce();
        self.retry_send(attempt, next, err).await
    }

    async fn retry_send(
        &self,
        attempt: SubmissionAttempt,
        next: SubmissionAttempt,
        err: LedgerError,
    ) -> Result<Step, SubmitError> {
        if let Some(m) = &self.metrics {
            m.send_failures_total.with_label_values(&[err.kind()]).inc();
        }

        if next.send_retries > self.config.send_retry_limit {
            warn!(attempts = attempt.number, error = %err, "send retries exhausted");
            return Err(SubmitError::RetryBudgetExhausted {
                attempts: attempt.number,
                nonce: next.nonce,
                last: AttemptFailure::Send(err),
            });
        }

        let delay = self.backoff.delay(next.send_retries);
        warn!(
            attempt = attempt.number,
            retries = next.send_retries,
            kind = err.kind(),
            error = %err,
            backoff_ms = delay.as_millis() as u64,
            "send failed, rebuilding"
        );
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        Ok(Step::Build(next))
    }

    fn confirm_failed(
        &self,
        attempt: SubmissionAttempt,
        tx: &SignedTx,
        failure: ConfirmationFailure,
    ) -> Result<Step, SubmitError> {
        if let Some(m) = &self.metrics {
            m.confirm_failures_total.inc();
        }

        let next = attempt.after_confirm_failure(tx, self.config.gas_price_increment());
        if next.confirm_retries > self.config.confirm_retry_limit {
            warn!(attempts = attempt.number, error = %failure, "confirmation retries exhausted");
            return Err(SubmitError::RetryBudgetExhausted {
                attempts: attempt.number,
                nonce: next.nonce,
                last: AttemptFailure::Confirm(failure),
            });
        }

        warn!(
            attempt = attempt.number,
            retries = next.confirm_retries,
            error = %failure,
            "confirmation failed, rebuilding"
        );
        Ok(Step::Build(next))
    }

    fn record(&self, result: &Result<SubmitOutcome, SubmitError>) {
        let Some(m) = &self.metrics else { return };
        match result {
            Ok(outcome) => m.finished(outcome.label(), outcome.attempts()),
            Err(SubmitError::RetryBudgetExhausted { attempts, .. }) => {
                m.finished("exhausted", *attempts)
            }
            Err(SubmitError::SigningContext(_)) => {
                m.submissions_total.with_label_values(&["signing_context"]).inc()
            }
            Err(SubmitError::SlotMismatch { .. }) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use tokio::time::Instant;

    use super::*;
    use crate::ledger::{LedgerEvent, ScriptedLedger};

    fn fast_config() -> SubmitterConfig {
        SubmitterConfig {
            base_gas_price_wei: 100,
            gas_price_increment_wei: 100,
            gas_limit: 1_000_000,
            send_retry_limit: 5,
            confirm_retry_limit: 3,
            send_backoff_ms: 0,
        }
    }

    fn setup(config: SubmitterConfig) -> (Arc<ScriptedLedger>, Submitter, ChannelKeypair) {
        let ledger = Arc::new(ScriptedLedger::new());
        let submitter = Submitter::new(ledger.clone(), ledger.clone(), config).unwrap();
        (ledger, submitter, ChannelKeypair::generate())
    }

    fn timeout_intent() -> Intent {
        Intent::call(Address::repeat_byte(0xcc), ContractCall::channel_timeout())
    }

    fn transport() -> LedgerError {
        LedgerError::Transport("connection reset".into())
    }

    #[tokio::test]
    async fn first_try_confirms_at_base_price() {
        let (ledger, submitter, key) = setup(fast_config());

        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        assert!(outcome.is_confirmed());
        assert_eq!(outcome.attempts(), 1);
        assert_eq!(outcome.tx().gas_price, U256::from(100u64));
        assert_eq!(outcome.tx().nonce, 0);
        assert_eq!(ledger.prepared()[0].nonce, None);
    }

    #[tokio::test]
    async fn send_failures_escalate_price_on_a_pinned_nonce() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.set_pending_nonce(key.address(), 4);
        ledger.fail_sends(3, transport());

        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        assert_eq!(outcome.attempts(), 4);
        assert_eq!(outcome.tx().nonce, 4);
        assert_eq!(outcome.tx().gas_price, U256::from(100u64 + 3 * 100));

        let prepared = ledger.prepared();
        assert_eq!(prepared.len(), 4);
        assert_eq!(prepared[0].nonce, None);
        for (k, req) in prepared.iter().enumerate().skip(1) {
            assert_eq!(req.nonce, Some(4));
            assert_eq!(req.gas_price, U256::from(100u64 + 100 * k as u64));
        }
    }

    #[tokio::test]
    async fn send_budget_allows_exactly_limit_plus_one_attempts() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.fail_sends(6, transport());

        let err = submitter.submit(&key, timeout_intent()).await.unwrap_err();

        match err {
            SubmitError::RetryBudgetExhausted { attempts, nonce, last } => {
                assert_eq!(attempts, 6);
                assert_eq!(nonce, Some(0));
                assert_eq!(last, AttemptFailure::Send(transport()));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(ledger.send_attempts(), 6);
        assert!(ledger.receipts().is_empty());
    }

    #[tokio::test]
    async fn confirm_budget_exhaustion() {
        let (ledger, submitter, key) = setup(fast_config());
        let failure = ConfirmationFailure::TimedOut(B256::ZERO);
        ledger.fail_confirms(4, failure.clone());

        let err = submitter.submit(&key, timeout_intent()).await.unwrap_err();

        assert_eq!(err.last_failure(), Some(&AttemptFailure::Confirm(failure)));
        // Every rebuild after a confirmation failure is a replacement.
        let sent = ledger.sent();
        assert_eq!(sent.len(), 4);
        assert!(sent.iter().all(|tx| tx.nonce == 0));
        assert_eq!(sent[3].gas_price, U256::from(400u64));
    }

    #[tokio::test]
    async fn confirm_failure_then_success() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.fail_confirms(1, ConfirmationFailure::Dropped(B256::ZERO));

        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        assert!(outcome.is_confirmed());
        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.tx().gas_price, U256::from(200u64));
    }

    #[tokio::test]
    async fn nonce_too_low_after_escalation_is_success() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.fail_sends(1, transport());
        ledger.fail_sends(1, LedgerError::NonceTooLow("nonce 0 used".into()));

        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        match &outcome {
            SubmitOutcome::SupersededByReplacement { tx, replaced, attempts } => {
                assert_eq!(*attempts, 2);
                assert_eq!(tx.nonce, 0);
                assert_eq!(replaced.as_ref().map(|r| r.nonce), Some(0));
            }
            other => panic!("expected superseded, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn nonce_too_low_at_base_price_is_retried() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.fail_sends(1, LedgerError::NonceTooLow("stale nonce".into()));

        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        assert!(outcome.is_confirmed());
        assert_eq!(outcome.attempts(), 2);
        // Nothing of ours holds that nonce: no pin, no price bump.
        assert_eq!(outcome.tx().gas_price, U256::from(100u64));
        assert_eq!(ledger.prepared()[1].nonce, None);
    }

    #[tokio::test]
    async fn repeated_stale_nonce_is_never_taken_for_a_replacement() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.fail_sends(2, LedgerError::NonceTooLow("stale nonce".into()));

        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        assert!(outcome.is_confirmed());
        assert_eq!(outcome.attempts(), 3);
        assert_eq!(ledger.receipts().len(), 1);
        assert!(ledger.prepared().iter().all(|req| req.nonce.is_none()));
    }

    #[tokio::test]
    async fn invalid_key_is_fatal() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.fail_prepare(LedgerError::InvalidKey("locked".into()));

        let err = submitter.submit(&key, timeout_intent()).await.unwrap_err();

        assert_eq!(err, SubmitError::SigningContext("locked".into()));
        assert_eq!(ledger.send_attempts(), 0);
    }

    #[tokio::test]
    async fn failed_preparation_counts_as_send_failure() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.fail_prepare(transport());

        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        assert_eq!(outcome.attempts(), 2);
        // Nothing was prepared before, so nothing is being replaced.
        assert_eq!(outcome.tx().gas_price, U256::from(100u64));
        assert_eq!(ledger.prepared()[0].nonce, None);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_applies_after_send_failures_only() {
        let config = SubmitterConfig {
            send_backoff_ms: 60_000,
            ..fast_config()
        };
        let (ledger, submitter, key) = setup(config);
        ledger.fail_sends(2, transport());
        ledger.fail_confirms(1, ConfirmationFailure::Dropped(B256::ZERO));

        let started = Instant::now();
        let outcome = submitter.submit(&key, timeout_intent()).await.unwrap();

        assert_eq!(outcome.attempts(), 4);
        let waited = started.elapsed();
        assert!(waited >= Duration::from_secs(120));
        assert!(waited < Duration::from_secs(121));
    }

    #[tokio::test]
    async fn backoff_policy_sees_failure_counts() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let log = seen.clone();
        let policy = move |n: u32| {
            log.lock().unwrap().push(n);
            Duration::ZERO
        };
        let (ledger, submitter, key) = setup(fast_config());
        let submitter = submitter.with_backoff(Arc::new(policy));
        ledger.fail_sends(3, transport());

        submitter.submit(&key, timeout_intent()).await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn same_signer_submissions_do_not_interleave() {
        let (ledger, submitter, key) = setup(fast_config());
        ledger.set_confirm_delay(Duration::from_secs(15));

        let (a, b) = tokio::join!(
            submitter.submit(&key, timeout_intent()),
            submitter.submit(&key, timeout_intent()),
        );
        let mut nonces = vec![a.unwrap().tx().nonce, b.unwrap().tx().nonce];
        nonces.sort();
        assert_eq!(nonces, vec![0, 1]);

        let kinds: Vec<&str> = ledger
            .events()
            .iter()
            .map(|e| match e {
                LedgerEvent::Prepare { .. } => "prepare",
                LedgerEvent::Send { .. } => "send",
                LedgerEvent::Mined { .. } => "mined",
                LedgerEvent::Call { .. } => "call",
            })
            .collect();
        assert_eq!(kinds, ["prepare", "send", "mined", "prepare", "send", "mined"]);
    }

    #[tokio::test(start_paused = true)]
    async fn submitters_sharing_a_sequencer_serialize_per_signer() {
        let ledger = Arc::new(ScriptedLedger::new());
        ledger.set_confirm_delay(Duration::from_secs(15));
        let sequencer = NonceSequencer::default();
        let first = Submitter::new(ledger.clone(), ledger.clone(), fast_config())
            .unwrap()
            .with_sequencer(sequencer.clone());
        let second = Submitter::new(ledger.clone(), ledger.clone(), fast_config())
            .unwrap()
            .with_sequencer(sequencer.clone());
        let key = ChannelKeypair::generate();

        let (a, b) = tokio::join!(
            first.submit(&key, timeout_intent()),
            second.submit(&key, timeout_intent()),
        );
        let mut nonces = vec![a.unwrap().tx().nonce, b.unwrap().tx().nonce];
        nonces.sort();
        assert_eq!(nonces, vec![0, 1]);
        assert!(!sequencer.is_busy(&key.address()));
    }

    #[tokio::test]
    async fn metrics_track_attempts_and_outcomes() {
        let metrics = SubmitterMetrics::new().unwrap();
        let (ledger, submitter, key) = setup(fast_config());
        let submitter = submitter.with_metrics(metrics.clone());
        ledger.fail_sends(2, transport());

        submitter.submit(&key, timeout_intent()).await.unwrap();

        assert_eq!(metrics.attempts_total.get(), 3);
        assert_eq!(metrics.send_failures_total.with_label_values(&["transport"]).get(), 2);
        assert_eq!(metrics.submissions_total.with_label_values(&["confirmed"]).get(), 1);
    }

    #[tokio::test]
    async fn creation_reports_contract_address() {
        let (ledger, submitter, key) = setup(fast_config());
        let intent = Intent::create(
            ContractCall::deploy(Address::repeat_byte(2), U256::from(3600u64)),
            U256::from(1_000u64),
        );

        let outcome = submitter.submit(&key, intent).await.unwrap();

        assert_eq!(
            outcome.contract_address(),
            Some(ScriptedLedger::creation_address(&key.address(), 0))
        );
        assert_eq!(ledger.prepared()[0].value, U256::from(1_000u64));
    }

    #[tokio::test]
    async fn held_slot_must_match_the_signer() {
        let (ledger, submitter, key) = setup(fast_config());
        let other = ChannelKeypair::generate();

        let slot = submitter.sequencer().acquire(other.address()).await;
        let err = submitter
            .submit_holding(&slot, &key, timeout_intent())
            .await
            .unwrap_err();
        assert_eq!(
            err,
            SubmitError::SlotMismatch {
                held: other.address(),
                signer: key.address(),
            }
        );
        assert!(ledger.prepared().is_empty());

        let own = submitter.sequencer().acquire(key.address()).await;
        let outcome = submitter
            .submit_holding(&own, &key, timeout_intent())
            .await
            .unwrap();
        assert!(outcome.is_confirmed());
        assert!(submitter.sequencer().is_busy(&key.address()));
    }

    #[test]
    fn constructor_rejects_invalid_config() {
        let ledger = Arc::new(ScriptedLedger::new());
        let zero_increment = SubmitterConfig {
            gas_price_increment_wei: 0,
            ..fast_config()
        };
        let res = Submitter::new(ledger.clone(), ledger.clone(), zero_increment);
        assert!(matches!(res, Err(ConfigError::ZeroIncrement)));
    }

    #[tokio::test]
    async fn independently_built_submitters_share_the_global_sequencer() {
        let ledger = Arc::new(ScriptedLedger::new());
        let first = Submitter::new(ledger.clone(), ledger.clone(), fast_config()).unwrap();
        let second = Submitter::new(ledger.clone(), ledger.clone(), fast_config()).unwrap();
        let key = ChannelKeypair::generate();

        let _slot = first.sequencer().acquire(key.address()).await;
        assert!(second.sequencer().is_busy(&key.address()));
    }

    #[test]
    fn config_defaults_and_validation() {
        let cfg = SubmitterConfig::default();
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.send_backoff(), config::RETRY_TX_BACKOFF);

        let bad = SubmitterConfig {
            gas_price_increment_wei: 0,
            ..cfg
        };
        assert!(matches!(bad.validate(), Err(ConfigError::ZeroIncrement)));
    }

    #[test]
    fn config_loads_partial_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("submitter.json");
        std::fs::write(&path, r#"{ "send_retry_limit": 2, "send_backoff_ms": 10 }"#).unwrap();

        let cfg = SubmitterConfig::from_json_file(&path).unwrap();
        assert_eq!(cfg.send_retry_limit, 2);
        assert_eq!(cfg.send_backoff(), Duration::from_millis(10));
        assert_eq!(cfg.gas_limit, config::DEFAULT_GAS_LIMIT);
    }
}
