//! Channel lifecycle operations.
//!
//! [`ChannelClient`] binds one signing identity to a ledger, a submitter
//! and a registry. State-changing operations go through the submitter;
//! reads retry on their own with a fixed pause and never escalate.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use alloy_primitives::{Address, U256};
use tracing::{debug, info, warn};

use super::error::ChannelError;
use super::info::ChannelInfo;
use crate::config;
use crate::crypto::ChannelKeypair;
use crate::ledger::{ConfirmationChecker, ContractCall, LedgerClient, Token};
use crate::registry::{ChannelKey, Registry, RegistryError};
use crate::submitter::{
    BackoffPolicy, FixedBackoff, Intent, SubmitOutcome, Submitter, SubmitterConfig,
};
use crate::voucher::{verify_voucher_from, PaymentVoucher};

/// Retry settings for read-only calls.
#[derive(Clone)]
pub struct ReadRetry {
    /// Failed calls tolerated; the next failure is returned.
    pub retries: u32,
    pub backoff: Arc<dyn BackoffPolicy>,
}

impl Default for ReadRetry {
    fn default() -> Self {
        Self {
            retries: config::READ_RETRY_LIMIT,
            backoff: Arc::new(FixedBackoff(config::RETRY_READ_BACKOFF)),
        }
    }
}

impl ReadRetry {
    pub fn new(retries: u32, pause: Duration) -> Self {
        Self {
            retries,
            backoff: Arc::new(FixedBackoff(pause)),
        }
    }
}

/// A party's handle on its payment channels.
pub struct ChannelClient {
    identity: ChannelKeypair,
    ledger: Arc<dyn LedgerClient>,
    submitter: Submitter,
    registry: Arc<dyn Registry>,
    read_retry: ReadRetry,
}

impl ChannelClient {
    pub fn new(
        identity: ChannelKeypair,
        ledger: Arc<dyn LedgerClient>,
        checker: Arc<dyn ConfirmationChecker>,
        registry: Arc<dyn Registry>,
        config: SubmitterConfig,
    ) -> Result<Self, ChannelError> {
        let submitter = Submitter::new(Arc::clone(&ledger), checker, config)?;
        Ok(Self::with_submitter(identity, ledger, submitter, registry))
    }

    /// Use a preconfigured submitter, e.g. one sharing its sequencer and
    /// metrics with other clients.
    pub fn with_submitter(
        identity: ChannelKeypair,
        ledger: Arc<dyn LedgerClient>,
        submitter: Submitter,
        registry: Arc<dyn Registry>,
    ) -> Self {
        Self {
            identity,
            ledger,
            submitter,
            registry,
            read_retry: ReadRetry::default(),
        }
    }

    pub fn with_read_retry(mut self, read_retry: ReadRetry) -> Self {
        self.read_retry = read_retry;
        self
    }

    /// Address of the signing identity.
    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn submitter(&self) -> &Submitter {
        &self.submitter
    }

    // -- Deploy ------------------------------------------------------------

    /// Open a channel to `payee`, funded with `initial_value` wei and
    /// expiring `timeout_secs` after deployment.
    ///
    /// Unless `force_redeploy` is set, an already registered channel for
    /// this (payer, payee) pair is returned as is and nothing is sent.
    ///
    /// The identity's sequencer slot is held from the registry lookup until
    /// the new channel is registered, so concurrent deploys for one pair
    /// create a single contract.
    pub async fn deploy(
        &self,
        payee: Address,
        timeout_secs: u64,
        initial_value: U256,
        force_redeploy: bool,
    ) -> Result<Address, ChannelError> {
        let key = ChannelKey::new(self.address(), payee);
        let slot = self.submitter.sequencer().acquire(self.address()).await;

        if !force_redeploy {
            match self.registry.resolve_latest(&key).await {
                Ok(existing) => {
                    info!(channel = %existing, %key, "channel already deployed");
                    return Ok(existing);
                }
                Err(RegistryError::NotFound(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }

        info!(
            %payee,
            timeout_secs,
            value = %initial_value,
            force_redeploy,
            "deploying channel contract"
        );
        let intent = Intent::create(
            ContractCall::deploy(payee, U256::from(timeout_secs)),
            initial_value,
        );
        let outcome = self
            .submitter
            .submit_holding(&slot, &self.identity, intent)
            .await?;
        let address = outcome
            .contract_address()
            .ok_or(ChannelError::MissingContractAddress(outcome.tx_hash()))?;

        if let Err(source) = self.registry.register(address, &key).await {
            warn!(
                channel = %address,
                %key,
                error = %source,
                "deployed channel could not be registered"
            );
            return Err(ChannelError::RegistryInconsistency { address, source });
        }

        info!(channel = %address, tx = %outcome.tx_hash(), "channel deployed");
        Ok(address)
    }

    // -- Reads -------------------------------------------------------------

    /// Read the channel's `(start_time, timeout, payer, payee)`.
    pub async fn get_info(&self, channel: Address) -> Result<ChannelInfo, ChannelError> {
        let tokens = self.read(channel, ContractCall::get_info()).await?;
        ChannelInfo::from_tokens(&tokens)
    }

    /// Current owner of the channel contract.
    pub async fn get_owner(&self, channel: Address) -> Result<Address, ChannelError> {
        let tokens = self.read(channel, ContractCall::get_owner()).await?;
        match tokens.as_slice() {
            [Token::Address(owner)] => Ok(*owner),
            other => Err(ChannelError::Decode(format!(
                "getOwner returned {} values, expected one address",
                other.len()
            ))),
        }
    }

    /// Every channel registered for (payer, payee), oldest first.
    pub async fn list_channels(
        &self,
        payer: Address,
        payee: Address,
    ) -> Result<Vec<Address>, ChannelError> {
        Ok(self.registry.list_all(&ChannelKey::new(payer, payee)).await?)
    }

    /// The active channel for (payer, payee) and its on-chain state.
    pub async fn latest_channel(
        &self,
        payer: Address,
        payee: Address,
    ) -> Result<(Address, ChannelInfo), ChannelError> {
        let address = self
            .registry
            .resolve_latest(&ChannelKey::new(payer, payee))
            .await?;
        let info = self.get_info(address).await?;
        Ok((address, info))
    }

    async fn read(&self, to: Address, call: ContractCall) -> Result<Vec<Token>, ChannelError> {
        let mut attempt: u32 = 1;
        loop {
            match self.ledger.call(self.address(), to, &call).await {
                Ok(tokens) => return Ok(tokens),
                Err(source) if attempt > self.read_retry.retries => {
                    warn!(
                        contract = %to,
                        method = %call.method,
                        attempts = attempt,
                        error = %source,
                        "read retries exhausted"
                    );
                    return Err(ChannelError::Read {
                        attempts: attempt,
                        source,
                    });
                }
                Err(e) => {
                    let delay = self.read_retry.backoff.delay(attempt);
                    warn!(
                        contract = %to,
                        method = %call.method,
                        attempt,
                        error = %e,
                        "read failed, retrying"
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    attempt += 1;
                }
            }
        }
    }

    // -- Mutations ---------------------------------------------------------

    /// Reclaim the deposit of an expired channel. Payer only.
    pub async fn timeout(&self, channel: Address) -> Result<SubmitOutcome, ChannelError> {
        info!(%channel, "timing out channel");
        self.mutate(channel, ContractCall::channel_timeout()).await
    }

    /// Redeem `voucher` on `channel`. The hash is recomputed from the
    /// channel address and the voucher's value.
    pub async fn close(
        &self,
        channel: Address,
        voucher: &PaymentVoucher,
    ) -> Result<SubmitOutcome, ChannelError> {
        let hash = voucher.hash_for(&channel);
        info!(%channel, value = %voucher.value, "closing channel");
        let call = ContractCall::close_channel(hash, voucher.value, voucher.signature.clone());
        self.mutate(channel, call).await
    }

    /// [`close`](Self::close), after checking that the voucher was signed
    /// by the channel's payer. Nothing is sent for a bad voucher.
    pub async fn close_checked(
        &self,
        channel: Address,
        voucher: &PaymentVoucher,
    ) -> Result<SubmitOutcome, ChannelError> {
        let info = self.get_info(channel).await?;
        let pinned = HashMap::from([(voucher.channel_id.clone(), channel)]);
        if !verify_voucher_from(&pinned, voucher, &info.payer)? {
            warn!(%channel, payer = %info.payer, "refusing to redeem voucher");
            return Err(ChannelError::InvalidVoucher(channel));
        }
        self.close(channel, voucher).await
    }

    /// Push the channel's expiry back by `additional_secs`.
    pub async fn extend_time(
        &self,
        channel: Address,
        additional_secs: u64,
    ) -> Result<SubmitOutcome, ChannelError> {
        info!(%channel, additional_secs, "extending channel");
        self.mutate(channel, ContractCall::extend(U256::from(additional_secs)))
            .await
    }

    /// Hand the contract to `new_owner`.
    pub async fn alter_owner(
        &self,
        channel: Address,
        new_owner: Address,
    ) -> Result<SubmitOutcome, ChannelError> {
        info!(%channel, %new_owner, "transferring channel ownership");
        self.mutate(channel, ContractCall::alter_owner(new_owner)).await
    }

    async fn mutate(
        &self,
        channel: Address,
        call: ContractCall,
    ) -> Result<SubmitOutcome, ChannelError> {
        let outcome = self
            .submitter
            .submit(&self.identity, Intent::call(channel, call))
            .await?;
        debug!(%channel, tx = %outcome.tx_hash(), attempts = outcome.attempts(), "mutation done");
        Ok(outcome)
    }
}
