//! In-memory ledger driven by a script of canned responses.
//!
//! Implements both [`LedgerClient`] and [`ConfirmationChecker`] so a single
//! value can stand in for a node in tests and dry runs. Each queue is
//! consumed front to back; once a queue is empty every call succeeds.
//!
//! Behaviour that matters to callers:
//!
//! - `prepare` honours a pinned nonce, otherwise hands out the account's
//!   pending nonce. Creations get a deterministic contract address derived
//!   from sender and nonce.
//! - A successful confirmation advances the account's pending nonce past
//!   the mined transaction and records the receipt.
//! - Every call is appended to an event log, in order.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use alloy_primitives::{Address, B256, U256};
use async_trait::async_trait;
use parking_lot::Mutex;

use super::client::{ConfirmationChecker, LedgerClient};
use super::contract::{ChannelMethod, ContractCall};
use super::error::{ConfirmationFailure, LedgerError};
use super::types::{Receipt, SignedTx, Token, TxRequest, TxTarget};
use crate::crypto::{keccak, ChannelKeypair};

/// One recorded interaction with the scripted ledger.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LedgerEvent {
    Call { to: Address, method: ChannelMethod },
    Prepare { from: Address, nonce: u64, gas_price: U256 },
    Send { hash: B256 },
    Mined { hash: B256, block: u64 },
}

#[derive(Default)]
struct State {
    pending_nonce: HashMap<Address, u64>,
    prepare_script: VecDeque<Result<(), LedgerError>>,
    send_script: VecDeque<Result<(), LedgerError>>,
    confirm_script: VecDeque<Result<(), ConfirmationFailure>>,
    call_script: VecDeque<Result<Vec<Token>, LedgerError>>,
    call_responses: HashMap<(Address, ChannelMethod), Vec<Token>>,
    confirm_delay: Duration,
    block: u64,
    prepared: Vec<TxRequest>,
    sent: Vec<SignedTx>,
    receipts: Vec<Receipt>,
    events: Vec<LedgerEvent>,
}

/// A scripted ledger. See the module docs.
#[derive(Default)]
pub struct ScriptedLedger {
    state: Mutex<State>,
}

impl ScriptedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    // -- scripting ---------------------------------------------------------

    /// Queue an error for the next `prepare` call.
    pub fn fail_prepare(&self, err: LedgerError) {
        self.state.lock().prepare_script.push_back(Err(err));
    }

    /// Queue `times` consecutive send failures.
    pub fn fail_sends(&self, times: usize, err: LedgerError) {
        let mut st = self.state.lock();
        for _ in 0..times {
            st.send_script.push_back(Err(err.clone()));
        }
    }

    /// Queue an explicit send success, to interleave with failures.
    pub fn accept_send(&self) {
        self.state.lock().send_script.push_back(Ok(()));
    }

    /// Queue `times` consecutive confirmation failures.
    pub fn fail_confirms(&self, times: usize, failure: ConfirmationFailure) {
        let mut st = self.state.lock();
        for _ in 0..times {
            st.confirm_script.push_back(Err(failure.clone()));
        }
    }

    /// Queue `times` consecutive failing read calls.
    pub fn fail_calls(&self, times: usize, err: LedgerError) {
        let mut st = self.state.lock();
        for _ in 0..times {
            st.call_script.push_back(Err(err.clone()));
        }
    }

    /// Queue a one-off read result, ahead of the standing responses.
    pub fn push_call_result(&self, result: Result<Vec<Token>, LedgerError>) {
        self.state.lock().call_script.push_back(result);
    }

    /// Standing return values for `method` on the contract at `to`.
    pub fn set_call_response(&self, to: Address, method: ChannelMethod, tokens: Vec<Token>) {
        self.state.lock().call_responses.insert((to, method), tokens);
    }

    /// Make every confirmation take `delay` before resolving.
    pub fn set_confirm_delay(&self, delay: Duration) {
        self.state.lock().confirm_delay = delay;
    }

    /// Pretend `account` already used every nonce below `nonce`.
    pub fn set_pending_nonce(&self, account: Address, nonce: u64) {
        self.state.lock().pending_nonce.insert(account, nonce);
    }

    // -- inspection --------------------------------------------------------

    pub fn prepared(&self) -> Vec<TxRequest> {
        self.state.lock().prepared.clone()
    }

    /// Transactions that were accepted by `send`.
    pub fn sent(&self) -> Vec<SignedTx> {
        self.state.lock().sent.clone()
    }

    pub fn receipts(&self) -> Vec<Receipt> {
        self.state.lock().receipts.clone()
    }

    pub fn events(&self) -> Vec<LedgerEvent> {
        self.state.lock().events.clone()
    }

    pub fn send_attempts(&self) -> usize {
        self.state
            .lock()
            .events
            .iter()
            .filter(|e| matches!(e, LedgerEvent::Send { .. }))
            .count()
    }

    pub fn pending_nonce(&self, account: &Address) -> u64 {
        self.state.lock().pending_nonce.get(account).copied().unwrap_or(0)
    }

    /// Address a creation from `sender` at `nonce` ends up at:
    /// `keccak256(rlp([sender, nonce]))[12..]`.
    pub fn creation_address(sender: &Address, nonce: u64) -> Address {
        sender.create(nonce)
    }
}

#[async_trait]
impl LedgerClient for ScriptedLedger {
    async fn call(
        &self,
        _from: Address,
        to: Address,
        call: &ContractCall,
    ) -> Result<Vec<Token>, LedgerError> {
        let mut st = self.state.lock();
        st.events.push(LedgerEvent::Call { to, method: call.method });
        if let Some(scripted) = st.call_script.pop_front() {
            return scripted;
        }
        st.call_responses
            .get(&(to, call.method))
            .cloned()
            .ok_or_else(|| LedgerError::Rejected(format!("no code at {to} for {}", call.method)))
    }

    async fn prepare(
        &self,
        request: &TxRequest,
        signer: &ChannelKeypair,
    ) -> Result<SignedTx, LedgerError> {
        let mut st = self.state.lock();
        if let Some(Err(err)) = st.prepare_script.pop_front() {
            return Err(err);
        }
        let from = signer.address();
        if from != request.from {
            return Err(LedgerError::InvalidKey(format!(
                "signer {from} does not match sender {}",
                request.from
            )));
        }

        let nonce = request
            .nonce
            .unwrap_or_else(|| st.pending_nonce.get(&from).copied().unwrap_or(0));

        let mut raw = Vec::new();
        raw.extend_from_slice(from.as_slice());
        raw.extend_from_slice(&nonce.to_be_bytes());
        raw.extend_from_slice(&request.gas_price.to_be_bytes::<32>());
        raw.extend_from_slice(&request.value.to_be_bytes::<32>());
        raw.extend_from_slice(request.call.method.name().as_bytes());
        let signature = signer.sign_hash(&keccak(&raw));
        raw.extend_from_slice(&signature);

        let contract_address = match request.target {
            TxTarget::Create => Some(Self::creation_address(&from, nonce)),
            TxTarget::Call(_) => None,
        };

        st.prepared.push(request.clone());
        st.events.push(LedgerEvent::Prepare {
            from,
            nonce,
            gas_price: request.gas_price,
        });

        Ok(SignedTx {
            hash: keccak(&raw),
            from,
            nonce,
            gas_price: request.gas_price,
            contract_address,
            raw,
        })
    }

    async fn send(&self, tx: &SignedTx) -> Result<B256, LedgerError> {
        let mut st = self.state.lock();
        st.events.push(LedgerEvent::Send { hash: tx.hash });
        if let Some(Err(err)) = st.send_script.pop_front() {
            return Err(err);
        }
        st.sent.push(tx.clone());
        Ok(tx.hash)
    }
}

#[async_trait]
impl ConfirmationChecker for ScriptedLedger {
    async fn wait_mined(&self, tx: &SignedTx) -> Result<Receipt, ConfirmationFailure> {
        let delay = self.state.lock().confirm_delay;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let mut st = self.state.lock();
        if let Some(Err(failure)) = st.confirm_script.pop_front() {
            return Err(failure);
        }

        st.block += 1;
        let block = st.block;
        let next = st.pending_nonce.entry(tx.from).or_insert(0);
        *next = (*next).max(tx.nonce + 1);
        st.events.push(LedgerEvent::Mined { hash: tx.hash, block });

        let receipt = Receipt {
            tx_hash: tx.hash,
            block_number: block,
            gas_used: 21_000,
            contract_address: tx.contract_address,
        };
        st.receipts.push(receipt.clone());
        Ok(receipt)
    }
}
