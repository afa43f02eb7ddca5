//! Values exchanged with the ledger client.

use alloy_primitives::{Address, B256, U256};
use serde::{Deserialize, Serialize};

use super::contract::ContractCall;

/// A typed ABI value, in or out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Token {
    Address(Address),
    Uint(U256),
    FixedBytes(B256),
    Bytes(Vec<u8>),
    Bool(bool),
}

impl Token {
    pub fn as_uint(&self) -> Option<U256> {
        match self {
            Token::Uint(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_address(&self) -> Option<Address> {
        match self {
            Token::Address(a) => Some(*a),
            _ => None,
        }
    }

    /// ABI type name, used in decode error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Token::Address(_) => "address",
            Token::Uint(_) => "uint256",
            Token::FixedBytes(_) => "bytes32",
            Token::Bytes(_) => "bytes",
            Token::Bool(_) => "bool",
        }
    }
}

/// Where a transaction goes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TxTarget {
    /// Contract creation; the call must be the constructor.
    Create,
    /// Call on an existing contract.
    Call(Address),
}

/// Everything the ledger client needs to build and sign one transaction.
///
/// `nonce: None` lets the client pick the account's next pending nonce.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TxRequest {
    pub from: Address,
    pub target: TxTarget,
    pub call: ContractCall,
    /// Value attached to the call, in wei.
    pub value: U256,
    pub nonce: Option<u64>,
    pub gas_price: U256,
    pub gas_limit: u64,
}

/// A transaction signed and ready to broadcast.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedTx {
    pub hash: B256,
    pub from: Address,
    pub nonce: u64,
    pub gas_price: U256,
    /// For creations, the address the contract will live at. Depends only
    /// on sender and nonce, so every replacement of a creation shares it.
    pub contract_address: Option<Address>,
    /// RLP-encoded signed transaction.
    pub raw: Vec<u8>,
}

/// What the ledger reports once a transaction is mined successfully.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: B256,
    pub block_number: u64,
    pub gas_used: u64,
    pub contract_address: Option<Address>,
}
