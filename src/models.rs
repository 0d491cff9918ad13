use std::fmt;

use serde::{Deserialize, Serialize};
use solana_program::hash::Hash;
use solana_program::pubkey::Pubkey;

/// A validated account address. Build it with [`crate::address::parse_account`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AccountId {
    pubkey: Pubkey,
}

impl AccountId {
    pub(crate) fn new(pubkey: Pubkey) -> Self {
        Self { pubkey }
    }

    pub fn pubkey(&self) -> &Pubkey {
        &self.pubkey
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.pubkey.to_bytes()
    }
}

impl From<Pubkey> for AccountId {
    fn from(pubkey: Pubkey) -> Self {
        Self::new(pubkey)
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.pubkey.fmt(f)
    }
}

/// Result of a read path. `Unavailable` means the ledger could not be asked,
/// which is not the same thing as an empty answer.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutcome<T> {
    Found(T),
    Empty,
    Unavailable,
}

impl<T> ReadOutcome<T> {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, ReadOutcome::Unavailable)
    }

    pub fn found(self) -> Option<T> {
        match self {
            ReadOutcome::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ReadOutcome<U> {
        match self {
            ReadOutcome::Found(value) => ReadOutcome::Found(f(value)),
            ReadOutcome::Empty => ReadOutcome::Empty,
            ReadOutcome::Unavailable => ReadOutcome::Unavailable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignatureRecord {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    pub failed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParsedTransaction {
    pub signature: String,
    pub slot: u64,
    pub block_time: Option<i64>,
    /// Error reported in the transaction metadata, if any.
    pub error: Option<String>,
    pub instructions: Vec<ParsedInstruction>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ParsedInstruction {
    /// System program `transfer`.
    NativeTransfer {
        source: String,
        destination: String,
        lamports: u64,
    },
    Other {
        program_id: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionStatus {
    Confirmed,
    Failed,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::Confirmed => f.write_str("Confirmed"),
            TransactionStatus::Failed => f.write_str("Failed"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplifiedTransaction {
    pub id: String,
    pub timestamp: String,
    pub amount: String,
    pub status: TransactionStatus,
}

/// Recent blockhash together with the last block height at which a
/// transaction referencing it is still accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checkpoint {
    pub blockhash: Hash,
    pub last_valid_block_height: u64,
}
