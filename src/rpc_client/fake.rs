use std::collections::HashMap;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use parking_lot::Mutex;
use solana_sdk::hash::Hash;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use super::LedgerClient;
use crate::models::{AccountId, Checkpoint, ParsedTransaction, SignatureRecord};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct Calls {
    pub balance: usize,
    /// `(before, limit)` of every page request.
    pub pages: Vec<(Option<String>, usize)>,
    pub batches: Vec<Vec<String>>,
    pub checkpoints: usize,
    pub sent: Vec<Transaction>,
    pub confirmations: Vec<(Signature, Checkpoint)>,
}

/// In-memory ledger. Signatures are stored newest first.
#[derive(Default)]
pub struct FakeLedger {
    pub lamports: Option<u64>,
    pub signatures: Vec<SignatureRecord>,
    pub transactions: HashMap<String, ParsedTransaction>,
    /// Page request (0-based) that fails.
    pub failing_page: Option<usize>,
    pub fail_batch: bool,
    pub fail_checkpoint: bool,
    pub fail_send: bool,
    pub fail_confirm: bool,
    pub calls: Mutex<Calls>,
}

impl FakeLedger {
    pub fn with_signatures(count: usize) -> Self {
        Self {
            signatures: (0..count)
                .map(|i| SignatureRecord {
                    signature: format!("sig-{i}"),
                    slot: (count - i) as u64,
                    block_time: None,
                    failed: false,
                })
                .collect(),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Calls {
        self.calls.lock().clone()
    }

    pub fn network_calls(&self) -> usize {
        let calls = self.calls.lock();
        calls.balance
            + calls.pages.len()
            + calls.batches.len()
            + calls.checkpoints
            + calls.sent.len()
            + calls.confirmations.len()
    }

    fn checkpoint(n: usize) -> Checkpoint {
        Checkpoint {
            blockhash: Hash::new_from_array([n as u8 + 1; 32]),
            last_valid_block_height: 1_000 + n as u64,
        }
    }
}

#[async_trait]
impl LedgerClient for FakeLedger {
    async fn balance(&self, _account: &AccountId) -> Result<u64> {
        self.calls.lock().balance += 1;
        self.lamports.ok_or_else(|| anyhow!("account not found"))
    }

    async fn signatures_page(
        &self,
        _account: &AccountId,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>> {
        let page = {
            let mut calls = self.calls.lock();
            calls.pages.push((before.map(str::to_string), limit));
            calls.pages.len() - 1
        };

        if self.failing_page == Some(page) {
            return Err(anyhow!("page {page} failed"));
        }

        let start = match before {
            Some(before) => self
                .signatures
                .iter()
                .position(|s| s.signature == before)
                .map(|i| i + 1)
                .ok_or_else(|| anyhow!("unknown cursor"))?,
            None => 0,
        };

        Ok(self.signatures.iter().skip(start).take(limit).cloned().collect())
    }

    async fn parsed_transactions(
        &self,
        signatures: &[String],
    ) -> Result<Vec<Option<ParsedTransaction>>> {
        self.calls.lock().batches.push(signatures.to_vec());
        if self.fail_batch {
            return Err(anyhow!("batch failed"));
        }

        Ok(signatures
            .iter()
            .map(|s| self.transactions.get(s).cloned())
            .collect())
    }

    async fn latest_checkpoint(&self) -> Result<Checkpoint> {
        let n = {
            let mut calls = self.calls.lock();
            calls.checkpoints += 1;
            calls.checkpoints
        };
        if self.fail_checkpoint {
            return Err(anyhow!("blockhash unavailable"));
        }
        Ok(Self::checkpoint(n))
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.calls.lock().sent.push(transaction.clone());
        if self.fail_send {
            return Err(anyhow!("blockhash not found"));
        }
        transaction
            .signatures
            .first()
            .copied()
            .ok_or_else(|| anyhow!("unsigned transaction"))
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        checkpoint: &Checkpoint,
    ) -> Result<()> {
        self.calls.lock().confirmations.push((*signature, *checkpoint));
        if self.fail_confirm {
            return Err(anyhow!("blockhash expired"));
        }
        Ok(())
    }
}
