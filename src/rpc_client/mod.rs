use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;

use crate::models::{AccountId, Checkpoint, ParsedTransaction, SignatureRecord};
use crate::settings::Config;

mod balance;
mod signatures;
mod submit;
mod transactions;

#[cfg(test)]
pub(crate) mod fake;

/// Everything the payment client needs from the ledger.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    async fn balance(&self, account: &AccountId) -> Result<u64>;

    /// One page of signatures, newest first, older than `before` when set.
    async fn signatures_page(
        &self,
        account: &AccountId,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>>;

    /// One slot per requested signature, `None` where the ledger has nothing.
    async fn parsed_transactions(
        &self,
        signatures: &[String],
    ) -> Result<Vec<Option<ParsedTransaction>>>;

    async fn latest_checkpoint(&self) -> Result<Checkpoint>;

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature>;

    /// Returns once the signature reaches `confirmed`; fails when the
    /// transaction errored or the checkpoint expired first.
    async fn confirm_transaction(&self, signature: &Signature, checkpoint: &Checkpoint)
        -> Result<()>;
}

#[derive(Clone)]
pub struct SolanaRpc {
    rpc_client: Arc<RpcClient>,
    http_client: reqwest::Client,
    rpc_endpoint: String,
    confirm_poll_interval: Duration,
}

impl SolanaRpc {
    pub fn new(config: &Config) -> Result<Self> {
        let timeout = Duration::from_secs(config.request_timeout_sec);

        let rpc_client = Arc::new(RpcClient::new_with_timeout_and_commitment(
            config.rpc_endpoint.clone(),
            timeout,
            CommitmentConfig::confirmed(),
        ));

        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()?;

        Ok(Self {
            rpc_client,
            http_client,
            rpc_endpoint: config.rpc_endpoint.clone(),
            confirm_poll_interval: Duration::from_millis(config.confirm_poll_interval_ms),
        })
    }
}

#[async_trait]
impl LedgerClient for SolanaRpc {
    async fn balance(&self, account: &AccountId) -> Result<u64> {
        self.get_balance(account).await
    }

    async fn signatures_page(
        &self,
        account: &AccountId,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>> {
        self.get_signatures_page(account, before, limit).await
    }

    async fn parsed_transactions(
        &self,
        signatures: &[String],
    ) -> Result<Vec<Option<ParsedTransaction>>> {
        self.get_parsed_transactions(signatures).await
    }

    async fn latest_checkpoint(&self) -> Result<Checkpoint> {
        self.get_latest_checkpoint().await
    }

    async fn send_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.send_signed_transaction(transaction).await
    }

    async fn confirm_transaction(
        &self,
        signature: &Signature,
        checkpoint: &Checkpoint,
    ) -> Result<()> {
        self.wait_for_confirmation(signature, checkpoint).await
    }
}
