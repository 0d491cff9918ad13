use anyhow::{Context, Result};
use solana_sdk::commitment_config::CommitmentConfig;

use super::SolanaRpc;
use crate::models::AccountId;

impl SolanaRpc {
    pub async fn get_balance(&self, account: &AccountId) -> Result<u64> {
        let response = self
            .rpc_client
            .get_balance_with_commitment(account.pubkey(), CommitmentConfig::confirmed())
            .await
            .with_context(|| format!("Failed to get balance of `{account}`"))?;

        Ok(response.value)
    }
}
