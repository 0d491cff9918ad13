use std::str::FromStr;

use anyhow::{Context, Result};
use solana_client::rpc_client::GetConfirmedSignaturesForAddress2Config;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;

use super::SolanaRpc;
use crate::models::{AccountId, SignatureRecord};

impl SolanaRpc {
    pub async fn get_signatures_page(
        &self,
        account: &AccountId,
        before: Option<&str>,
        limit: usize,
    ) -> Result<Vec<SignatureRecord>> {
        let before = before
            .map(Signature::from_str)
            .transpose()
            .context("Invalid pagination cursor")?;

        let config = GetConfirmedSignaturesForAddress2Config {
            before,
            until: None,
            limit: Some(limit),
            commitment: Some(CommitmentConfig::confirmed()),
        };

        let sigs = self
            .rpc_client
            .get_signatures_for_address_with_config(account.pubkey(), config)
            .await
            .with_context(|| format!("Failed to get signatures of `{account}`"))?;

        Ok(sigs
            .into_iter()
            .map(|status| SignatureRecord {
                signature: status.signature,
                slot: status.slot,
                block_time: status.block_time,
                failed: status.err.is_some(),
            })
            .collect())
    }
}
