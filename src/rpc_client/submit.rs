use anyhow::{bail, Context, Result};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::Transaction;
use solana_transaction_status::TransactionStatus;

use super::SolanaRpc;
use crate::models::Checkpoint;

impl SolanaRpc {
    pub async fn get_latest_checkpoint(&self) -> Result<Checkpoint> {
        let (blockhash, last_valid_block_height) = self
            .rpc_client
            .get_latest_blockhash_with_commitment(CommitmentConfig::confirmed())
            .await
            .context("Failed to get latest blockhash")?;

        Ok(Checkpoint {
            blockhash,
            last_valid_block_height,
        })
    }

    pub async fn send_signed_transaction(&self, transaction: &Transaction) -> Result<Signature> {
        self.rpc_client
            .send_transaction(transaction)
            .await
            .context("Failed to send transaction")
    }

    /// Poll the signature status until it is `confirmed`, the transaction
    /// fails, or the block height passes the checkpoint's validity window.
    pub async fn wait_for_confirmation(
        &self,
        signature: &Signature,
        checkpoint: &Checkpoint,
    ) -> Result<()> {
        let commitment = CommitmentConfig::confirmed();

        loop {
            let statuses = self
                .rpc_client
                .get_signature_statuses(&[*signature])
                .await
                .with_context(|| format!("Failed to get status of `{signature}`"))?;

            let status = statuses.value.into_iter().next().flatten();
            if is_confirmed(signature, status.as_ref(), commitment)? {
                return Ok(());
            }

            let block_height = self
                .rpc_client
                .get_block_height_with_commitment(commitment)
                .await
                .context("Failed to get block height")?;
            check_not_expired(signature, block_height, checkpoint)?;

            tracing::debug!("waiting for confirmation of `{signature}`");
            tokio::time::sleep(self.confirm_poll_interval).await;
        }
    }
}

/// `Ok(false)` while the transaction is unknown or below `commitment`.
fn is_confirmed(
    signature: &Signature,
    status: Option<&TransactionStatus>,
    commitment: CommitmentConfig,
) -> Result<bool> {
    let Some(status) = status else {
        return Ok(false);
    };
    if let Some(err) = &status.err {
        bail!("Transaction `{signature}` failed: {err}");
    }

    Ok(status.satisfies_commitment(commitment))
}

fn check_not_expired(
    signature: &Signature,
    block_height: u64,
    checkpoint: &Checkpoint,
) -> Result<()> {
    if block_height > checkpoint.last_valid_block_height {
        bail!(
            "Blockhash expired before `{signature}` was confirmed (block height {block_height} > {})",
            checkpoint.last_valid_block_height
        );
    }

    Ok(())
}
