use std::path::Path;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use solana_sdk::signature::{read_keypair_file, Keypair, Signer};
use solana_sdk::transaction::Transaction;

use crate::models::AccountId;

/// Wallet-side signing. Implementations own the key material; callers only
/// ever hand over an unsigned transaction and get a signed one back.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign_transaction(&self, transaction: Transaction) -> Result<Transaction>;
}

/// Signs with a keypair loaded from a Solana CLI keypair file.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let keypair = read_keypair_file(path)
            .map_err(|e| anyhow!("Failed to read keypair `{}`: {e}", path.display()))?;
        Ok(Self::new(keypair))
    }

    pub fn account(&self) -> AccountId {
        AccountId::from(self.keypair.pubkey())
    }
}

#[async_trait]
impl TransactionSigner for KeypairSigner {
    async fn sign_transaction(&self, mut transaction: Transaction) -> Result<Transaction> {
        let pubkey = self.keypair.pubkey();
        if transaction.message.account_keys.first() != Some(&pubkey) {
            bail!("Fee payer is not `{pubkey}`, refusing to sign");
        }

        let blockhash = transaction.message.recent_blockhash;
        transaction
            .try_sign(&[&self.keypair], blockhash)
            .context("Failed to sign transaction")?;

        Ok(transaction)
    }
}
