use solana_program::native_token::LAMPORTS_PER_SOL;
use solana_program::system_instruction;
use solana_sdk::transaction::Transaction;

use crate::address::{parse_account, InvalidAddress};
use crate::models::{AccountId, Checkpoint};
use crate::rpc_client::LedgerClient;
use crate::signer::TransactionSigner;

/// Send `amount` SOL from `sender` to `recipient` and wait for `confirmed`.
///
/// Nothing is retried. A [`PaymentError::ConfirmationFailed`] is ambiguous:
/// the transaction was broadcast and may still land.
pub async fn send_sol(
    ledger: &dyn LedgerClient,
    sender: &AccountId,
    recipient: &str,
    amount: f64,
    signer: &dyn TransactionSigner,
) -> Result<String, PaymentError> {
    let recipient = parse_account(recipient)?;
    let lamports = to_lamports(amount)?;

    let instruction = system_instruction::transfer(sender.pubkey(), recipient.pubkey(), lamports);
    let mut transaction = Transaction::new_with_payer(&[instruction], Some(sender.pubkey()));

    let checkpoint = ledger
        .latest_checkpoint()
        .await
        .map_err(PaymentError::CheckpointUnavailable)?;
    transaction.message.recent_blockhash = checkpoint.blockhash;

    let signed = signer
        .sign_transaction(transaction)
        .await
        .map_err(PaymentError::SigningFailed)?;
    if !signed.is_signed() {
        return Err(PaymentError::SigningFailed(anyhow::anyhow!(
            "Signer returned an unsigned transaction"
        )));
    }

    let signature = ledger
        .send_transaction(&signed)
        .await
        .map_err(PaymentError::SubmissionFailed)?;
    tracing::info!("sent {lamports} lamports from `{sender}` to `{recipient}`: {signature}");

    // Keep the signed blockhash, wait against a freshly fetched validity window.
    let confirmation = match ledger.latest_checkpoint().await {
        Ok(fresh) => {
            let window = Checkpoint {
                last_valid_block_height: fresh.last_valid_block_height,
                ..checkpoint
            };
            ledger.confirm_transaction(&signature, &window).await
        }
        Err(e) => Err(e),
    };
    confirmation.map_err(|source| PaymentError::ConfirmationFailed {
        signature: signature.to_string(),
        source,
    })?;

    tracing::info!("transaction {signature} confirmed");
    Ok(signature.to_string())
}

/// Rounds to the nearest lamport.
fn to_lamports(amount: f64) -> Result<u64, PaymentError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::InvalidAmount(amount));
    }

    let lamports = (amount * LAMPORTS_PER_SOL as f64).round();
    if lamports <= 0.0 || lamports >= u64::MAX as f64 {
        return Err(PaymentError::InvalidAmount(amount));
    }

    Ok(lamports as u64)
}

#[derive(thiserror::Error, Debug)]
pub enum PaymentError {
    #[error(transparent)]
    InvalidAddress(#[from] InvalidAddress),
    #[error("Amount must be greater than zero, got {0}")]
    InvalidAmount(f64),
    #[error("Failed to get a recent blockhash")]
    CheckpointUnavailable(#[source] anyhow::Error),
    #[error("Signing was declined or failed")]
    SigningFailed(#[source] anyhow::Error),
    #[error("Transaction was rejected by the network")]
    SubmissionFailed(#[source] anyhow::Error),
    #[error("Transaction `{signature}` was sent but its confirmation could not be verified")]
    ConfirmationFailed {
        signature: String,
        #[source]
        source: anyhow::Error,
    },
}
