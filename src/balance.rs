use solana_program::native_token::lamports_to_sol;

use crate::models::{AccountId, ReadOutcome};
use crate::rpc_client::LedgerClient;

/// Confirmed balance in SOL. Any query failure degrades to `Unavailable`.
pub async fn sol_balance(ledger: &dyn LedgerClient, account: &AccountId) -> ReadOutcome<f64> {
    match ledger.balance(account).await {
        Ok(lamports) => ReadOutcome::Found(lamports_to_sol(lamports)),
        Err(e) => {
            tracing::warn!("balance of `{account}` unavailable: {e:?}");
            ReadOutcome::Unavailable
        }
    }
}
