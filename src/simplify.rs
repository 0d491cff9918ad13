use chrono::{Local, TimeZone};
use solana_program::native_token::lamports_to_sol;

use crate::models::{
    AccountId, ParsedInstruction, ParsedTransaction, SimplifiedTransaction, TransactionStatus,
};

const MISSING_TIMESTAMP: &str = "N/A";
const TIMESTAMP_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Reduce a transaction to the single native transfer leg that touches
/// `account`. Returns `None` when no such leg exists.
pub fn simplify_transaction(
    transaction: &ParsedTransaction,
    account: &AccountId,
) -> Option<SimplifiedTransaction> {
    simplify_transaction_in(transaction, account, &Local)
}

pub fn simplify_transaction_in<Tz>(
    transaction: &ParsedTransaction,
    account: &AccountId,
    tz: &Tz,
) -> Option<SimplifiedTransaction>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let amount = transfer_amount(&transaction.instructions, &account.to_string())?;

    let status = if transaction.error.is_some() {
        TransactionStatus::Failed
    } else {
        TransactionStatus::Confirmed
    };

    Some(SimplifiedTransaction {
        id: short_id(&transaction.signature),
        timestamp: format_timestamp(transaction.block_time, tz),
        amount: format_amount(amount),
        status,
    })
}

/// Signed SOL amount of the first positive native transfer from or to `account`.
fn transfer_amount(instructions: &[ParsedInstruction], account: &str) -> Option<f64> {
    instructions.iter().find_map(|instruction| match instruction {
        ParsedInstruction::NativeTransfer {
            source,
            destination,
            lamports,
        } if *lamports > 0 => {
            if source == account {
                Some(-lamports_to_sol(*lamports))
            } else if destination == account {
                Some(lamports_to_sol(*lamports))
            } else {
                None
            }
        }
        _ => None,
    })
}

/// First and last four characters joined by an ellipsis.
pub fn short_id(signature: &str) -> String {
    let chars: Vec<char> = signature.chars().collect();
    let head: String = chars.iter().take(4).collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{head}...{tail}")
}

/// Explicit sign, four fractional digits.
pub fn format_amount(sol: f64) -> String {
    // -0.0 would otherwise print as "+-0.0000"
    let sol = if sol == 0.0 { 0.0 } else { sol };
    if sol >= 0.0 {
        format!("+{sol:.4}")
    } else {
        format!("{sol:.4}")
    }
}

pub fn format_timestamp<Tz>(block_time: Option<i64>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    block_time
        .and_then(|secs| tz.timestamp_opt(secs, 0).single())
        .map(|time| time.format(TIMESTAMP_FORMAT).to_string())
        .unwrap_or_else(|| MISSING_TIMESTAMP.to_string())
}
