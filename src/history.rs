use crate::models::{
    AccountId, ParsedTransaction, ReadOutcome, SignatureRecord, SimplifiedTransaction,
};
use crate::rpc_client::LedgerClient;
use crate::simplify::simplify_transaction;

/// Largest page `getSignaturesForAddress` serves.
pub const MAX_PAGE_SIZE: usize = 1000;

/// Up to `limit` signatures involving `account`, newest first.
///
/// Pages backwards until `limit` is reached or the ledger returns an empty
/// page. A failing page ends pagination and keeps what was collected; only a
/// failure before anything was collected is `Unavailable`.
pub async fn fetch_signatures(
    ledger: &dyn LedgerClient,
    account: &AccountId,
    limit: usize,
) -> ReadOutcome<Vec<SignatureRecord>> {
    let page_size = limit.min(MAX_PAGE_SIZE);
    let mut signatures: Vec<SignatureRecord> = Vec::new();

    while signatures.len() < limit {
        let before = signatures.last().map(|s| s.signature.clone());
        let page = ledger
            .signatures_page(account, before.as_deref(), page_size)
            .await;

        match page {
            Ok(page) if page.is_empty() => break,
            Ok(page) => {
                tracing::debug!("fetched {} signatures of `{account}`", page.len());
                signatures.extend(page);
            }
            Err(e) if signatures.is_empty() => {
                tracing::warn!("signatures of `{account}` unavailable: {e:?}");
                return ReadOutcome::Unavailable;
            }
            Err(e) => {
                tracing::warn!(
                    "stopped paging signatures of `{account}` after {}: {e:?}",
                    signatures.len()
                );
                break;
            }
        }
    }

    signatures.truncate(limit);

    if signatures.is_empty() {
        ReadOutcome::Empty
    } else {
        ReadOutcome::Found(signatures)
    }
}

/// Resolve signatures with one batched lookup. The result lines up with
/// `signatures`, holding `None` where the ledger had nothing.
pub async fn fetch_transaction_details(
    ledger: &dyn LedgerClient,
    signatures: &[String],
) -> ReadOutcome<Vec<Option<ParsedTransaction>>> {
    if signatures.is_empty() {
        return ReadOutcome::Empty;
    }

    match ledger.parsed_transactions(signatures).await {
        Ok(transactions) => {
            tracing::debug!(
                "resolved {} of {} transactions",
                transactions.iter().flatten().count(),
                signatures.len()
            );
            ReadOutcome::Found(transactions)
        }
        Err(e) => {
            tracing::warn!("transaction details unavailable: {e:?}");
            ReadOutcome::Unavailable
        }
    }
}

pub async fn recent_transactions(
    ledger: &dyn LedgerClient,
    account: &AccountId,
    limit: usize,
) -> ReadOutcome<Vec<Option<ParsedTransaction>>> {
    let signatures = match fetch_signatures(ledger, account, limit).await {
        ReadOutcome::Found(signatures) => signatures,
        ReadOutcome::Empty => return ReadOutcome::Empty,
        ReadOutcome::Unavailable => return ReadOutcome::Unavailable,
    };

    let signatures: Vec<String> = signatures.into_iter().map(|s| s.signature).collect();
    fetch_transaction_details(ledger, &signatures).await
}

/// Display-ready history of native transfers touching `account`, newest first.
pub async fn simplified_history(
    ledger: &dyn LedgerClient,
    account: &AccountId,
    limit: usize,
) -> ReadOutcome<Vec<SimplifiedTransaction>> {
    recent_transactions(ledger, account, limit)
        .await
        .map(|transactions| {
            transactions
                .iter()
                .flatten()
                .filter_map(|transaction| simplify_transaction(transaction, account))
                .collect()
        })
}

#[cfg(test)]
mod tests {
    use solana_program::pubkey::Pubkey;

    use super::*;
    use crate::models::{ParsedInstruction, TransactionStatus};
    use crate::rpc_client::fake::FakeLedger;

    fn account() -> AccountId {
        AccountId::from(Pubkey::new_unique())
    }

    fn signature_names(outcome: ReadOutcome<Vec<SignatureRecord>>) -> Vec<String> {
        outcome
            .found()
            .unwrap()
            .into_iter()
            .map(|s| s.signature)
            .collect()
    }

    #[tokio::test]
    async fn stops_when_ledger_is_exhausted() {
        let ledger = FakeLedger::with_signatures(10);

        let signatures = signature_names(fetch_signatures(&ledger, &account(), 25).await);

        let expected: Vec<String> = (0..10).map(|i| format!("sig-{i}")).collect();
        assert_eq!(signatures, expected);
        assert_eq!(
            ledger.calls().pages,
            vec![(None, 25), (Some("sig-9".to_string()), 25)]
        );
    }

    #[tokio::test]
    async fn single_page_when_first_page_satisfies_limit() {
        let ledger = FakeLedger::with_signatures(2000);

        let signatures = signature_names(fetch_signatures(&ledger, &account(), 5).await);

        assert_eq!(signatures.len(), 5);
        assert_eq!(signatures[0], "sig-0");
        assert_eq!(ledger.calls().pages, vec![(None, 5)]);
    }

    #[tokio::test]
    async fn pages_are_capped_and_chained_by_cursor() {
        let ledger = FakeLedger::with_signatures(3000);

        let signatures = signature_names(fetch_signatures(&ledger, &account(), 2500).await);

        assert_eq!(signatures.len(), 2500);
        assert_eq!(signatures[1000], "sig-1000");
        assert_eq!(signatures[2499], "sig-2499");
        assert_eq!(
            ledger.calls().pages,
            vec![
                (None, 1000),
                (Some("sig-999".to_string()), 1000),
                (Some("sig-1999".to_string()), 1000),
            ]
        );
    }

    #[tokio::test]
    async fn failing_page_keeps_collected_signatures() {
        let ledger = FakeLedger {
            failing_page: Some(1),
            ..FakeLedger::with_signatures(3000)
        };

        let signatures = signature_names(fetch_signatures(&ledger, &account(), 1500).await);

        assert_eq!(signatures.len(), 1000);
        assert_eq!(ledger.calls().pages.len(), 2);
    }

    #[tokio::test]
    async fn failing_first_page_is_unavailable() {
        let ledger = FakeLedger {
            failing_page: Some(0),
            ..FakeLedger::with_signatures(10)
        };

        assert!(fetch_signatures(&ledger, &account(), 10).await.is_unavailable());
        assert_eq!(ledger.calls().pages.len(), 1);
    }

    #[tokio::test]
    async fn zero_limit_makes_no_request() {
        let ledger = FakeLedger::with_signatures(10);

        assert_eq!(fetch_signatures(&ledger, &account(), 0).await, ReadOutcome::Empty);
        assert_eq!(ledger.network_calls(), 0);
    }

    #[tokio::test]
    async fn empty_ledger_is_empty() {
        let ledger = FakeLedger::default();

        assert_eq!(fetch_signatures(&ledger, &account(), 10).await, ReadOutcome::Empty);
        assert_eq!(ledger.calls().pages.len(), 1);
    }

    #[tokio::test]
    async fn details_of_nothing_make_no_request() {
        let ledger = FakeLedger::default();

        assert_eq!(fetch_transaction_details(&ledger, &[]).await, ReadOutcome::Empty);
        assert_eq!(ledger.network_calls(), 0);
    }

    #[tokio::test]
    async fn details_preserve_order_and_gaps() {
        let mut ledger = FakeLedger::default();
        for name in ["a", "c"] {
            ledger.transactions.insert(
                name.to_string(),
                ParsedTransaction {
                    signature: name.to_string(),
                    slot: 1,
                    block_time: None,
                    error: None,
                    instructions: vec![],
                },
            );
        }

        let requested = vec!["a".to_string(), "b".to_string(), "c".to_string()];
        let details = fetch_transaction_details(&ledger, &requested)
            .await
            .found()
            .unwrap();

        let resolved: Vec<Option<&str>> = details
            .iter()
            .map(|tx| tx.as_ref().map(|tx| tx.signature.as_str()))
            .collect();
        assert_eq!(resolved, vec![Some("a"), None, Some("c")]);
        assert_eq!(ledger.calls().batches, vec![requested]);
    }

    #[tokio::test]
    async fn failed_batch_is_unavailable() {
        let ledger = FakeLedger {
            fail_batch: true,
            ..Default::default()
        };

        let outcome = fetch_transaction_details(&ledger, &["a".to_string()]).await;
        assert!(outcome.is_unavailable());
    }

    #[tokio::test]
    async fn simplified_history_keeps_only_transfers_touching_account() {
        let me = account();
        let other = account();
        let mut ledger = FakeLedger::with_signatures(4);

        let transfer = |source: &AccountId, destination: &AccountId, lamports| {
            vec![ParsedInstruction::NativeTransfer {
                source: source.to_string(),
                destination: destination.to_string(),
                lamports,
            }]
        };
        let entries = [
            ("sig-0", transfer(&me, &other, 1_000_000_000), None),
            ("sig-1", vec![ParsedInstruction::Other { program_id: None }], None),
            ("sig-3", transfer(&other, &me, 250_000_000), Some("failed".to_string())),
        ];
        for (signature, instructions, error) in entries {
            ledger.transactions.insert(
                signature.to_string(),
                ParsedTransaction {
                    signature: signature.to_string(),
                    slot: 1,
                    block_time: None,
                    error,
                    instructions,
                },
            );
        }

        let history = simplified_history(&ledger, &me, 10).await.found().unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history[0].amount, "-1.0000");
        assert_eq!(history[0].status, TransactionStatus::Confirmed);
        assert_eq!(history[1].amount, "+0.2500");
        assert_eq!(history[1].status, TransactionStatus::Failed);
        assert_eq!(ledger.calls().batches.len(), 1);
    }

    #[tokio::test]
    async fn simplified_history_of_fresh_account_is_empty() {
        let ledger = FakeLedger::default();

        assert_eq!(
            simplified_history(&ledger, &account(), 10).await,
            ReadOutcome::Empty
        );
        assert!(ledger.calls().batches.is_empty());
    }
}
