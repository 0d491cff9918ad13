use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use solana_client::rpc_config::RpcTransactionConfig;
use solana_sdk::commitment_config::CommitmentConfig;
use solana_transaction_status::{
    EncodedConfirmedTransactionWithStatusMeta, EncodedTransaction, UiInstruction, UiMessage,
    UiParsedInstruction, UiTransactionEncoding,
};

use super::SolanaRpc;
use crate::models::{ParsedInstruction, ParsedTransaction};

const SYSTEM_PROGRAM: &str = "system";
const TRANSFER_TYPE: &str = "transfer";

#[derive(Serialize)]
struct RpcRequest<'a> {
    jsonrpc: &'static str,
    id: usize,
    method: &'static str,
    params: (&'a str, RpcTransactionConfig),
}

#[derive(Deserialize)]
struct RpcResponse {
    id: usize,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Deserialize)]
struct TransferInfo {
    source: String,
    destination: String,
    lamports: u64,
}

impl SolanaRpc {
    /// Resolve all signatures with a single JSON-RPC batch of `getTransaction` calls.
    pub async fn get_parsed_transactions(
        &self,
        signatures: &[String],
    ) -> Result<Vec<Option<ParsedTransaction>>> {
        let config = RpcTransactionConfig {
            encoding: Some(UiTransactionEncoding::JsonParsed),
            commitment: Some(CommitmentConfig::confirmed()),
            max_supported_transaction_version: Some(0),
        };

        let requests: Vec<RpcRequest> = signatures
            .iter()
            .enumerate()
            .map(|(id, signature)| RpcRequest {
                jsonrpc: "2.0",
                id,
                method: "getTransaction",
                params: (signature.as_str(), config.clone()),
            })
            .collect();

        let responses: Vec<RpcResponse> = self
            .http_client
            .post(&self.rpc_endpoint)
            .json(&requests)
            .send()
            .await
            .context("Failed to send getTransaction batch")?
            .error_for_status()
            .context("getTransaction batch rejected")?
            .json()
            .await
            .context("Failed to decode getTransaction batch response")?;

        Ok(collect_batch(signatures, responses))
    }
}

/// Place batch responses back in request order, by id.
///
/// Errors, null or missing results, unparseable bodies and unknown ids leave
/// the slot `None`. With a repeated id the first parsed result is kept.
fn collect_batch(
    signatures: &[String],
    responses: Vec<RpcResponse>,
) -> Vec<Option<ParsedTransaction>> {
    let mut transactions = vec![None; signatures.len()];

    for response in responses {
        let Some(slot) = transactions.get_mut(response.id) else {
            tracing::warn!("unexpected response id {} in transaction batch", response.id);
            continue;
        };
        if slot.is_some() {
            tracing::warn!("duplicate response id {} in transaction batch", response.id);
            continue;
        }

        if let Some(error) = response.error {
            tracing::debug!("transaction `{}` not resolved: {error}", signatures[response.id]);
            continue;
        }

        let Some(result) = response.result.filter(|r| !r.is_null()) else {
            continue;
        };

        match serde_json::from_value::<EncodedConfirmedTransactionWithStatusMeta>(result)
            .map_err(anyhow::Error::from)
            .and_then(parse_confirmed_transaction)
        {
            Ok(transaction) => *slot = Some(transaction),
            Err(e) => tracing::warn!(
                "failed to parse transaction `{}`: {e:?}",
                signatures[response.id]
            ),
        }
    }

    transactions
}

pub(crate) fn parse_confirmed_transaction(
    transaction: EncodedConfirmedTransactionWithStatusMeta,
) -> Result<ParsedTransaction> {
    let ui_transaction = match transaction.transaction.transaction {
        EncodedTransaction::Json(ui_transaction) => ui_transaction,
        _ => return Err(RpcClientError::UnsupportedEncoding.into()),
    };

    let signature = ui_transaction
        .signatures
        .into_iter()
        .next()
        .ok_or(RpcClientError::MissingSignature)?;

    let instructions = match ui_transaction.message {
        UiMessage::Parsed(message) => message.instructions.iter().map(parse_instruction).collect(),
        UiMessage::Raw(_) => return Err(RpcClientError::RawMessage(signature).into()),
    };

    let error = transaction
        .transaction
        .meta
        .as_ref()
        .and_then(|meta| meta.err.as_ref())
        .map(|err| err.to_string());

    Ok(ParsedTransaction {
        signature,
        slot: transaction.slot,
        block_time: transaction.block_time,
        error,
        instructions,
    })
}

fn parse_instruction(instruction: &UiInstruction) -> ParsedInstruction {
    match instruction {
        UiInstruction::Parsed(UiParsedInstruction::Parsed(parsed)) => {
            if parsed.program == SYSTEM_PROGRAM {
                if let Some(transfer) = parse_native_transfer(&parsed.parsed) {
                    return transfer;
                }
            }
            ParsedInstruction::Other {
                program_id: Some(parsed.program_id.clone()),
            }
        }
        UiInstruction::Parsed(UiParsedInstruction::PartiallyDecoded(decoded)) => {
            ParsedInstruction::Other {
                program_id: Some(decoded.program_id.clone()),
            }
        }
        UiInstruction::Compiled(_) => ParsedInstruction::Other { program_id: None },
    }
}

fn parse_native_transfer(parsed: &Value) -> Option<ParsedInstruction> {
    if parsed.get("type")?.as_str()? != TRANSFER_TYPE {
        return None;
    }

    let info: TransferInfo = serde_json::from_value(parsed.get("info")?.clone()).ok()?;

    Some(ParsedInstruction::NativeTransfer {
        source: info.source,
        destination: info.destination,
        lamports: info.lamports,
    })
}

#[derive(thiserror::Error, Debug)]
enum RpcClientError {
    #[error("Transaction is not JSON encoded")]
    UnsupportedEncoding,
    #[error("Transaction has no signatures")]
    MissingSignature,
    #[error("Transaction `{0}` was returned without parsed message")]
    RawMessage(String),
}
