use solana_program::pubkey::{Pubkey, PUBKEY_BYTES};

use crate::models::AccountId;

/// Parse a base58 account address. Purely local, never touches the network.
pub fn parse_account(address: &str) -> Result<AccountId, InvalidAddress> {
    let invalid = |reason: String| InvalidAddress {
        address: address.to_string(),
        reason,
    };

    if address.is_empty() {
        return Err(invalid("address is empty".to_string()));
    }

    let bytes = bs58::decode(address)
        .into_vec()
        .map_err(|e| invalid(e.to_string()))?;

    let bytes: [u8; PUBKEY_BYTES] = bytes.as_slice().try_into().map_err(|_| {
        invalid(format!(
            "expected {PUBKEY_BYTES} bytes, decoded {}",
            bytes.len()
        ))
    })?;

    Ok(AccountId::new(Pubkey::new_from_array(bytes)))
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid address `{address}`: {reason}")]
pub struct InvalidAddress {
    pub address: String,
    pub reason: String,
}
