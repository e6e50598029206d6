//! Local assets and the decimal normalization applied to every amount that
//! crosses the bridge.
//!
//! Amounts on the wire carry at most 8 decimals. An asset with more native
//! decimals is divided by `10^(decimals - 8)` on the way out, dropping the
//! remainder as dust, and multiplied back on the way in.

use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

use portal_core::{
    byte_utils::u64_to_u256,
    error::ContractError,
};

/// Decimals of amounts inside transfer payloads
pub const BRIDGE_DECIMALS: u8 = 8;

/// Native precision above this cannot be rescaled
pub const MAX_NATIVE_DECIMALS: u8 = 16;

/// Symbols longer than this are cut
pub const MAX_SYMBOL_LEN: usize = 8;

/// Metadata the host keeps for a local asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct AssetInfo {
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

/// Read access to the host's asset ledger.
pub trait AssetQuerier {
    fn asset_info(&self, asset_id: u64) -> Result<AssetInfo, ContractError>;
}

/// Factor between native and wire amounts.
pub fn multiplier(decimals: u8) -> Result<u128, ContractError> {
    if decimals > MAX_NATIVE_DECIMALS {
        return Err(ContractError::DecimalOverflow);
    }
    Ok(10u128.pow(u32::from(decimals.saturating_sub(BRIDGE_DECIMALS))))
}

/// Native amount to wire amount, truncating dust.
pub fn normalize(amount: u128, decimals: u8) -> Result<u128, ContractError> {
    Ok(amount / multiplier(decimals)?)
}

/// Wire amount to native amount.
pub fn denormalize(amount: u128, decimals: u8) -> Result<u128, ContractError> {
    amount
        .checked_mul(multiplier(decimals)?)
        .ok_or(ContractError::DecimalOverflow)
}

/// Native assets are identified on the wire by their id in the low 8 bytes.
pub fn native_token_address(asset_id: u64) -> [u8; 32] {
    u64_to_u256(asset_id)
}

pub fn native_asset_id(token_address: &[u8; 32]) -> Result<u64, ContractError> {
    if token_address[..24].iter().any(|b| *b != 0) {
        return Err(ContractError::AssetNotFound);
    }
    let mut id = [0u8; 8];
    id.copy_from_slice(&token_address[24..]);
    Ok(u64::from_be_bytes(id))
}

/// Wrapped symbols are cut to [`MAX_SYMBOL_LEN`] characters.
pub fn truncate_symbol(symbol: &str) -> String {
    symbol.chars().take(MAX_SYMBOL_LEN).collect()
}
