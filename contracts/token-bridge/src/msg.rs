use cosmwasm_std::{
    Binary,
    CustomMsg,
    Uint128,
};
use portal_core::verify::SignatureStep;
use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

type HumanAddr = String;

/// The instantiation parameters of the token bridge contract. See
/// [`crate::state::ConfigInfo`] for more details on what these fields mean.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub gov_chain: u16,
    pub gov_address: Binary,

    pub chain_id: u16,
    pub emitter_address: Binary,
}

/// An amount of a local asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct Asset {
    pub asset_id: u64,
    pub amount: Uint128,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    /// Binds a wrapped asset created for an attestation to its local id.
    RegisterAssetHook {
        chain: u16,
        token_address: Binary,
        asset_id: u64,
    },

    InitiateTransfer {
        asset: Asset,
        recipient_chain: u16,
        recipient: Binary,
        fee: Uint128,
        nonce: u32,
    },

    InitiateTransferWithPayload {
        asset: Asset,
        recipient_chain: u16,
        recipient: Binary,
        payload: Binary,
        nonce: u32,
    },

    SubmitVaa {
        data: Binary,
    },

    SubmitVaaInSteps {
        data: Binary,
        steps: Vec<SignatureStep>,
    },

    CreateAssetMeta {
        asset_id: u64,
        nonce: u32,
    },

    AuthorizeUpgrade {
        approval_program: Binary,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    WrappedRegistry { chain: u16, address: Binary },
    ChainRegistration { chain: u16 },
    TransferInfo { vaa: Binary },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct WrappedRegistryResponse {
    /// Unset until the host has bound the asset
    pub asset_id: Option<u64>,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ChainRegistrationResponse {
    pub address: Binary,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct TransferInfoResponse {
    pub amount: Uint128,
    pub token_address: [u8; 32],
    pub token_chain: u16,
    pub recipient: [u8; 32],
    pub recipient_chain: u16,
    pub fee: Uint128,
    pub payload: Vec<u8>,
}

/// Ledger effects the host applies after a successful call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum BridgeMsg {
    /// Allocate a local asset for a foreign token, then call
    /// [`ExecuteMsg::RegisterAssetHook`] with its id.
    CreateWrapped {
        token_chain: u16,
        token_address: Binary,
        decimals: u8,
        symbol: String,
        name: String,
    },
    UpdateWrapped {
        token_chain: u16,
        token_address: Binary,
        symbol: String,
        name: String,
    },
    Mint {
        asset_id: u64,
        recipient: HumanAddr,
        amount: Uint128,
    },
    Burn {
        asset_id: u64,
        owner: HumanAddr,
        amount: Uint128,
    },
    /// Move a native asset from `owner` into bridge custody
    Lock {
        asset_id: u64,
        owner: HumanAddr,
        amount: Uint128,
    },
    /// Pay a native asset out of bridge custody
    Release {
        asset_id: u64,
        recipient: HumanAddr,
        amount: Uint128,
    },
}

impl CustomMsg for BridgeMsg {}
