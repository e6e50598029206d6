use cosmwasm_std::{
    Binary,
    Coin,
};
use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

use crate::{
    state::GuardianAddress,
    verify::SignatureStep,
};

/// The instantiation parameters of the core contract. See
/// [`crate::state::ConfigInfo`] for more details on what these fields mean.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct InstantiateMsg {
    pub gov_chain: u16,
    pub gov_address: Binary,

    pub guardian_set_expirity: u64,

    pub chain_id: u16,
    pub fee_denom: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExecuteMsg {
    /// Installs the first guardian set from an unverified governance VAA.
    /// Owner only, once.
    Boot { vaa: Binary },
    SubmitVAA { vaa: Binary },
    /// Same as `SubmitVAA` with signatures checked in caller-chosen slices.
    SubmitVAAInSteps { vaa: Binary, steps: Vec<SignatureStep> },
    PostMessage { message: Binary, nonce: u32 },
    AuthorizeUpgrade { approval_program: Binary },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    GuardianSetInfo {},
    GuardianSet { index: u32 },
    VerifyVAA { vaa: Binary, block_time: u64 },
    GetState {},
    Sequence { emitter: Binary },
    ReplayStatus {
        emitter_chain: u16,
        emitter_address: Binary,
        sequence: u64,
    },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct GuardianSetInfoResponse {
    pub guardian_set_index: u32,         // Current guardian set index
    pub addresses: Vec<GuardianAddress>, // List of querdian addresses
    pub expiration_time: Option<u64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct GetStateResponse {
    pub fee: Coin,
    pub collected_fees: Coin,
    pub booted: bool,
    pub chain_id: u16,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SequenceResponse {
    /// Sequence the emitter's next message will carry
    pub sequence: u64,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct ReplayStatusResponse {
    pub consumed: bool,
}
