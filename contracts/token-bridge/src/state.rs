use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

use cosmwasm_std::Addr;
use cw_storage_plus::{
    Item,
    Map,
};

use portal_core::{
    byte_utils::{
        get_u64_from_u256,
        u64_to_u256,
        ByteUtils,
    },
    error::ContractError,
    replay::{
        ReplayGuard,
        TOKEN_BRIDGE_MAX_BITS,
    },
};

/// Chain id this bridge runs on unless configured otherwise.
pub const DEFAULT_CHAIN_ID: u16 = 8;

// Token bridge configuration
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ConfigInfo {
    /// Account the host uses to bind wrapped assets
    pub owner: Addr,

    pub gov_chain: u16,
    pub gov_address: [u8; 32],

    pub chain_id: u16,

    /// Emitter address this bridge publishes under
    pub emitter_address: [u8; 32],

    pub valid_update_approve_hash: Option<[u8; 32]>,
}

/// A token from another chain, represented locally by a host asset.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct WrappedAsset {
    /// Local asset, bound by the register hook after creation
    pub asset_id: Option<u64>,
    /// At most 8, fixed at creation
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
    /// Sequence of the attestation that last updated this record
    pub sequence: u64,
    /// Hash of the attestation that created this record
    pub vaa_hash: [u8; 32],
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub struct WrappedOrigin {
    pub token_chain: u16,
    pub token_address: [u8; 32],
}

pub const CONFIG: Item<ConfigInfo> = Item::new("token_bridge/config");
pub const BRIDGE_CONTRACTS: Map<u16, [u8; 32]> = Map::new("token_bridge/bridge_contracts");
pub const WRAPPED_ASSETS: Map<(u16, &[u8]), WrappedAsset> = Map::new("token_bridge/wrapped_assets");
pub const WRAPPED_ORIGINS: Map<u64, WrappedOrigin> = Map::new("token_bridge/wrapped_origins");

pub const TOKEN_BRIDGE_REPLAY: ReplayGuard =
    ReplayGuard::new("token_bridge/replay", TOKEN_BRIDGE_MAX_BITS);

pub struct Action;

impl Action {
    pub const TRANSFER: u8 = 1;
    pub const ATTEST_META: u8 = 2;
    pub const TRANSFER_WITH_PAYLOAD: u8 = 3;
}

pub struct GovernanceAction;

impl GovernanceAction {
    pub const REGISTER_CHAIN: u8 = 1;
    pub const UPGRADE_CONTRACT: u8 = 2;
}

// 0 u8 action
// 1 [u8] payload

pub struct TokenBridgeMessage {
    pub action: u8,
    pub payload: Vec<u8>,
}

impl TokenBridgeMessage {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        let action = data.get_u8(0)?;
        Ok(TokenBridgeMessage {
            action,
            payload: data[1..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        [vec![self.action], self.payload.clone()].concat()
    }
}

//     0   u256     amount
//     32  [u8; 32] token_address
//     64  u16      token_chain
//     66  [u8; 32] recipient
//     98  u16      recipient_chain
//     100 u256     fee

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferInfo {
    pub amount: u64,
    pub token_address: [u8; 32],
    pub token_chain: u16,
    pub recipient: [u8; 32],
    pub recipient_chain: u16,
    pub fee: u64,
}

impl TransferInfo {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(TransferInfo {
            amount: get_u64_from_u256(data, 0)?,
            token_address: data.get_bytes32(32)?,
            token_chain: data.get_u16(64)?,
            recipient: data.get_bytes32(66)?,
            recipient_chain: data.get_u16(98)?,
            fee: get_u64_from_u256(data, 100)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        [
            u64_to_u256(self.amount).to_vec(),
            self.token_address.to_vec(),
            self.token_chain.to_be_bytes().to_vec(),
            self.recipient.to_vec(),
            self.recipient_chain.to_be_bytes().to_vec(),
            u64_to_u256(self.fee).to_vec(),
        ]
        .concat()
    }
}

//     0   u256     amount
//     32  [u8; 32] token_address
//     64  u16      token_chain
//     66  [u8; 32] recipient
//     98  u16      recipient_chain
//     100 [u8; 32] sender_address
//     132 [u8]     payload

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransferWithPayloadInfo {
    pub amount: u64,
    pub token_address: [u8; 32],
    pub token_chain: u16,
    pub recipient: [u8; 32],
    pub recipient_chain: u16,
    pub sender_address: [u8; 32],
    pub payload: Vec<u8>,
}

impl TransferWithPayloadInfo {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        let sender_address = data.get_bytes32(100)?;
        Ok(TransferWithPayloadInfo {
            amount: get_u64_from_u256(data, 0)?,
            token_address: data.get_bytes32(32)?,
            token_chain: data.get_u16(64)?,
            recipient: data.get_bytes32(66)?,
            recipient_chain: data.get_u16(98)?,
            sender_address,
            payload: data[132..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        [
            u64_to_u256(self.amount).to_vec(),
            self.token_address.to_vec(),
            self.token_chain.to_be_bytes().to_vec(),
            self.recipient.to_vec(),
            self.recipient_chain.to_be_bytes().to_vec(),
            self.sender_address.to_vec(),
            self.payload.clone(),
        ]
        .concat()
    }

    /// The transfer part. The fee slot carries the sender, so no fee applies.
    pub fn as_transfer_info(&self) -> TransferInfo {
        TransferInfo {
            amount: self.amount,
            token_address: self.token_address,
            token_chain: self.token_chain,
            recipient: self.recipient,
            recipient_chain: self.recipient_chain,
            fee: 0,
        }
    }
}

//     0   [u8; 32] token_address
//     32  u16      token_chain
//     34  u8       decimals
//     35  [u8; 32] symbol
//     67  [u8; 32] name

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssetMeta {
    pub token_address: [u8; 32],
    pub token_chain: u16,
    pub decimals: u8,
    pub symbol: [u8; 32],
    pub name: [u8; 32],
}

impl AssetMeta {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(AssetMeta {
            token_address: data.get_bytes32(0)?,
            token_chain: data.get_u16(32)?,
            decimals: data.get_u8(34)?,
            symbol: data.get_bytes32(35)?,
            name: data.get_bytes32(67)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        [
            self.token_address.to_vec(),
            self.token_chain.to_be_bytes().to_vec(),
            vec![self.decimals],
            self.symbol.to_vec(),
            self.name.to_vec(),
        ]
        .concat()
    }
}

pub struct RegisterChain {
    pub chain_id: u16,
    pub chain_address: [u8; 32],
}

impl RegisterChain {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(RegisterChain {
            chain_id: data.get_u16(0)?,
            chain_address: data.get_bytes32(2)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        [self.chain_id.to_be_bytes().to_vec(), self.chain_address.to_vec()].concat()
    }
}

pub struct UpgradeContract {
    pub new_contract: [u8; 32],
}

impl UpgradeContract {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(UpgradeContract {
            new_contract: data.get_bytes32(0)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.new_contract.to_vec()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn transfer_layout() {
        let info = TransferInfo {
            amount: 100_000_000,
            token_address: [1u8; 32],
            token_chain: 8,
            recipient: [2u8; 32],
            recipient_chain: 18,
            fee: 5,
        };
        let data = info.serialize();
        assert_eq!(data.len(), 132);
        assert_eq!(data[64..66], [0, 8]);
        assert_eq!(data[98..100], [0, 18]);
        assert_eq!(TransferInfo::deserialize(&data), Ok(info));
    }

    #[test]
    fn amounts_above_u64_are_rejected() {
        let mut data = TransferInfo {
            amount: 1,
            token_address: [0u8; 32],
            token_chain: 2,
            recipient: [0u8; 32],
            recipient_chain: 8,
            fee: 0,
        }
        .serialize();
        data[7] = 1;
        assert_eq!(
            TransferInfo::deserialize(&data),
            Err(ContractError::AmountTooHigh)
        );
    }

    #[test]
    fn payload_transfer_has_no_fee() {
        let info = TransferWithPayloadInfo {
            amount: 10,
            token_address: [1u8; 32],
            token_chain: 2,
            recipient: [2u8; 32],
            recipient_chain: 8,
            sender_address: [3u8; 32],
            payload: b"memo".to_vec(),
        };
        let parsed = TransferWithPayloadInfo::deserialize(&info.serialize()).unwrap();
        assert_eq!(parsed, info);
        assert_eq!(parsed.as_transfer_info().fee, 0);
    }

    #[test]
    fn short_messages_are_malformed() {
        assert!(matches!(
            TokenBridgeMessage::deserialize(&[]),
            Err(ContractError::MalformedVAA(_))
        ));
        assert!(matches!(
            AssetMeta::deserialize(&[0u8; 98]),
            Err(ContractError::MalformedVAA(_))
        ));
        assert!(AssetMeta::deserialize(&[0u8; 99]).is_ok());
    }
}
