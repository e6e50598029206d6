use cosmwasm_std::{
    BankMsg,
    Coin,
    CosmosMsg,
    Env,
    Response,
    Storage,
    Uint128,
};
use sha2::{
    Digest,
    Sha512_256,
};
use tracing::debug;

use crate::{
    byte_utils::{
        extend_to_32,
        get_u64_from_u256,
        human_address,
        u64_to_u256,
        ByteUtils,
    },
    error::ContractError,
    registry,
    replay::CORE_REPLAY,
    state::{
        ConfigInfo,
        GuardianAddress,
        GuardianSetInfo,
        CONFIG,
    },
    vaa::ParsedVAA,
};

/// Default governance emitter chain (Solana)
pub const GOVERNANCE_CHAIN: u16 = 1;

/// Default governance emitter address
pub const GOVERNANCE_ADDRESS: [u8; 32] = {
    let mut address = [0u8; 32];
    address[31] = 4;
    address
};

/// A governance packet addressed to every chain
pub const ALL_CHAINS: u16 = 0;

/// 32-byte left-zero-padded ASCII module tag.
pub fn module_tag(name: &str) -> [u8; 32] {
    extend_to_32(name.as_bytes())
}

/// Hash an upgraded program must match: SHA-512/256 of `"Program" || program`.
pub fn program_hash(program: &[u8]) -> [u8; 32] {
    Sha512_256::new()
        .chain_update(b"Program")
        .chain_update(program)
        .finalize()
        .into()
}

pub fn is_governance_emitter(cfg: &ConfigInfo, emitter_chain: u16, emitter_address: &[u8]) -> bool {
    cfg.gov_chain == emitter_chain && cfg.gov_address == emitter_address
}

// 0   [32]uint8   module
// 32  uint8       action
// 33  uint16      target chain
// 35  []uint8     action payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GovernancePacket {
    pub module: [u8; 32],
    pub action: u8,
    pub chain: u16,
    pub payload: Vec<u8>,
}

impl GovernancePacket {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(GovernancePacket {
            module: data.get_bytes32(0)?,
            action: data.get_u8(32)?,
            chain: data.get_u16(33)?,
            payload: data[35..].to_vec(),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        [
            self.module.to_vec(),
            vec![self.action],
            self.chain.to_be_bytes().to_vec(),
            self.payload.clone(),
        ]
        .concat()
    }

    /// Rejects packets for another module or another chain. `allow_all`
    /// admits the wildcard chain id.
    pub fn check_target(
        &self,
        module: &str,
        chain_id: u16,
        allow_all: bool,
    ) -> Result<(), ContractError> {
        if self.module != module_tag(module) {
            return Err(ContractError::GovernanceSequenceViolation(
                "this is not a valid module",
            ));
        }
        if self.chain == chain_id || (allow_all && self.chain == ALL_CHAINS) {
            return Ok(());
        }
        Err(ContractError::GovernanceSequenceViolation(
            "the governance VAA is for another chain",
        ))
    }
}

pub struct Action;

impl Action {
    pub const CONTRACT_UPGRADE: u8 = 1;
    pub const GUARDIAN_SET_UPGRADE: u8 = 2;
    pub const SET_MESSAGE_FEE: u8 = 3;
    pub const FEE_PAYOUT: u8 = 4;
}

// action 1
pub struct ContractUpgrade {
    pub new_contract: [u8; 32],
}

impl ContractUpgrade {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(ContractUpgrade {
            new_contract: data.get_bytes32(0)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.new_contract.to_vec()
    }
}

// action 2
pub struct GuardianSetUpgrade {
    pub new_guardian_set_index: u32,
    pub new_guardian_set: GuardianSetInfo,
}

impl GuardianSetUpgrade {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        let new_guardian_set_index = data.get_u32(0)?;
        let n_guardians = data.get_u8(4)?;

        let addresses = (0..n_guardians as usize)
            .map(|i| {
                data.get_const_bytes(5 + i * GuardianAddress::LEN)
                    .map(GuardianAddress)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(GuardianSetUpgrade {
            new_guardian_set_index,
            new_guardian_set: GuardianSetInfo::new(addresses),
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        let addresses = &self.new_guardian_set.addresses;
        let mut data = self.new_guardian_set_index.to_be_bytes().to_vec();
        data.push(addresses.len() as u8);
        for address in addresses {
            data.extend_from_slice(&address.0);
        }
        data
    }
}

// action 3
pub struct SetFee {
    pub fee: u64,
}

impl SetFee {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(SetFee {
            fee: get_u64_from_u256(data, 0)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        u64_to_u256(self.fee).to_vec()
    }
}

// action 4
pub struct TransferFee {
    pub amount: u64,
    pub recipient: [u8; 32],
}

impl TransferFee {
    pub fn deserialize(data: &[u8]) -> Result<Self, ContractError> {
        Ok(TransferFee {
            amount: get_u64_from_u256(data, 0)?,
            recipient: data.get_bytes32(32)?,
        })
    }

    pub fn serialize(&self) -> Vec<u8> {
        [u64_to_u256(self.amount).to_vec(), self.recipient.to_vec()].concat()
    }
}

/// Applies a core governance VAA. Consumes its sequence in the replay guard
/// before any effect. During boot the signer set index is not required to be
/// current and guardian set upgrades may pick any index.
pub fn handle_governance_vaa(
    storage: &mut dyn Storage,
    env: &Env,
    vaa: &ParsedVAA,
    booting: bool,
) -> Result<Response, ContractError> {
    let state = CONFIG.load(storage)?;

    if !is_governance_emitter(&state, vaa.emitter_chain, &vaa.emitter_address) {
        return Err(ContractError::GovernanceSequenceViolation(
            "not a governance emitter",
        ));
    }
    if !booting && state.guardian_set_index != vaa.guardian_set_index {
        return Err(ContractError::GovernanceSequenceViolation(
            "governance VAAs must be signed by the current guardian set",
        ));
    }

    CORE_REPLAY.check_and_mark(storage, vaa.emitter_chain, &vaa.emitter_address, vaa.sequence)?;

    let gov_packet = GovernancePacket::deserialize(&vaa.payload)?;
    let allow_all = gov_packet.action == Action::GUARDIAN_SET_UPGRADE;
    gov_packet.check_target("Core", state.chain_id, allow_all)?;

    debug!(action = gov_packet.action, sequence = vaa.sequence, "core governance");

    let response = match gov_packet.action {
        Action::CONTRACT_UPGRADE => vaa_update_contract(storage, &gov_packet.payload),
        Action::GUARDIAN_SET_UPGRADE => vaa_update_guardian_set(
            storage,
            env,
            vaa.guardian_set_index,
            &gov_packet.payload,
            booting,
        ),
        Action::SET_MESSAGE_FEE => handle_set_fee(storage, &gov_packet.payload),
        Action::FEE_PAYOUT => handle_transfer_fee(storage, &gov_packet.payload),
        _ => Err(ContractError::InvalidVAAAction),
    }?;

    Ok(response.add_attribute("governance.sequence", vaa.sequence.to_string()))
}

fn vaa_update_guardian_set(
    storage: &mut dyn Storage,
    env: &Env,
    signing_set_index: u32,
    data: &[u8],
    booting: bool,
) -> Result<Response, ContractError> {
    /* Payload format
    0   uint32 new_index
    4   uint8 len(keys)
    5   [][20]uint8 guardian addresses
    */

    let GuardianSetUpgrade {
        new_guardian_set_index,
        new_guardian_set,
    } = GuardianSetUpgrade::deserialize(data)?;

    let old_guardian_set_index = registry::rotate(
        storage,
        new_guardian_set_index,
        new_guardian_set,
        signing_set_index,
        env.block.time.seconds(),
        booting,
    )?;

    Ok(Response::new()
        .add_attribute("action", "guardian_set_change")
        .add_attribute("old", old_guardian_set_index.to_string())
        .add_attribute("new", new_guardian_set_index.to_string()))
}

fn vaa_update_contract(storage: &mut dyn Storage, data: &[u8]) -> Result<Response, ContractError> {
    /* Payload format
    0   [32]uint8 approved program hash
    */

    let ContractUpgrade { new_contract } = ContractUpgrade::deserialize(data)?;

    CONFIG.update(storage, |mut state| -> Result<_, ContractError> {
        state.valid_update_approve_hash = Some(new_contract);
        Ok(state)
    })?;

    Ok(Response::new()
        .add_attribute("action", "contract_upgrade")
        .add_attribute("approved_hash", hex::encode(new_contract)))
}

fn handle_set_fee(storage: &mut dyn Storage, data: &[u8]) -> Result<Response, ContractError> {
    let SetFee { fee } = SetFee::deserialize(data)?;

    let state = CONFIG.update(storage, |mut state| -> Result<_, ContractError> {
        state.fee = Coin::new(u128::from(fee), state.fee.denom);
        Ok(state)
    })?;

    Ok(Response::new()
        .add_attribute("action", "fee_change")
        .add_attribute("new_fee.amount", state.fee.amount)
        .add_attribute("new_fee.denom", state.fee.denom))
}

fn handle_transfer_fee(storage: &mut dyn Storage, data: &[u8]) -> Result<Response, ContractError> {
    let TransferFee { amount, recipient } = TransferFee::deserialize(data)?;
    let amount = Uint128::from(amount);

    let state = CONFIG.update(storage, |mut state| -> Result<_, ContractError> {
        state.collected_fees = state
            .collected_fees
            .checked_sub(amount)
            .map_err(|_| ContractError::InsufficientFees)?;
        Ok(state)
    })?;

    let recipient = human_address(&recipient);
    Ok(Response::new()
        .add_message(CosmosMsg::Bank(BankMsg::Send {
            to_address: recipient.to_string(),
            amount: vec![Coin {
                denom: state.fee.denom,
                amount,
            }],
        }))
        .add_attribute("action", "fee_payout")
        .add_attribute("recipient", recipient)
        .add_attribute("amount", amount))
}

/// Consumes the approved upgrade hash if `approval_program` matches it.
pub fn authorize_upgrade(
    storage: &mut dyn Storage,
    approval_program: &[u8],
) -> Result<Response, ContractError> {
    let mut state = CONFIG.load(storage)?;
    let hash = program_hash(approval_program);

    if state.valid_update_approve_hash != Some(hash) {
        return Err(ContractError::UpgradeHashMismatch);
    }
    state.valid_update_approve_hash = None;
    CONFIG.save(storage, &state)?;

    Ok(Response::new()
        .add_attribute("action", "upgrade_authorized")
        .add_attribute("hash", hex::encode(hash)))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn module_tags_are_left_padded() {
        assert_eq!(
            hex::encode(module_tag("Core")),
            "00000000000000000000000000000000000000000000000000000000436f7265"
        );
        assert_eq!(
            hex::encode(module_tag("TokenBridge")),
            "000000000000000000000000000000000000000000546f6b656e427269646765"
        );
    }

    #[test]
    fn packet_round_trip() {
        let packet = GovernancePacket {
            module: module_tag("Core"),
            action: Action::SET_MESSAGE_FEE,
            chain: 8,
            payload: SetFee { fee: 2000 }.serialize(),
        };
        let data = packet.serialize();
        assert_eq!(data.len(), 35 + 32);
        assert_eq!(GovernancePacket::deserialize(&data), Ok(packet));
    }

    #[test]
    fn short_packet_is_malformed() {
        assert!(matches!(
            GovernancePacket::deserialize(&[0u8; 34]),
            Err(ContractError::MalformedVAA(_))
        ));
    }

    #[test]
    fn target_chain_rules() {
        let mut packet = GovernancePacket {
            module: module_tag("Core"),
            action: Action::GUARDIAN_SET_UPGRADE,
            chain: ALL_CHAINS,
            payload: vec![],
        };
        assert!(packet.check_target("Core", 8, true).is_ok());
        assert!(packet.check_target("Core", 8, false).is_err());
        assert!(packet.check_target("TokenBridge", 8, true).is_err());

        packet.chain = 2;
        assert!(packet.check_target("Core", 8, true).is_err());
        packet.chain = 8;
        assert!(packet.check_target("Core", 8, false).is_ok());
    }

    #[test]
    fn guardian_set_upgrade_requires_all_keys() {
        let upgrade = GuardianSetUpgrade {
            new_guardian_set_index: 1,
            new_guardian_set: GuardianSetInfo::new(vec![GuardianAddress([1u8; 20]); 3]),
        };
        let data = upgrade.serialize();
        let parsed = GuardianSetUpgrade::deserialize(&data).unwrap();
        assert_eq!(parsed.new_guardian_set.addresses.len(), 3);

        assert!(GuardianSetUpgrade::deserialize(&data[..data.len() - 1]).is_err());
    }

    #[test]
    fn program_hash_is_prefixed() {
        assert_ne!(program_hash(b"code"), program_hash(b"Programcode"));
        assert_eq!(program_hash(b"code"), {
            let hash: [u8; 32] = Sha512_256::digest(b"Programcode").into();
            hash
        });
    }
}
