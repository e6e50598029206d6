use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};

use cosmwasm_std::{
    Addr,
    Coin,
    StdResult,
    Storage,
    Uint128,
};
use cw_storage_plus::{
    Item,
    Map,
};
use k256::{
    ecdsa::VerifyingKey,
    elliptic_curve::sec1::ToEncodedPoint,
};

use crate::vaa::keccak256;

/// Seconds a replaced guardian set keeps verifying in-flight VAAs.
pub const DEFAULT_GUARDIAN_SET_EXPIRITY: u64 = 86400;

/// Information about this contract's general parameters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct ConfigInfo {
    /// Account allowed to boot the contract
    pub owner: Addr,

    /// Set once the initial guardian set has been installed
    pub booted: bool,

    /// Current active guardian set
    pub guardian_set_index: u32,

    /// Period for which a guardian set stays active after it has been replaced.
    /// The typo is an easter egg.
    pub guardian_set_expirity: u64,

    /// Governance chain (typically Solana, i.e. chain id 1)
    pub gov_chain: u16,

    /// Address of governance contract (typically 0x0000000000000000000000000000000000000000000000000000000000000004)
    pub gov_address: [u8; 32],

    /// The wormhole id of the current chain.
    pub chain_id: u16,

    // Message sending fee
    pub fee: Coin,

    /// Fees paid by publishers and not yet paid out by governance
    pub collected_fees: Uint128,

    /// Hash the next code upgrade must match, set by governance
    pub valid_update_approve_hash: Option<[u8; 32]>,
}

pub const CONFIG: Item<ConfigInfo> = Item::new("core/config");
pub const GUARDIAN_SETS: Map<u32, GuardianSetInfo> = Map::new("core/guardian_sets");
pub const SEQUENCES: Map<&[u8], u64> = Map::new("core/sequences");

// Guardian address
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, JsonSchema)]
pub struct GuardianAddress(pub [u8; 20]);

impl GuardianAddress {
    pub const LEN: usize = 20;

    /// Ethereum-style identity: the low 20 bytes of the keccak of the
    /// uncompressed public key without its 0x04 prefix.
    pub fn from_verifying_key(key: &VerifyingKey) -> Self {
        let point = key.to_encoded_point(false);
        let hash = keccak256(&point.as_bytes()[1..]);
        let mut bytes = [0u8; Self::LEN];
        bytes.copy_from_slice(&hash[32 - Self::LEN..]);
        GuardianAddress(bytes)
    }
}

impl From<[u8; 20]> for GuardianAddress {
    fn from(bytes: [u8; 20]) -> Self {
        GuardianAddress(bytes)
    }
}

// Guardian set information
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
pub struct GuardianSetInfo {
    // List of guardian addresses
    pub addresses: Vec<GuardianAddress>,
    // Guardian set expiration time, unset while the set is current
    pub expiration_time: Option<u64>,
}

impl GuardianSetInfo {
    pub fn new(addresses: Vec<GuardianAddress>) -> Self {
        GuardianSetInfo {
            addresses,
            expiration_time: None,
        }
    }

    /// Smallest signature count strictly above two thirds of the set.
    pub fn quorum(&self) -> usize {
        self.addresses.len() * 2 / 3 + 1
    }

    pub fn is_expired(&self, block_time: u64) -> bool {
        matches!(self.expiration_time, Some(expiration) if expiration <= block_time)
    }

    /// The keys as one concatenated byte string, in guardian order.
    pub fn concatenated_keys(&self, indices: impl IntoIterator<Item = u8>) -> Option<Vec<u8>> {
        let mut keys = vec![];
        for index in indices {
            keys.extend_from_slice(&self.addresses.get(index as usize)?.0);
        }
        Some(keys)
    }
}

pub fn sequence_set(storage: &mut dyn Storage, emitter: &[u8], sequence: u64) -> StdResult<()> {
    SEQUENCES.save(storage, emitter, &sequence)
}

pub fn sequence_read(storage: &dyn Storage, emitter: &[u8]) -> StdResult<u64> {
    Ok(SEQUENCES.may_load(storage, emitter)?.unwrap_or(0))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn quardian_set_quorum() {
        let num_guardians_trials: Vec<usize> =
            vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 19, 20, 25, 100];

        let expected_quorums: Vec<usize> =
            vec![1, 2, 3, 3, 4, 5, 5, 6, 7, 7, 8, 9, 13, 14, 17, 67];

        let make_guardian_set = |n: usize| -> GuardianSetInfo {
            GuardianSetInfo::new(vec![GuardianAddress([0u8; 20]); n])
        };

        for (i, &num_guardians) in num_guardians_trials.iter().enumerate() {
            let quorum = make_guardian_set(num_guardians).quorum();
            assert_eq!(quorum, expected_quorums[i], "quorum != expected");
        }
    }

    #[test]
    fn expiration_is_exclusive() {
        let mut set = GuardianSetInfo::new(vec![]);
        assert!(!set.is_expired(u64::MAX));

        set.expiration_time = Some(100);
        assert!(!set.is_expired(99));
        assert!(set.is_expired(100));
    }
}
