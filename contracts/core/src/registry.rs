//! Versioned guardian sets. Superseded sets are never deleted; they keep
//! verifying until their expiration so that VAAs signed just before a
//! rotation can still land.

use cosmwasm_std::Storage;
use tracing::debug;

use crate::{
    error::ContractError,
    state::{
        GuardianSetInfo,
        CONFIG,
        GUARDIAN_SETS,
    },
};

pub fn current_index(storage: &dyn Storage) -> Result<u32, ContractError> {
    Ok(CONFIG.load(storage)?.guardian_set_index)
}

pub fn get(storage: &dyn Storage, index: u32) -> Result<GuardianSetInfo, ContractError> {
    GUARDIAN_SETS
        .may_load(storage, index)?
        .ok_or(ContractError::GuardianSetNotFound)
}

pub fn is_valid_for_verification(
    storage: &dyn Storage,
    index: u32,
    block_time: u64,
) -> Result<bool, ContractError> {
    if index == current_index(storage)? {
        return Ok(true);
    }
    Ok(!get(storage, index)?.is_expired(block_time))
}

/// Installs `new_set` under `new_index` and makes it current.
///
/// Outside of boot the index must advance by exactly one. The set that signed
/// the initiating VAA gets `block_time + guardian_set_expirity` as its
/// expiration, unless the rotation targets that same index.
pub fn rotate(
    storage: &mut dyn Storage,
    new_index: u32,
    new_set: GuardianSetInfo,
    signing_set_index: u32,
    block_time: u64,
    booting: bool,
) -> Result<u32, ContractError> {
    let mut state = CONFIG.load(storage)?;

    if !booting && Some(new_index) != state.guardian_set_index.checked_add(1) {
        return Err(ContractError::GovernanceSequenceViolation(
            "guardian set index must increase in steps of 1",
        ));
    }
    if new_set.addresses.is_empty() {
        return Err(ContractError::EmptyGuardianSet);
    }

    let old_index = state.guardian_set_index;
    state.guardian_set_index = new_index;

    GUARDIAN_SETS.save(storage, new_index, &GuardianSetInfo::new(new_set.addresses))?;
    CONFIG.save(storage, &state)?;

    if new_index != signing_set_index {
        if let Some(mut old_set) = GUARDIAN_SETS.may_load(storage, signing_set_index)? {
            old_set.expiration_time = Some(block_time.saturating_add(state.guardian_set_expirity));
            GUARDIAN_SETS.save(storage, signing_set_index, &old_set)?;
        }
    }

    debug!(old = old_index, new = new_index, "guardian set rotated");
    Ok(old_index)
}
