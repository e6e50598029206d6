//! Guardian signature verification.
//!
//! Checking every signature of a large guardian set does not fit in one
//! bounded execution step, so verification is split in two phases:
//!
//! 1. [`verify_signatures`] checks one contiguous slice of the signature block
//!    against the keys the caller claims signed it. It needs no state.
//! 2. [`verify_vaa`] commits: it proves the verified slices tile the
//!    signature block exactly once, in order, that every claimed key really is
//!    the guardian at that index, that no guardian appears twice and that the
//!    super-majority threshold is met.
//!
//! [`parse_and_verify_vaa`] runs both phases with a single slice.

use std::ops::Deref;

use cosmwasm_std::{
    Binary,
    Storage,
};
use k256::ecdsa::{
    RecoveryId,
    Signature,
    VerifyingKey,
};
use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};
use tracing::warn;

use crate::{
    error::ContractError,
    registry,
    state::{
        GuardianAddress,
        GuardianSetInfo,
    },
    vaa::ParsedVAA,
};

/// Signatures checked per step when planning a split verification.
pub const SIGNATURE_STEP_SIZE: usize = 9;

/// Input of one verification step.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub struct SignatureStep {
    /// A run of whole 66-byte entries copied from the signature block
    pub signatures: Binary,
    /// 20-byte guardian addresses, one per entry, concatenated
    pub keys: Binary,
    /// Digest the signatures are over
    pub digest: Binary,
}

/// A step whose signatures recovered to its keys. Only
/// [`verify_signatures`] creates these.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedSignatures {
    signatures: Vec<u8>,
    keys: Vec<u8>,
    digest: [u8; 32],
}

impl VerifiedSignatures {
    pub fn len(&self) -> usize {
        self.signatures.len() / ParsedVAA::SIGNATURE_LEN
    }

    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }
}

/// A VAA that passed [`verify_vaa`]. Consuming actions take this instead of
/// raw bytes so they cannot run on unverified input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VerifiedVaa {
    vaa: ParsedVAA,
}

impl VerifiedVaa {
    pub fn into_inner(self) -> ParsedVAA {
        self.vaa
    }
}

impl Deref for VerifiedVaa {
    type Target = ParsedVAA;

    fn deref(&self) -> &ParsedVAA {
        &self.vaa
    }
}

/// At most one bit per guardian index.
#[derive(Default)]
struct GuardianBitmap([u64; 4]);

impl GuardianBitmap {
    /// Returns false if the bit was already set.
    fn insert(&mut self, index: u8) -> bool {
        let word = &mut self.0[index as usize / 64];
        let bit = 1u64 << (index % 64);
        let fresh = *word & bit == 0;
        *word |= bit;
        fresh
    }

    fn count(&self) -> usize {
        self.0.iter().map(|w| w.count_ones() as usize).sum()
    }
}

fn recover_signer(digest: &[u8; 32], signature: &[u8]) -> Result<GuardianAddress, ContractError> {
    let (rs, recovery) = signature.split_at(ParsedVAA::SIG_DATA_LEN);
    let signature =
        Signature::from_slice(rs).map_err(|_| ContractError::SignatureRecoveryFailed)?;
    let id = recovery
        .first()
        .copied()
        .and_then(RecoveryId::from_byte)
        .ok_or(ContractError::SignatureRecoveryFailed)?;
    let key = VerifyingKey::recover_from_prehash(digest, &signature, id)
        .map_err(|_| ContractError::SignatureRecoveryFailed)?;
    Ok(GuardianAddress::from_verifying_key(&key))
}

/// Checks that every entry of the step recovers to the matching key.
pub fn verify_signatures(step: &SignatureStep) -> Result<VerifiedSignatures, ContractError> {
    let signatures = step.signatures.as_slice();
    if signatures.is_empty() || signatures.len() % ParsedVAA::SIGNATURE_LEN != 0 {
        return Err(ContractError::InvalidSignatureStep);
    }
    let count = signatures.len() / ParsedVAA::SIGNATURE_LEN;
    if step.keys.len() != count * GuardianAddress::LEN {
        return Err(ContractError::InvalidSignatureStep);
    }
    let digest: [u8; 32] = step
        .digest
        .as_slice()
        .try_into()
        .map_err(|_| ContractError::InvalidSignatureStep)?;

    let entries = signatures.chunks_exact(ParsedVAA::SIGNATURE_LEN);
    for (entry, key) in entries.zip(step.keys.chunks_exact(GuardianAddress::LEN)) {
        let signer = recover_signer(&digest, &entry[ParsedVAA::SIG_DATA_POS..])?;
        if signer.0 != key {
            return Err(ContractError::SignatureRecoveryFailed);
        }
    }

    Ok(VerifiedSignatures {
        signatures: signatures.to_vec(),
        keys: step.keys.to_vec(),
        digest,
    })
}

/// Commits a verification session over `data`.
pub fn verify_vaa(
    storage: &dyn Storage,
    block_time: u64,
    data: &[u8],
    steps: &[VerifiedSignatures],
) -> Result<VerifiedVaa, ContractError> {
    let vaa = ParsedVAA::deserialize(data)?;

    if vaa.version != 1 {
        return Err(ContractError::InvalidVersion);
    }

    let guardian_set = registry::get(storage, vaa.guardian_set_index)?;
    if !registry::is_valid_for_verification(storage, vaa.guardian_set_index, block_time)? {
        return Err(ContractError::StaleGuardianSet);
    }

    let len_signers = vaa.signatures.len();
    if len_signers == 0 || len_signers < guardian_set.quorum() {
        return Err(ContractError::InsufficientSignatures);
    }
    if len_signers > guardian_set.addresses.len() {
        return Err(ContractError::TooManySignatures);
    }

    let end = ParsedVAA::body_offset(len_signers);
    let mut offset = ParsedVAA::HEADER_LEN;
    let mut hits = GuardianBitmap::default();

    for step in steps {
        // each step resumes exactly where the previous one stopped
        let covered = data.get(offset..offset + step.signatures.len());
        if offset + step.signatures.len() > end || covered != Some(step.signatures.as_slice()) {
            warn!(offset, "signature step does not continue the signature block");
            return Err(ContractError::IncompleteSignatureCoverage);
        }
        if step.digest != vaa.hash {
            return Err(ContractError::SignatureRecoveryFailed);
        }

        let entries = step.signatures.chunks_exact(ParsedVAA::SIGNATURE_LEN);
        for (entry, key) in entries.zip(step.keys.chunks_exact(GuardianAddress::LEN)) {
            let index = entry[0];
            if !hits.insert(index) {
                warn!(index, "guardian signed twice");
                return Err(ContractError::InsufficientSignatures);
            }
            let expected = guardian_set
                .addresses
                .get(index as usize)
                .ok_or(ContractError::SignatureRecoveryFailed)?;
            if expected.0 != key {
                return Err(ContractError::SignatureRecoveryFailed);
            }
        }

        offset += step.signatures.len();
    }

    if offset != end || hits.count() != len_signers {
        warn!(offset, end, "signature block not fully verified");
        return Err(ContractError::IncompleteSignatureCoverage);
    }

    Ok(VerifiedVaa { vaa })
}

/// Splits the signature block of `data` into steps of at most `step_size`
/// signatures, pairing each entry with the key of the guardian it names.
pub fn plan_signature_steps(
    data: &[u8],
    guardian_set: &GuardianSetInfo,
    step_size: usize,
) -> Result<Vec<SignatureStep>, ContractError> {
    if step_size == 0 {
        return Err(ContractError::InvalidSignatureStep);
    }
    let vaa = ParsedVAA::deserialize(data)?;
    let block = &data[ParsedVAA::HEADER_LEN..ParsedVAA::body_offset(vaa.signatures.len())];

    block
        .chunks(step_size * ParsedVAA::SIGNATURE_LEN)
        .map(|signatures| {
            let indices = signatures
                .chunks_exact(ParsedVAA::SIGNATURE_LEN)
                .map(|entry| entry[0]);
            let keys = guardian_set
                .concatenated_keys(indices)
                .ok_or(ContractError::SignatureRecoveryFailed)?;
            Ok(SignatureStep {
                signatures: Binary::from(signatures),
                keys: Binary::from(keys),
                digest: Binary::from(vaa.hash.as_slice()),
            })
        })
        .collect()
}

/// Parses raw VAA data into a struct and verifies whether it contains sufficient signatures of an
/// active guardian set i.e. is valid according to Wormhole consensus rules
pub fn parse_and_verify_vaa(
    storage: &dyn Storage,
    block_time: u64,
    data: &[u8],
) -> Result<VerifiedVaa, ContractError> {
    let vaa = ParsedVAA::deserialize(data)?;
    let guardian_set = registry::get(storage, vaa.guardian_set_index)?;

    let steps = plan_signature_steps(data, &guardian_set, usize::from(u8::MAX))?
        .iter()
        .map(verify_signatures)
        .collect::<Result<Vec<_>, _>>()?;

    verify_vaa(storage, block_time, data, &steps)
}

/// Verifies each step, then commits.
pub fn verify_vaa_in_steps(
    storage: &dyn Storage,
    block_time: u64,
    data: &[u8],
    steps: &[SignatureStep],
) -> Result<VerifiedVaa, ContractError> {
    let verified = steps
        .iter()
        .map(verify_signatures)
        .collect::<Result<Vec<_>, _>>()?;
    verify_vaa(storage, block_time, data, &verified)
}
