//! Deterministic guardians for tests and local tooling. Keys are derived from
//! public seeds and must never secure anything real.

use anyhow::{
    ensure,
    Context,
};
use cosmwasm_std::Binary;
use k256::ecdsa::SigningKey;

use crate::{
    governance::{
        module_tag,
        Action,
        GovernancePacket,
        GuardianSetUpgrade,
        GOVERNANCE_ADDRESS,
        GOVERNANCE_CHAIN,
    },
    state::{
        GuardianAddress,
        GuardianSetInfo,
    },
    vaa::{
        digest,
        keccak256,
        GuardianSignature,
        ParsedVAA,
    },
};

#[derive(Clone, Debug)]
pub struct Guardians {
    keys: Vec<SigningKey>,
}

impl Guardians {
    /// `count` keys derived from `seed`. Different seeds give disjoint sets.
    pub fn new(seed: &str, count: usize) -> anyhow::Result<Guardians> {
        ensure!(count <= usize::from(u8::MAX), "at most 255 guardians");
        let keys = (0..count)
            .map(|i| {
                let secret = keccak256(format!("{seed}/{i}").as_bytes());
                SigningKey::from_slice(&secret)
                    .with_context(|| format!("guardian {i} of {seed:?} is not a valid key"))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Guardians { keys })
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn addresses(&self) -> Vec<GuardianAddress> {
        self.keys
            .iter()
            .map(|key| GuardianAddress::from_verifying_key(key.verifying_key()))
            .collect()
    }

    pub fn guardian_set(&self) -> GuardianSetInfo {
        GuardianSetInfo::new(self.addresses())
    }

    /// A 65-byte recoverable signature of `hash` by guardian `index`.
    pub fn sign(&self, index: u8, hash: &[u8; 32]) -> anyhow::Result<Binary> {
        let key = self
            .keys
            .get(usize::from(index))
            .with_context(|| format!("no guardian at index {index}"))?;
        let (signature, recovery_id) = key
            .sign_prehash_recoverable(hash)
            .context("failed to sign digest")?;

        let mut bytes = signature.to_bytes().to_vec();
        bytes.push(recovery_id.to_byte());
        Ok(Binary::from(bytes))
    }

    /// Signs the body of `vaa` with the guardians at `signers`, in the given
    /// order, and returns the wire encoding.
    pub fn sign_vaa(
        &self,
        mut vaa: ParsedVAA,
        signers: impl IntoIterator<Item = u8>,
    ) -> anyhow::Result<Vec<u8>> {
        vaa.hash = digest(&vaa.body());
        vaa.signatures = signers
            .into_iter()
            .map(|index| {
                Ok(GuardianSignature {
                    index,
                    signature: self.sign(index, &vaa.hash)?,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(vaa.serialize())
    }

    /// Signed by the first quorum of the set.
    pub fn sign_with_quorum(&self, vaa: ParsedVAA) -> anyhow::Result<Vec<u8>> {
        let quorum = self.guardian_set().quorum();
        self.sign_vaa(vaa, (0..quorum).map(|i| i as u8))
    }
}

/// An unsigned version 1 VAA.
pub fn unsigned_vaa(
    guardian_set_index: u32,
    emitter_chain: u16,
    emitter_address: [u8; 32],
    sequence: u64,
    payload: Vec<u8>,
) -> ParsedVAA {
    let mut vaa = ParsedVAA {
        version: 1,
        guardian_set_index,
        signatures: vec![],
        timestamp: 1_700_000_000,
        nonce: 0,
        emitter_chain,
        emitter_address,
        sequence,
        consistency_level: 1,
        payload,
        hash: [0u8; 32],
    };
    vaa.hash = digest(&vaa.body());
    vaa
}

/// An unsigned VAA from the default governance emitter.
pub fn governance_vaa(
    guardian_set_index: u32,
    sequence: u64,
    module: &str,
    action: u8,
    chain: u16,
    payload: Vec<u8>,
) -> ParsedVAA {
    let packet = GovernancePacket {
        module: module_tag(module),
        action,
        chain,
        payload,
    };
    unsigned_vaa(
        guardian_set_index,
        GOVERNANCE_CHAIN,
        GOVERNANCE_ADDRESS,
        sequence,
        packet.serialize(),
    )
}

/// A core guardian set upgrade to `guardians` under `new_index`.
pub fn guardian_set_upgrade_vaa(
    guardian_set_index: u32,
    sequence: u64,
    chain: u16,
    new_index: u32,
    guardians: &Guardians,
) -> ParsedVAA {
    let upgrade = GuardianSetUpgrade {
        new_guardian_set_index: new_index,
        new_guardian_set: guardians.guardian_set(),
    };
    governance_vaa(
        guardian_set_index,
        sequence,
        "Core",
        Action::GUARDIAN_SET_UPGRADE,
        chain,
        upgrade.serialize(),
    )
}
