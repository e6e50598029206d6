use cosmwasm_std::Binary;
use schemars::JsonSchema;
use serde::{
    Deserialize,
    Serialize,
};
use sha3::{
    Digest,
    Keccak256,
};

use crate::{
    byte_utils::ByteUtils,
    error::ParseError,
};

pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// The value guardians sign: the body is hashed twice.
pub fn digest(body: &[u8]) -> [u8; 32] {
    keccak256(&keccak256(body))
}

/// One guardian's entry in the signature block.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct GuardianSignature {
    /// Position of the signer in the guardian set
    pub index: u8,
    /// r || s || recovery id
    pub signature: Binary,
}

// Validator Action Approval(VAA) data
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, JsonSchema)]
pub struct ParsedVAA {
    pub version: u8,
    pub guardian_set_index: u32,
    pub signatures: Vec<GuardianSignature>,

    pub timestamp: u32,
    pub nonce: u32,
    pub emitter_chain: u16,
    pub emitter_address: [u8; 32],
    pub sequence: u64,
    pub consistency_level: u8,
    pub payload: Vec<u8>,

    /// Double keccak of the body
    pub hash: [u8; 32],
}

impl ParsedVAA {
    /* VAA format:

    header (length 6):
    0   uint8   version (0x01)
    1   uint32  guardian set index
    5   uint8   len signatures

    per signature (length 66):
    0   uint8       index of the signer (in guardian keys)
    1   [65]uint8   signature

    body:
    0   uint32      timestamp (unix in seconds)
    4   uint32      nonce
    8   uint16      emitter_chain
    10  [32]uint8   emitter_address
    42  uint64      sequence
    50  uint8       consistency_level
    51  []uint8     payload
    */

    pub const HEADER_LEN: usize = 6;
    pub const SIGNATURE_LEN: usize = 66;

    pub const GUARDIAN_SET_INDEX_POS: usize = 1;
    pub const LEN_SIGNER_POS: usize = 5;

    pub const VAA_NONCE_POS: usize = 4;
    pub const VAA_EMITTER_CHAIN_POS: usize = 8;
    pub const VAA_EMITTER_ADDRESS_POS: usize = 10;
    pub const VAA_SEQUENCE_POS: usize = 42;
    pub const VAA_CONSISTENCY_LEVEL_POS: usize = 50;
    pub const VAA_PAYLOAD_POS: usize = 51;

    // Signature data offsets in the signature block
    pub const SIG_DATA_POS: usize = 1;
    // Signature length minus recovery id at the end
    pub const SIG_DATA_LEN: usize = 64;
    // Recovery byte is last after the main signature
    pub const SIG_RECOVERY_POS: usize = Self::SIG_DATA_POS + Self::SIG_DATA_LEN;

    /// Offset of the body for a VAA announcing `len_signers` signatures.
    pub fn body_offset(len_signers: usize) -> usize {
        Self::HEADER_LEN + Self::SIGNATURE_LEN * len_signers
    }

    pub fn deserialize(data: &[u8]) -> Result<Self, ParseError> {
        let version = data.get_u8(0)?;
        let guardian_set_index = data.get_u32(Self::GUARDIAN_SET_INDEX_POS)?;
        let len_signers = data.get_u8(Self::LEN_SIGNER_POS)? as usize;

        let body_offset = Self::body_offset(len_signers);
        if data.len() < body_offset {
            return Err(ParseError::SignatureCountMismatch);
        }

        let signatures = data[Self::HEADER_LEN..body_offset]
            .chunks_exact(Self::SIGNATURE_LEN)
            .map(|entry| GuardianSignature {
                index: entry[0],
                signature: Binary::from(&entry[Self::SIG_DATA_POS..]),
            })
            .collect();

        let body = &data[body_offset..];
        if body.len() < Self::VAA_PAYLOAD_POS {
            return Err(ParseError::Truncated);
        }

        Ok(ParsedVAA {
            version,
            guardian_set_index,
            signatures,
            timestamp: body.get_u32(0)?,
            nonce: body.get_u32(Self::VAA_NONCE_POS)?,
            emitter_chain: body.get_u16(Self::VAA_EMITTER_CHAIN_POS)?,
            emitter_address: body.get_bytes32(Self::VAA_EMITTER_ADDRESS_POS)?,
            sequence: body.get_u64(Self::VAA_SEQUENCE_POS)?,
            consistency_level: body.get_u8(Self::VAA_CONSISTENCY_LEVEL_POS)?,
            payload: body[Self::VAA_PAYLOAD_POS..].to_vec(),
            hash: digest(body),
        })
    }

    /// The signed portion: timestamp through payload.
    pub fn body(&self) -> Vec<u8> {
        let mut body = Vec::with_capacity(Self::VAA_PAYLOAD_POS + self.payload.len());
        body.extend_from_slice(&self.timestamp.to_be_bytes());
        body.extend_from_slice(&self.nonce.to_be_bytes());
        body.extend_from_slice(&self.emitter_chain.to_be_bytes());
        body.extend_from_slice(&self.emitter_address);
        body.extend_from_slice(&self.sequence.to_be_bytes());
        body.push(self.consistency_level);
        body.extend_from_slice(&self.payload);
        body
    }

    pub fn serialize(&self) -> Vec<u8> {
        let mut data = Vec::with_capacity(Self::body_offset(self.signatures.len()));
        data.push(self.version);
        data.extend_from_slice(&self.guardian_set_index.to_be_bytes());
        data.push(self.signatures.len() as u8);
        for signature in &self.signatures {
            data.push(signature.index);
            data.extend_from_slice(signature.signature.as_slice());
        }
        data.extend(self.body());
        data
    }
}
