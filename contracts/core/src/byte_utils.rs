use cosmwasm_std::Addr;

use crate::error::{
    ContractError,
    ParseError,
};

/// Big-endian positional reads. Every read is bounds-checked so that short
/// input surfaces as [`ParseError::Truncated`] instead of a panic.
pub trait ByteUtils {
    fn get_u8(&self, index: usize) -> Result<u8, ParseError>;
    fn get_u16(&self, index: usize) -> Result<u16, ParseError>;
    fn get_u32(&self, index: usize) -> Result<u32, ParseError>;
    fn get_u64(&self, index: usize) -> Result<u64, ParseError>;

    fn get_u128_be(&self, index: usize) -> Result<u128, ParseError>;
    /// High 128 then low 128
    fn get_u256(&self, index: usize) -> Result<(u128, u128), ParseError>;
    fn get_bytes32(&self, index: usize) -> Result<[u8; 32], ParseError>;
    fn get_bytes(&self, index: usize, bytes: usize) -> Result<&[u8], ParseError>;
    fn get_const_bytes<const N: usize>(&self, index: usize) -> Result<[u8; N], ParseError>;
}

impl ByteUtils for [u8] {
    fn get_u8(&self, index: usize) -> Result<u8, ParseError> {
        self.get(index).copied().ok_or(ParseError::Truncated)
    }
    fn get_u16(&self, index: usize) -> Result<u16, ParseError> {
        self.get_const_bytes(index).map(u16::from_be_bytes)
    }
    fn get_u32(&self, index: usize) -> Result<u32, ParseError> {
        self.get_const_bytes(index).map(u32::from_be_bytes)
    }
    fn get_u64(&self, index: usize) -> Result<u64, ParseError> {
        self.get_const_bytes(index).map(u64::from_be_bytes)
    }
    fn get_u128_be(&self, index: usize) -> Result<u128, ParseError> {
        self.get_const_bytes(index).map(u128::from_be_bytes)
    }
    fn get_u256(&self, index: usize) -> Result<(u128, u128), ParseError> {
        Ok((self.get_u128_be(index)?, self.get_u128_be(index + 128 / 8)?))
    }
    fn get_bytes32(&self, index: usize) -> Result<[u8; 32], ParseError> {
        self.get_const_bytes(index)
    }

    fn get_bytes(&self, index: usize, bytes: usize) -> Result<&[u8], ParseError> {
        let end = index.checked_add(bytes).ok_or(ParseError::Truncated)?;
        self.get(index..end).ok_or(ParseError::Truncated)
    }

    fn get_const_bytes<const N: usize>(&self, index: usize) -> Result<[u8; N], ParseError> {
        let mut bytes: [u8; N] = [0; N];
        bytes.copy_from_slice(self.get_bytes(index, N)?);
        Ok(bytes)
    }
}

/// Reads a u256 whose upper 24 bytes must be zero.
pub fn get_u64_from_u256(data: &[u8], index: usize) -> Result<u64, ContractError> {
    let (high, low) = data.get_u256(index)?;
    if high != 0 {
        return Err(ContractError::AmountTooHigh);
    }
    u64::try_from(low).map_err(|_| ContractError::AmountTooHigh)
}

/// Encodes a u64 as a big-endian u256.
pub fn u64_to_u256(value: u64) -> [u8; 32] {
    let mut result = [0u8; 32];
    result[24..].copy_from_slice(&value.to_be_bytes());
    result
}

/// Left-pad a <= 32 byte value with 0s
pub fn extend_to_32(bytes: &[u8]) -> [u8; 32] {
    let mut result = [0u8; 32];
    let len = usize::min(32, bytes.len());
    result[32 - len..].copy_from_slice(&bytes[bytes.len() - len..]);
    result
}

/// Turn a string into a fixed length array. If the string is shorter than the
/// resulting array, it gets padded with \0s on the right. If longer, it gets
/// truncated.
pub fn string_to_array<const N: usize>(s: &str) -> [u8; N] {
    let bytes = s.as_bytes();
    let len = usize::min(N, bytes.len());
    let mut result = [0u8; N];
    result[..len].copy_from_slice(&bytes[..len]);
    result
}

/// Reads a zero-padded string field, stopping at the first NUL byte.
pub fn get_string_from_32(v: &[u8]) -> String {
    let end = v.iter().position(|b| *b == 0).unwrap_or(v.len());
    String::from_utf8_lossy(&v[..end]).into_owned()
}

/// Local accounts are addressed by the lowercase hex of their 32-byte key.
pub fn human_address(canonical: &[u8; 32]) -> Addr {
    Addr::unchecked(hex::encode(canonical))
}

pub fn canonical_address(human: &Addr) -> Result<[u8; 32], ContractError> {
    let bytes = hex::decode(human.as_str()).map_err(|_| ContractError::WrongTargetAddressFormat)?;
    bytes
        .try_into()
        .map_err(|_| ContractError::WrongTargetAddressFormat)
}
