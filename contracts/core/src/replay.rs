//! Replay protection: one bit per `(emitter_chain, emitter_address, sequence)`.
//!
//! Bits are packed into fixed-size buckets of `max_bits` sequences, stored
//! under `(bucket, emitter_chain, emitter_address)` and created zeroed on
//! first use. A bit is never cleared.

use cosmwasm_std::{
    Binary,
    Storage,
};
use cw_storage_plus::Map;

use crate::error::ContractError;

/// Sequences per bucket for core messages: 15 keys of 127 bytes.
pub const CORE_MAX_BITS: u64 = 15 * 127 * 8;

/// Sequences per bucket for token bridge messages: 16 keys of 127 bytes.
pub const TOKEN_BRIDGE_MAX_BITS: u64 = 16 * 127 * 8;

pub const CORE_REPLAY: ReplayGuard = ReplayGuard::new("core/replay", CORE_MAX_BITS);

type BucketKey<'a> = (u64, u16, &'a [u8]);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayGuard {
    namespace: &'static str,
    max_bits: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct BitPosition {
    bucket: u64,
    byte: usize,
    mask: u8,
}

impl ReplayGuard {
    /// `max_bits` must be a non-zero multiple of 8.
    pub const fn new(namespace: &'static str, max_bits: u64) -> Self {
        assert!(max_bits > 0 && max_bits % 8 == 0);
        ReplayGuard {
            namespace,
            max_bits,
        }
    }

    pub fn max_bits(&self) -> u64 {
        self.max_bits
    }

    fn bucket_bytes(&self) -> usize {
        (self.max_bits / 8) as usize
    }

    fn buckets<'k>(&self) -> Map<'static, BucketKey<'k>, Binary> {
        Map::new(self.namespace)
    }

    fn position(&self, sequence: u64) -> BitPosition {
        BitPosition {
            bucket: sequence / self.max_bits,
            byte: ((sequence / 8) % (self.max_bits / 8)) as usize,
            mask: 1 << (sequence % 8),
        }
    }

    fn load_bucket(
        &self,
        storage: &dyn Storage,
        key: BucketKey,
    ) -> Result<Vec<u8>, ContractError> {
        let bucket = self.buckets().may_load(storage, key)?;
        Ok(bucket.map_or_else(|| vec![0u8; self.bucket_bytes()], |bucket| bucket.to_vec()))
    }

    pub fn is_marked(
        &self,
        storage: &dyn Storage,
        emitter_chain: u16,
        emitter_address: &[u8; 32],
        sequence: u64,
    ) -> Result<bool, ContractError> {
        let position = self.position(sequence);
        let bucket = self.load_bucket(
            storage,
            (position.bucket, emitter_chain, emitter_address.as_slice()),
        )?;
        Ok(bucket[position.byte] & position.mask != 0)
    }

    /// Fails with [`ContractError::DuplicateVAA`] without writing anything if
    /// the sequence was already consumed.
    pub fn check_and_mark(
        &self,
        storage: &mut dyn Storage,
        emitter_chain: u16,
        emitter_address: &[u8; 32],
        sequence: u64,
    ) -> Result<(), ContractError> {
        let position = self.position(sequence);
        let key = (position.bucket, emitter_chain, emitter_address.as_slice());

        let mut bucket = self.load_bucket(storage, key)?;
        if bucket[position.byte] & position.mask != 0 {
            return Err(ContractError::DuplicateVAA);
        }
        bucket[position.byte] |= position.mask;

        self.buckets().save(storage, key, &Binary::from(bucket))?;
        Ok(())
    }
}
