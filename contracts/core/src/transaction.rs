//! All-or-nothing units of work over a [`Storage`].
//!
//! Writes made through a [`StorageTransaction`] are buffered and only reach
//! the underlying store when [`transactional`] sees the action succeed.

use std::{
    collections::BTreeMap,
    ops::Bound,
};

use cosmwasm_std::{
    Order,
    Record,
    Storage,
};

#[derive(Clone, Debug, PartialEq, Eq)]
enum Delta {
    Set(Vec<u8>),
    Delete,
}

/// A write-buffering view over a read-only base store.
pub struct StorageTransaction<'a> {
    base: &'a dyn Storage,
    local: BTreeMap<Vec<u8>, Delta>,
}

impl<'a> StorageTransaction<'a> {
    pub fn new(base: &'a dyn Storage) -> Self {
        StorageTransaction {
            base,
            local: BTreeMap::new(),
        }
    }

    /// Releases the base store and returns the buffered writes.
    pub fn prepare(self) -> RepLog {
        RepLog(self.local.into_iter().collect())
    }
}

/// Buffered writes, applied in key order.
pub struct RepLog(Vec<(Vec<u8>, Delta)>);

impl RepLog {
    pub fn commit(self, storage: &mut dyn Storage) {
        for (key, delta) in self.0 {
            match delta {
                Delta::Set(value) => storage.set(&key, &value),
                Delta::Delete => storage.remove(&key),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Storage for StorageTransaction<'_> {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        match self.local.get(key) {
            Some(Delta::Set(value)) => Some(value.clone()),
            Some(Delta::Delete) => None,
            None => self.base.get(key),
        }
    }

    fn range<'b>(
        &'b self,
        start: Option<&[u8]>,
        end: Option<&[u8]>,
        order: Order,
    ) -> Box<dyn Iterator<Item = Record> + 'b> {
        if let (Some(start), Some(end)) = (start, end) {
            if start > end {
                return Box::new(std::iter::empty());
            }
        }

        let mut merged: BTreeMap<Vec<u8>, Vec<u8>> =
            self.base.range(start, end, Order::Ascending).collect();

        let bounds = (
            start.map_or(Bound::Unbounded, |s| Bound::Included(s.to_vec())),
            end.map_or(Bound::Unbounded, |e| Bound::Excluded(e.to_vec())),
        );
        for (key, delta) in self.local.range(bounds) {
            match delta {
                Delta::Set(value) => {
                    merged.insert(key.clone(), value.clone());
                }
                Delta::Delete => {
                    merged.remove(key);
                }
            }
        }

        match order {
            Order::Ascending => Box::new(merged.into_iter()),
            Order::Descending => Box::new(merged.into_iter().rev()),
        }
    }

    fn set(&mut self, key: &[u8], value: &[u8]) {
        self.local.insert(key.to_vec(), Delta::Set(value.to_vec()));
    }

    fn remove(&mut self, key: &[u8]) {
        self.local.insert(key.to_vec(), Delta::Delete);
    }
}

/// Runs `action` against a transaction over `storage`, committing its writes
/// only if it returns `Ok`.
pub fn transactional<T, E>(
    storage: &mut dyn Storage,
    action: impl FnOnce(&mut dyn Storage) -> Result<T, E>,
) -> Result<T, E> {
    let mut cache = StorageTransaction::new(&*storage);
    let result = action(&mut cache)?;
    cache.prepare().commit(storage);
    Ok(result)
}
