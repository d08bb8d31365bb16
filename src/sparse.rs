use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use crate::RegisterStore;
use crate::bitpack::{pack_sparse_entries, unpack_sparse_entries};
use crate::error::{HllError, MalformedReason};

/// Compact index -> rho mapping. Only nonzero registers are stored; empty
/// keys are implicitly rho=0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SparseStore {
    b: u32,
    map: BTreeMap<u32, u8>,
}

/// `T_s = m/4`: once `|store| > T_s` the Estimator must promote to Dense.
pub fn sparse_threshold(b: u32) -> usize {
    ((1u64 << b) / 4) as usize
}

impl SparseStore {
    pub fn new(b: u32) -> Self {
        Self {
            b,
            map: BTreeMap::new(),
        }
    }

    pub fn precision(&self) -> u32 {
        self.b
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns `true` when the store now exceeds the sparse threshold and
    /// the caller must promote to Dense.
    pub fn should_promote(&self) -> bool {
        self.len() > sparse_threshold(self.b)
    }

    /// Entries in ascending index order, as required for deterministic
    /// serialization and order-stable merge summation.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u8)> + '_ {
        self.map.iter().map(|(&i, &r)| (i, r))
    }

    pub fn deserialize(bytes: &[u8], b: u32) -> Result<Self, HllError> {
        let entries = unpack_sparse_entries(bytes, b)?;
        let m = 1u64 << b;
        let mut map = BTreeMap::new();
        for (index, rho) in entries {
            if index as u64 >= m {
                return Err(MalformedReason::IndexOutOfRange { index, m: m as u32 }.into());
            }
            if rho == 0 {
                return Err(MalformedReason::RegisterOutOfRange(rho).into());
            }
            if map.insert(index, rho).is_some() {
                return Err(MalformedReason::DuplicateIndex(index).into());
            }
        }
        Ok(Self { b, map })
    }
}

impl RegisterStore for SparseStore {
    fn update(&mut self, index: u32, rho: u8) {
        match self.map.entry(index) {
            Entry::Vacant(entry) => {
                entry.insert(rho);
            }
            Entry::Occupied(mut entry) => {
                if *entry.get() < rho {
                    entry.insert(rho);
                }
            }
        }
    }

    fn get(&self, index: u32) -> u8 {
        self.map.get(&index).copied().unwrap_or(0)
    }

    fn harmonic(&self) -> f64 {
        let m = 1u64 << self.b;
        let mut sum = 0.0;
        for (_, rho) in self.iter() {
            sum += 1.0 / (1u64 << rho) as f64;
        }
        let zeros = m - self.map.len() as u64;
        sum += zeros as f64;
        sum
    }

    fn count_zeros(&self) -> u32 {
        (1u64 << self.b) as u32 - self.map.len() as u32
    }

    fn serialize(&self) -> Vec<u8> {
        let entries: Vec<(u32, u8)> = self.iter().collect();
        pack_sparse_entries(&entries, self.b)
    }
}
