use crate::RegisterStore;
use crate::bitpack::{pack, unpack};
use crate::error::{HllError, MalformedReason};

const REG_WIDTH: u32 = 6;
const REG_MAX: u8 = 63;

/// Fixed array of `2^b` 6-bit registers, bit-packed when serialized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DenseStore {
    b: u32,
    slots: Vec<u8>,
}

impl DenseStore {
    pub fn new(b: u32) -> Self {
        Self {
            b,
            slots: vec![0u8; 1usize << b],
        }
    }

    pub fn precision(&self) -> u32 {
        self.b
    }

    pub fn from_sparse(b: u32, entries: impl Iterator<Item = (u32, u8)>) -> Self {
        let mut store = Self::new(b);
        for (index, rho) in entries {
            store.update(index, rho);
        }
        store
    }

    pub fn deserialize(bytes: &[u8], b: u32) -> Result<Self, HllError> {
        let m = 1usize << b;
        let expected_len = ((REG_WIDTH as u64 * m as u64 + 7) / 8) as usize;
        if bytes.len() != expected_len {
            return Err(MalformedReason::WrongDenseLength {
                actual: bytes.len(),
                expected: expected_len,
            }
            .into());
        }

        let values = unpack(bytes, m, REG_WIDTH)?;
        let mut slots = Vec::with_capacity(m);
        for v in values {
            if v > REG_MAX as u64 {
                return Err(MalformedReason::RegisterOutOfRange(v as u8).into());
            }
            slots.push(v as u8);
        }
        Ok(Self { b, slots })
    }
}

impl RegisterStore for DenseStore {
    fn update(&mut self, index: u32, rho: u8) {
        let slot = &mut self.slots[index as usize];
        if rho > *slot {
            *slot = rho;
        }
    }

    fn get(&self, index: u32) -> u8 {
        self.slots[index as usize]
    }

    fn harmonic(&self) -> f64 {
        self.slots.iter().map(|&v| 1.0 / (1u64 << v) as f64).sum()
    }

    fn count_zeros(&self) -> u32 {
        self.slots.iter().filter(|&&v| v == 0).count() as u32
    }

    fn serialize(&self) -> Vec<u8> {
        let values: Vec<u64> = self.slots.iter().map(|&v| v as u64).collect();
        debug_assert!(
            values.iter().all(|&v| v <= REG_MAX as u64),
            "dense register values always fit in 6 bits"
        );
        pack(&values, REG_WIDTH).unwrap_or_default()
    }
}
