//! A dual-representation HyperLogLog cardinality estimator.
//!
//! An [`Estimator`] tracks the approximate number of distinct items added to
//! it in memory sub-linear in the true cardinality. Small cardinalities use
//! a compact [`SparseStore`]; once that grows past a threshold the
//! estimator promotes itself, once and irreversibly, to a bit-packed
//! [`DenseStore`]. Two estimators of equal precision can be merged losslessly
//! (`merge` computes the same register state as a union of their streams),
//! and an estimator serializes to a compact, self-describing
//! [envelope](self#envelope) byte blob for storage.
//!
//! ```
//! use cardinal_hll::Estimator;
//!
//! let mut hll = Estimator::new(14).unwrap();
//! hll.add_str("foo");
//! hll.add_str("bar");
//! assert!(hll.estimate() > 0.0);
//! ```

mod bias;
mod bitpack;
mod dense;
mod envelope;
mod error;
mod hash;
mod register;
mod sparse;

pub use dense::DenseStore;
pub use error::HllError;
pub use sparse::SparseStore;

use error::check_precision;

/// The internal contract both register representations satisfy: update a
/// register with max semantics, read one back, feed the estimator's
/// harmonic sum and zero count, and serialize to the representation's
/// canonical payload bytes.
pub(crate) trait RegisterStore {
    fn update(&mut self, index: u32, rho: u8);
    fn get(&self, index: u32) -> u8;
    fn harmonic(&self) -> f64;
    fn count_zeros(&self) -> u32;
    fn serialize(&self) -> Vec<u8>;
}

/// Which representation an [`Estimator`] currently holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Sparse,
    Dense,
}

/// Top-level cardinality estimator. Starts empty in [`Mode::Sparse`] and may
/// promote to [`Mode::Dense`] exactly once, never back.
#[derive(Clone, Debug, PartialEq)]
pub enum Estimator {
    Sparse(SparseStore),
    Dense(DenseStore),
}

impl Estimator {
    /// Creates an empty, Sparse-mode estimator at precision `b` (`m = 2^b`
    /// registers). `b` must be in `[4, 18]`.
    pub fn new(b: u32) -> Result<Self, HllError> {
        check_precision(b)?;
        Ok(Estimator::Sparse(SparseStore::new(b)))
    }

    pub fn precision(&self) -> u32 {
        match self {
            Estimator::Sparse(s) => s.precision(),
            Estimator::Dense(d) => d.precision(),
        }
    }

    pub fn mode(&self) -> Mode {
        match self {
            Estimator::Sparse(_) => Mode::Sparse,
            Estimator::Dense(_) => Mode::Dense,
        }
    }

    /// Adds one item's canonical bytes to the estimator.
    pub fn add(&mut self, item: &[u8]) {
        let hash = hash::murmur_hash64a(item, 0);
        let (index, rho) = register::register_rule(hash, self.precision());

        match self {
            Estimator::Sparse(s) => s.update(index, rho),
            Estimator::Dense(d) => d.update(index, rho),
        }

        self.promote_if_needed();
    }

    /// Convenience wrapper over [`Estimator::add`] for UTF-8 text: the
    /// caller is responsible for producing the canonical bytes for anything
    /// that isn't already a string (numbers and structured values are never
    /// stringified implicitly).
    pub fn add_str(&mut self, item: &str) {
        self.add(item.as_bytes());
    }

    /// The estimated number of distinct items added, with small/mid-range
    /// bias correction and a linear-counting override for very small
    /// cardinalities.
    pub fn estimate(&self) -> f64 {
        let b = self.precision();
        let (z, v) = match self {
            Estimator::Sparse(s) => (s.harmonic(), s.count_zeros()),
            Estimator::Dense(d) => (d.harmonic(), d.count_zeros()),
        };

        let m = (1u64 << b) as f64;
        let mut e = bias::alpha_mm(b) / z;
        if e <= bias::threshold(b) {
            e = (e - bias::bias_estimate(e, b)).max(0.0);
        }

        if v > 0 {
            let linear_count = m * (m / v as f64).ln();
            if linear_count <= bias::threshold(b) {
                return linear_count;
            }
        }

        e
    }

    /// Merges `other` into `self` in place, returning `self`. Register-wise
    /// this is a max-union: commutative, associative, and idempotent.
    /// Fails if the two estimators were built with different precision.
    pub fn merge(&mut self, other: &Self) -> Result<&mut Self, HllError> {
        let (lhs, rhs) = (self.precision(), other.precision());
        if lhs != rhs {
            return Err(HllError::IncompatiblePrecision { lhs, rhs });
        }

        match other {
            Estimator::Dense(other_dense) => {
                self.promote_to_dense();
                if let Estimator::Dense(self_dense) = self {
                    for i in 0..(1u32 << lhs) {
                        self_dense.update(i, other_dense.get(i));
                    }
                }
            }
            Estimator::Sparse(other_sparse) => match self {
                Estimator::Dense(self_dense) => {
                    for (index, rho) in other_sparse.iter() {
                        self_dense.update(index, rho);
                    }
                }
                Estimator::Sparse(self_sparse) => {
                    for (index, rho) in other_sparse.iter() {
                        self_sparse.update(index, rho);
                    }
                }
            },
        }

        self.promote_if_needed();
        Ok(self)
    }

    fn promote_if_needed(&mut self) {
        let needs_promotion = matches!(self, Estimator::Sparse(s) if s.should_promote());
        if needs_promotion {
            self.promote_to_dense();
        }
    }

    /// Irreversible Sparse -> Dense transition. No-op if already Dense.
    fn promote_to_dense(&mut self) {
        let promoted = match self {
            Estimator::Sparse(s) => Some(DenseStore::from_sparse(s.precision(), s.iter())),
            Estimator::Dense(_) => None,
        };
        if let Some(dense) = promoted {
            *self = Estimator::Dense(dense);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_rejects_out_of_range_precision() {
        assert!(Estimator::new(3).is_err());
        assert!(Estimator::new(19).is_err());
        assert!(Estimator::new(4).is_ok());
        assert!(Estimator::new(18).is_ok());
    }

    #[test]
    fn s1_empty_estimate_is_near_zero() {
        let hll = Estimator::new(14).unwrap();
        assert!(hll.estimate() < 1.0);
    }

    #[test]
    fn s2_singleton() {
        let mut hll = Estimator::new(14).unwrap();
        hll.add(b"foo");
        let e = hll.estimate();
        assert!((1.0..=2.0).contains(&e), "estimate was {e}");
    }

    #[test]
    fn s3_mid_range_accuracy() {
        let mut hll = Estimator::new(14).unwrap();
        for i in 0..1000 {
            hll.add_str(&format!("item{i}"));
        }
        let e = hll.estimate();
        assert!((e - 1000.0).abs() / 1000.0 < 0.1, "estimate was {e}");
    }

    #[test]
    fn s6_promotion_on_insert() {
        let mut hll = Estimator::new(14).unwrap(); // T_s = 4096
        for i in 0..4097 {
            hll.add_str(&format!("item{i}"));
        }
        assert_eq!(hll.mode(), Mode::Dense);
        let e = hll.estimate();
        assert!((e - 4097.0).abs() / 4097.0 < 0.05, "estimate was {e}");
    }

    #[test]
    fn merge_rejects_incompatible_precision() {
        let mut a = Estimator::new(14).unwrap();
        let b = Estimator::new(12).unwrap();
        assert!(matches!(
            a.merge(&b),
            Err(HllError::IncompatiblePrecision { lhs: 14, rhs: 12 })
        ));
    }

    #[test]
    fn s5_merge_equals_union() {
        let mut a = Estimator::new(14).unwrap();
        for i in 0..50 {
            a.add_str(&format!("item{i}"));
        }
        let mut b = Estimator::new(14).unwrap();
        for i in 30..80 {
            b.add_str(&format!("item{i}"));
        }
        let mut c = Estimator::new(14).unwrap();
        for i in 0..80 {
            c.add_str(&format!("item{i}"));
        }

        a.merge(&b).unwrap();
        let merged = a.estimate();
        let union = c.estimate();
        assert!((merged - union).abs() / union < 0.02, "{merged} vs {union}");
    }

    #[test]
    fn merge_is_idempotent_in_state() {
        let mut a = Estimator::new(10).unwrap();
        for i in 0..100 {
            a.add_str(&format!("item{i}"));
        }
        let snapshot = a.clone();
        a.merge(&snapshot.clone()).unwrap();
        assert_eq!(a, snapshot);
    }

    #[test]
    fn merge_is_commutative_in_state() {
        let mut a = Estimator::new(10).unwrap();
        let mut b = Estimator::new(10).unwrap();
        for i in 0..50 {
            a.add_str(&format!("a{i}"));
        }
        for i in 0..50 {
            b.add_str(&format!("b{i}"));
        }
        let mut ab = a.clone();
        ab.merge(&b).unwrap();
        let mut ba = b.clone();
        ba.merge(&a).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn merge_is_associative_in_state() {
        let mut a = Estimator::new(10).unwrap();
        let mut b = Estimator::new(10).unwrap();
        let mut c = Estimator::new(10).unwrap();
        for i in 0..30 {
            a.add_str(&format!("a{i}"));
        }
        for i in 0..30 {
            b.add_str(&format!("b{i}"));
        }
        for i in 0..30 {
            c.add_str(&format!("c{i}"));
        }

        let mut left = a.clone();
        left.merge(&b).unwrap();
        left.merge(&c).unwrap();

        let mut bc = b.clone();
        bc.merge(&c).unwrap();
        let mut right = a.clone();
        right.merge(&bc).unwrap();

        assert_eq!(left, right);
    }

    #[test]
    fn no_false_zeros() {
        let mut hll = Estimator::new(12).unwrap();
        hll.add(b"only-item");
        let hash = hash::murmur_hash64a(b"only-item", 0);
        let (index, _) = register::register_rule(hash, 12);
        let reg = match &hll {
            Estimator::Sparse(s) => s.get(index),
            Estimator::Dense(d) => d.get(index),
        };
        assert!(reg >= 1);
    }

    #[test]
    fn merge_dense_with_sparse_and_back() {
        let mut dense = Estimator::new(10).unwrap();
        for i in 0..2000 {
            dense.add_str(&format!("d{i}"));
        }
        assert_eq!(dense.mode(), Mode::Dense);

        let mut sparse = Estimator::new(10).unwrap();
        sparse.add_str("s0");
        sparse.add_str("s1");
        assert_eq!(sparse.mode(), Mode::Sparse);

        let mut d_then_s = dense.clone();
        d_then_s.merge(&sparse).unwrap();
        assert_eq!(d_then_s.mode(), Mode::Dense);

        let mut s_then_d = sparse.clone();
        s_then_d.merge(&dense).unwrap();
        assert_eq!(s_then_d.mode(), Mode::Dense);
    }

    #[test]
    fn s4_large_cardinality_accuracy() {
        use rand::{Rng, SeedableRng};
        use rand::rngs::StdRng;
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        let mut hll = Estimator::new(14).unwrap();
        let mut seen = std::collections::HashSet::new();
        while seen.len() < 50_000 {
            let v: u64 = rng.random();
            if seen.insert(v) {
                hll.add(&v.to_le_bytes());
            }
        }
        let e = hll.estimate();
        assert!((e - 50_000.0).abs() / 50_000.0 < 0.05, "estimate was {e}");
    }
}
