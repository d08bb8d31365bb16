//! The self-describing binary envelope and its Base64 wrapper.
//!
//! ```text
//! offset  size   field
//! 0       4      magic = ASCII "HLL1"
//! 4       1      b, in [4, 18]
//! 5       1      mode: 0 = Dense, 1 = Sparse
//! 6       4      payload_len, big-endian unsigned
//! 10      N      payload
//! ```

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::dense::DenseStore;
use crate::error::{HllError, MalformedReason, check_precision};
use crate::sparse::SparseStore;
use crate::{Estimator, RegisterStore};

const MAGIC: &[u8; 4] = b"HLL1";
const HEADER_LEN: usize = 10;

impl Estimator {
    /// Serializes to the canonical envelope: magic, precision, mode flag,
    /// big-endian payload length, then the store's own payload bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let (mode_flag, payload) = match self {
            Estimator::Dense(d) => (0u8, d.serialize()),
            Estimator::Sparse(s) => (1u8, s.serialize()),
        };

        let mut buf = Vec::with_capacity(HEADER_LEN + payload.len());
        buf.extend_from_slice(MAGIC);
        buf.push(self.precision() as u8);
        buf.push(mode_flag);
        buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        buf.extend_from_slice(&payload);
        buf
    }

    /// Parses an envelope produced by [`Estimator::to_bytes`]. Validates
    /// eagerly and never returns a partially constructed estimator.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, HllError> {
        if bytes.len() < HEADER_LEN {
            return Err(MalformedReason::TruncatedHeader.into());
        }
        if &bytes[0..4] != MAGIC {
            return Err(MalformedReason::BadMagic.into());
        }

        let b = bytes[4] as u32;
        check_precision(b)?;

        let mode_flag = bytes[5];
        if mode_flag != 0 && mode_flag != 1 {
            return Err(HllError::InvalidMode(mode_flag));
        }

        let declared_len = u32::from_be_bytes(bytes[6..10].try_into().unwrap());
        let payload = &bytes[HEADER_LEN..];
        if payload.len() as u32 != declared_len {
            return Err(MalformedReason::LengthMismatch {
                declared: declared_len,
                actual: payload.len() as u32,
            }
            .into());
        }

        match mode_flag {
            0 => Ok(Estimator::Dense(DenseStore::deserialize(payload, b)?)),
            1 => Ok(Estimator::Sparse(SparseStore::deserialize(payload, b)?)),
            _ => unreachable!("mode_flag validated above"),
        }
    }

    /// Standard, padded Base64 of [`Estimator::to_bytes`], no embedded
    /// newlines.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(self.to_bytes())
    }

    /// Inverse of [`Estimator::to_base64`]. Tolerates whitespace inserted
    /// anywhere in the input.
    pub fn from_base64(encoded: &str) -> Result<Self, HllError> {
        let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = STANDARD
            .decode(cleaned)
            .map_err(|_| HllError::Malformed(MalformedReason::InvalidBase64))?;
        Self::from_bytes(&bytes)
    }
}
