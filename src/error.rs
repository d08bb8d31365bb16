use thiserror::Error;

const MIN_PRECISION: u32 = 4;
const MAX_PRECISION: u32 = 18;

/// Reasons a deserialized envelope or sparse/dense payload can be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("bad magic bytes")]
    BadMagic,
    #[error("blob truncated before header was complete")]
    TruncatedHeader,
    #[error("declared payload length {declared} does not match actual length {actual}")]
    LengthMismatch { declared: u32, actual: u32 },
    #[error("sparse payload length does not divide evenly into {entry_bits}-bit entries")]
    UnalignedSparsePayload { entry_bits: u32 },
    #[error("dense payload is {actual} bytes, expected {expected}")]
    WrongDenseLength { actual: usize, expected: usize },
    #[error("register value {0} exceeds the maximum of 63")]
    RegisterOutOfRange(u8),
    #[error("duplicate sparse index {0}")]
    DuplicateIndex(u32),
    #[error("sparse index {index} is not less than m = {m}")]
    IndexOutOfRange { index: u32, m: u32 },

    #[error("invalid base64 encoding")]
    InvalidBase64,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HllError {
    #[error("precision {0} outside the supported range [{MIN_PRECISION}, {MAX_PRECISION}]")]
    InvalidPrecision(u32),

    #[error("mode flag {0} is neither 0 (dense) nor 1 (sparse)")]
    InvalidMode(u8),

    #[error("malformed envelope: {0}")]
    Malformed(#[from] MalformedReason),

    #[error("cannot merge estimators of precision {lhs} and {rhs}")]
    IncompatiblePrecision { lhs: u32, rhs: u32 },

    #[error("item could not be converted to canonical bytes: {0}")]
    InvalidItem(String),
}

pub(crate) fn check_precision(b: u32) -> Result<(), HllError> {
    if (MIN_PRECISION..=MAX_PRECISION).contains(&b) {
        Ok(())
    } else {
        Err(HllError::InvalidPrecision(b))
    }
}
