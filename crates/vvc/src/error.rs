//! VVC parser error type.

use std::io;

/// Result type.
pub type Result<T> = std::result::Result<T, VvcError>;

/// An error that aborts the parse of a single NAL unit.
#[derive(thiserror::Error, Debug)]
pub enum VvcError {
    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    /// A read requested more bits than the RBSP has left.
    #[error("bitstream exhausted while reading {field}: requested {requested} bits, {remaining} remaining")]
    BitstreamExhausted {
        /// The syntax element being read.
        field: &'static str,
        /// Number of bits requested.
        requested: usize,
        /// Number of bits left in the buffer.
        remaining: usize,
    },
    /// A syntax element is outside of its allowed range, or does not match its expected value.
    #[error("{field} is out of range [{min}, {max}]: {value}")]
    RangeViolation {
        /// The syntax element or derived variable.
        field: &'static str,
        /// The value that was decoded.
        value: i64,
        /// Lower bound (inclusive).
        min: i64,
        /// Upper bound (inclusive).
        max: i64,
    },
    /// A parameter set id was referenced before it was received.
    #[error("{kind} with id {id} not found")]
    ReferenceNotFound {
        /// The parameter set kind, e.g. `"SPS"` or `"ALF APS"`.
        kind: &'static str,
        /// The referenced id.
        id: u32,
    },
    /// A slice without an embedded picture header was received before any picture header.
    #[error("slice header requires a picture header but none was received")]
    MissingPictureHeader,
    /// A picture timing SEI message was received before any buffering period.
    #[error("picture timing SEI requires a buffering period but none was received")]
    MissingBufferingPeriod,
    /// Picture order count derivation requires the previous picture but there is none.
    #[error("previous picture not found while deriving the picture order count")]
    MissingPreviousPicture,
    /// `forbidden_zero_bit` was set.
    #[error("forbidden_zero_bit is not zero")]
    ForbiddenZeroBit,
    /// The RBSP did not end in a valid `rbsp_trailing_bits` pattern.
    #[error("invalid rbsp trailing bits")]
    TrailingBits,
    /// Alignment bits were expected to be zero.
    #[error("{0} must be zero")]
    NonZeroAlignment(&'static str),
}
