//! GHC error types.
//!
//! Decoding, encoding and packet splicing each have their own error enum; `GhcError`
//! consolidates them for callers that drive the whole pipeline. Every error is a
//! per-packet failure: the caller drops the packet and decides whether to count it.

use std::fmt;

use thiserror::Error;

/// Decoding stage that ran out of input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecodeStage {
    /// Operand bytes of a literal-append instruction.
    LiteralOperand,
    /// A compressed region declared by the caller that extends past the packet.
    DeclaredRegion,
}

impl fmt::Display for DecodeStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LiteralOperand => write!(f, "literal operand"),
            Self::DeclaredRegion => write!(f, "declared compressed region"),
        }
    }
}

/// Errors raised while interpreting a GHC-compressed byte stream.
///
/// None of these leave partial output behind: the decompressor returns either the
/// complete reconstructed header or one of these variants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GhcDecodeError {
    /// The input ended while an instruction still expected bytes.
    #[error("Truncated GHC input: needed {needed} bytes, got {got} for {stage}")]
    TruncatedInput {
        needed: usize,
        got: usize,
        stage: DecodeStage,
    },

    /// A write or copy would run past the end of the working buffer.
    #[error(
        "GHC working buffer overflow: {requested} bytes at position {position} exceed capacity {capacity}"
    )]
    BufferOverflow {
        position: usize,
        requested: usize,
        capacity: usize,
    },

    /// A backreference points before the start of the working buffer.
    #[error("Invalid GHC backreference: distance {distance} from position {position}")]
    InvalidBackreference { position: usize, distance: usize },

    /// Codebyte reserved by RFC 7400 (a literal count above 95 or an unassigned
    /// `1001nnnn` pattern), rejected in strict mode.
    #[error("Reserved GHC codebyte 0x{codebyte:02X}")]
    ReservedCodebyte { codebyte: u8 },
}

/// Errors raised while producing a GHC-compressed byte stream.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GhcEncodeError {
    /// Header is longer than the decompressor can reconstruct.
    #[error("Header of {len} bytes exceeds GHC payload limit of {max}")]
    PayloadTooLarge { len: usize, max: usize },

    /// Caller-provided output buffer cannot hold the compressed stream.
    #[error("Buffer too small: needed {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Errors raised by a `HeaderSplice` implementation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpliceError {
    /// The region to replace does not lie within the packet.
    #[error("Splice region {offset}+{len} out of bounds for packet of {packet_len} bytes")]
    RegionOutOfBounds {
        offset: usize,
        len: usize,
        packet_len: usize,
    },
}

/// Main error type for GHC operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GhcError {
    /// Error during decompression.
    #[error("Decode error: {0}")]
    Decode(#[from] GhcDecodeError),

    /// Error during compression.
    #[error("Encode error: {0}")]
    Encode(#[from] GhcEncodeError),

    /// Error while writing a header back into a packet.
    #[error("Splice error: {0}")]
    Splice(#[from] SpliceError),
}
