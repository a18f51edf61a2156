//! GHC instruction decode table.
//!
//! Every compressed byte stream is a sequence of instructions, each introduced by a
//! codebyte whose high bits select one of five forms (RFC 7400, Section 2):
//!
//! ```text
//! 10010000  stop code
//! 0kkkkkkk  append k literal bytes that follow
//! 1000nnnn  append nnnn + 2 zero bytes
//! 101nssss  sa += ssss << 3, na += n << 3
//! 11nnnkkk  backreference: n = na + nnn + 2, s = sa + kkk + n
//! ```
//!
//! The stop code is tested first and the remaining four prefixes are disjoint.
//! They leave `1001nnnn` other than the stop code without a meaning; those
//! codebytes classify as [`GhcInstruction::Unassigned`].

use serde::{Deserialize, Serialize};

use crate::constants::*;

/// A decoded GHC codebyte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhcInstruction {
    /// End of compressed data.
    Stop,
    /// Append the `len` bytes that follow the codebyte verbatim.
    Literal { len: u8 },
    /// Append `len` zero bytes (2..=17).
    ZeroRun { len: u8 },
    /// Widen the next backreference.
    /// `distance_units` adds `distance_units * 8` to `sa`; `extends_length` adds 8 to `na`.
    ExtendArguments {
        distance_units: u8,
        extends_length: bool,
    },
    /// Copy previously produced bytes. Carries the raw `nnn` and `kkk` fields.
    Backreference { length_bits: u8, distance_bits: u8 },
    /// A codebyte outside the five forms (`0x91..=0x9F`).
    Unassigned(u8),
}

impl GhcInstruction {
    /// Classifies a codebyte.
    ///
    /// # Parameters
    /// - `codebyte`: The leading byte of an instruction.
    ///
    /// # Returns
    /// The instruction form and its inline fields.
    pub const fn from_codebyte(codebyte: u8) -> Self {
        if codebyte == GHC_STOP_CODE {
            GhcInstruction::Stop
        } else if codebyte & GHC_LITERAL_PREFIX_MASK == GHC_LITERAL_PREFIX {
            GhcInstruction::Literal {
                len: codebyte & GHC_LITERAL_LEN_MASK,
            }
        } else if codebyte & GHC_ZERO_RUN_PREFIX_MASK == GHC_ZERO_RUN_PREFIX {
            GhcInstruction::ZeroRun {
                len: (codebyte & GHC_ZERO_RUN_LEN_MASK) + GHC_ZERO_RUN_MIN_LEN as u8,
            }
        } else if codebyte & GHC_EXTEND_PREFIX_MASK == GHC_EXTEND_PREFIX {
            GhcInstruction::ExtendArguments {
                distance_units: codebyte & GHC_EXTEND_DISTANCE_MASK,
                extends_length: codebyte & GHC_EXTEND_LENGTH_BIT != 0,
            }
        } else if codebyte & GHC_BACKREF_PREFIX_MASK == GHC_BACKREF_PREFIX {
            GhcInstruction::Backreference {
                length_bits: (codebyte & GHC_BACKREF_LENGTH_MASK) >> GHC_BACKREF_LENGTH_SHIFT,
                distance_bits: codebyte & GHC_BACKREF_DISTANCE_MASK,
            }
        } else {
            GhcInstruction::Unassigned(codebyte)
        }
    }

    /// Encodes the instruction as its codebyte.
    ///
    /// Fields are masked to their wire width; callers construct in-range values.
    pub const fn to_codebyte(self) -> u8 {
        match self {
            GhcInstruction::Stop => GHC_STOP_CODE,
            GhcInstruction::Literal { len } => GHC_LITERAL_PREFIX | (len & GHC_LITERAL_LEN_MASK),
            GhcInstruction::ZeroRun { len } => {
                GHC_ZERO_RUN_PREFIX
                    | (len.saturating_sub(GHC_ZERO_RUN_MIN_LEN as u8) & GHC_ZERO_RUN_LEN_MASK)
            }
            GhcInstruction::ExtendArguments {
                distance_units,
                extends_length,
            } => {
                let length_bit = if extends_length {
                    GHC_EXTEND_LENGTH_BIT
                } else {
                    0
                };
                GHC_EXTEND_PREFIX | length_bit | (distance_units & GHC_EXTEND_DISTANCE_MASK)
            }
            GhcInstruction::Backreference {
                length_bits,
                distance_bits,
            } => {
                GHC_BACKREF_PREFIX
                    | ((length_bits << GHC_BACKREF_LENGTH_SHIFT) & GHC_BACKREF_LENGTH_MASK)
                    | (distance_bits & GHC_BACKREF_DISTANCE_MASK)
            }
            GhcInstruction::Unassigned(codebyte) => codebyte,
        }
    }

    /// Operand bytes that follow the codebyte in the input stream.
    #[inline]
    pub const fn operand_len(self) -> usize {
        match self {
            GhcInstruction::Literal { len } => len as usize,
            _ => 0,
        }
    }
}

impl From<u8> for GhcInstruction {
    fn from(codebyte: u8) -> Self {
        Self::from_codebyte(codebyte)
    }
}

impl From<GhcInstruction> for u8 {
    fn from(instruction: GhcInstruction) -> Self {
        instruction.to_codebyte()
    }
}
