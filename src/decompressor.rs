//! GHC decompression.
//!
//! Walks the compressed stream one instruction at a time, rebuilding the header in a
//! seeded [`GhcWorkingBuffer`]. Decoding stops at the stop code or when the input is
//! exhausted, whichever comes first.

use bytes::{Buf, Bytes};
use tracing::trace;

use crate::config::GhcConfig;
use crate::constants::{GHC_BACKREF_MIN_LEN, GHC_EXTEND_UNIT_SHIFT, GHC_LITERAL_MAX_LEN};
use crate::context::GhcWorkingBuffer;
use crate::error::{DecodeStage, GhcDecodeError};
use crate::instruction::GhcInstruction;
use crate::types::AddressPair;

/// Result of decompressing one GHC stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecompressedHeader {
    /// Reconstructed header bytes, context excluded.
    pub header: Bytes,
    /// Input bytes read, stop code included.
    pub consumed: usize,
    /// True when decoding ended on a stop code rather than end of input.
    pub stop_code_seen: bool,
}

/// Pending argument extensions for the next backreference (`sa` and `na`).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BackrefExtension {
    distance: usize,
    length: usize,
}

impl BackrefExtension {
    fn extend(&mut self, distance_units: u8, extends_length: bool) {
        self.distance = self
            .distance
            .saturating_add(usize::from(distance_units) << GHC_EXTEND_UNIT_SHIFT);
        if extends_length {
            self.length = self.length.saturating_add(1 << GHC_EXTEND_UNIT_SHIFT);
        }
    }

    /// Resolves a backreference's `(length, distance)` and clears the extensions.
    fn take(&mut self, length_bits: u8, distance_bits: u8) -> (usize, usize) {
        let length = self
            .length
            .saturating_add(usize::from(length_bits))
            .saturating_add(GHC_BACKREF_MIN_LEN);
        let distance = self
            .distance
            .saturating_add(usize::from(distance_bits))
            .saturating_add(length);
        *self = Self::default();
        (length, distance)
    }
}

/// Stateless GHC decompressor.
///
/// Each call builds its own working buffer, so one instance can be shared across
/// threads and packets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GhcDecompressor {
    config: GhcConfig,
}

impl GhcDecompressor {
    /// Creates a decompressor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a decompressor with a custom configuration.
    pub fn with_config(config: GhcConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &GhcConfig {
        &self.config
    }

    /// Decompresses a GHC stream seeded with `addresses`.
    ///
    /// Reads instructions until a stop code or the end of `compressed`. Bytes after
    /// the stop code are left unread and not counted in
    /// [`consumed`](DecompressedHeader::consumed).
    ///
    /// # Errors
    /// - [`GhcDecodeError::TruncatedInput`] - Literal operand runs past the end of input
    /// - [`GhcDecodeError::BufferOverflow`] - Output would exceed the payload limit
    /// - [`GhcDecodeError::InvalidBackreference`] - Backreference reaches before the buffer
    /// - [`GhcDecodeError::ReservedCodebyte`] - Reserved codebyte in strict mode
    pub fn decompress(
        &self,
        compressed: &[u8],
        addresses: &AddressPair,
    ) -> Result<DecompressedHeader, GhcDecodeError> {
        let mut buffer = GhcWorkingBuffer::with_capacity(addresses, self.config.buffer_capacity());
        let mut input = compressed;
        let mut extension = BackrefExtension::default();
        let mut stop_code_seen = false;

        while input.has_remaining() {
            let codebyte = input.get_u8();
            let instruction = GhcInstruction::from_codebyte(codebyte);
            trace!(
                codebyte,
                ?instruction,
                position = buffer.position(),
                "GHC instruction"
            );

            match instruction {
                GhcInstruction::Stop => {
                    stop_code_seen = true;
                    break;
                }
                GhcInstruction::Literal { len } => {
                    let len = usize::from(len);
                    if self.config.strict_codebytes && len > GHC_LITERAL_MAX_LEN {
                        return Err(GhcDecodeError::ReservedCodebyte { codebyte });
                    }
                    if input.remaining() < len {
                        return Err(GhcDecodeError::TruncatedInput {
                            needed: len,
                            got: input.remaining(),
                            stage: DecodeStage::LiteralOperand,
                        });
                    }
                    buffer.append_literal(&input[..len])?;
                    input.advance(len);
                }
                GhcInstruction::ZeroRun { len } => {
                    buffer.append_zeros(usize::from(len))?;
                }
                GhcInstruction::ExtendArguments {
                    distance_units,
                    extends_length,
                } => {
                    extension.extend(distance_units, extends_length);
                }
                GhcInstruction::Backreference {
                    length_bits,
                    distance_bits,
                } => {
                    let (length, distance) = extension.take(length_bits, distance_bits);
                    buffer.copy_back(distance, length)?;
                }
                GhcInstruction::Unassigned(codebyte) => {
                    if self.config.strict_codebytes {
                        return Err(GhcDecodeError::ReservedCodebyte { codebyte });
                    }
                }
            }
        }

        Ok(DecompressedHeader {
            header: Bytes::copy_from_slice(buffer.output()),
            consumed: compressed.len() - input.len(),
            stop_code_seen,
        })
    }
}

/// Decompresses `compressed` with the default configuration.
///
/// # Errors
/// See [`GhcDecompressor::decompress`].
pub fn decompress(
    compressed: &[u8],
    addresses: &AddressPair,
) -> Result<DecompressedHeader, GhcDecodeError> {
    GhcDecompressor::new().decompress(compressed, addresses)
}
