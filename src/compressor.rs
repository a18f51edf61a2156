//! GHC compression.
//!
//! A greedy LZ77 matcher over the same 48-byte seeded context the decompressor
//! uses. At every position the encoder considers a zero run and the longest
//! backreference into the context or already-encoded header bytes, takes whichever
//! saves more bytes, and falls back to a literal when neither saves anything.
//!
//! Backreferences never overlap the bytes they produce (`distance >= length`), which
//! is the only shape the `11nnnkkk` codebyte can express.

use bytes::BufMut;
use tracing::debug;

use crate::config::GhcConfig;
use crate::constants::{
    GHC_BACKREF_MIN_LEN, GHC_CONTEXT_LEN, GHC_EXTEND_DISTANCE_MASK, GHC_EXTEND_UNIT,
    GHC_LITERAL_MAX_LEN, GHC_ZERO_RUN_MAX_LEN, GHC_ZERO_RUN_MIN_LEN,
};
use crate::context::GhcWorkingBuffer;
use crate::error::GhcEncodeError;
use crate::instruction::GhcInstruction;
use crate::types::AddressPair;

/// Largest distance credited by one `ExtendArguments` codebyte, in 8-byte units.
const MAX_DISTANCE_UNITS_PER_EXTEND: usize = GHC_EXTEND_DISTANCE_MASK as usize;

/// An encoding choice at one header position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Candidate {
    ZeroRun { len: usize },
    Backreference { len: usize, distance: usize },
}

impl Candidate {
    fn len(self) -> usize {
        match self {
            Candidate::ZeroRun { len } | Candidate::Backreference { len, .. } => len,
        }
    }

    /// Compressed bytes needed to emit this candidate.
    fn cost(self) -> usize {
        match self {
            Candidate::ZeroRun { .. } => 1,
            Candidate::Backreference { len, distance } => 1 + extension_count(len, distance),
        }
    }

    fn savings(self) -> usize {
        self.len().saturating_sub(self.cost())
    }
}

/// `ExtendArguments` codebytes needed ahead of a backreference.
fn extension_count(len: usize, distance: usize) -> usize {
    let length_units = (len - GHC_BACKREF_MIN_LEN) / GHC_EXTEND_UNIT;
    let distance_units = (distance - len) / GHC_EXTEND_UNIT;
    length_units.max(distance_units.div_ceil(MAX_DISTANCE_UNITS_PER_EXTEND))
}

/// Stateless GHC compressor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GhcCompressor {
    config: GhcConfig,
}

impl GhcCompressor {
    /// Creates a compressor with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a compressor with a custom configuration.
    pub fn with_config(config: GhcConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &GhcConfig {
        &self.config
    }

    /// Compresses `header` against the context seeded from `addresses`.
    ///
    /// Decompressing the result with the same addresses reproduces `header`.
    ///
    /// # Errors
    /// - [`GhcEncodeError::PayloadTooLarge`] - Header exceeds the payload limit
    pub fn compress(
        &self,
        header: &[u8],
        addresses: &AddressPair,
    ) -> Result<Vec<u8>, GhcEncodeError> {
        let mut out = Vec::with_capacity(header.len() + 2);
        self.encode(header, addresses, &mut out)?;
        Ok(out)
    }

    /// Compresses `header` into `out`, returning the number of bytes written.
    ///
    /// # Errors
    /// - [`GhcEncodeError::PayloadTooLarge`] - Header exceeds the payload limit
    /// - [`GhcEncodeError::BufferTooSmall`] - `out` cannot hold the compressed stream
    pub fn compress_into(
        &self,
        header: &[u8],
        addresses: &AddressPair,
        out: &mut [u8],
    ) -> Result<usize, GhcEncodeError> {
        let compressed = self.compress(header, addresses)?;
        if compressed.len() > out.len() {
            return Err(GhcEncodeError::BufferTooSmall {
                needed: compressed.len(),
                available: out.len(),
            });
        }
        out[..compressed.len()].copy_from_slice(&compressed);
        Ok(compressed.len())
    }

    fn encode<B: BufMut>(
        &self,
        header: &[u8],
        addresses: &AddressPair,
        out: &mut B,
    ) -> Result<(), GhcEncodeError> {
        let max = self.config.payload_limit();
        if header.len() > max {
            return Err(GhcEncodeError::PayloadTooLarge {
                len: header.len(),
                max,
            });
        }

        let seeded = GhcWorkingBuffer::seeded(addresses);
        let mut history = Vec::with_capacity(GHC_CONTEXT_LEN + header.len());
        history.extend_from_slice(seeded.context());
        history.extend_from_slice(header);

        let mut written = 0usize;
        let mut literal_start = GHC_CONTEXT_LEN;
        let mut position = GHC_CONTEXT_LEN;

        while position < history.len() {
            let candidate = best_candidate(&history, position).filter(|c| c.savings() > 0);
            let Some(candidate) = candidate else {
                position += 1;
                if position - literal_start == GHC_LITERAL_MAX_LEN {
                    written += emit_literal(out, &history[literal_start..position]);
                    literal_start = position;
                }
                continue;
            };

            written += emit_literal(out, &history[literal_start..position]);
            written += emit_candidate(out, candidate);
            position += candidate.len();
            literal_start = position;
        }
        written += emit_literal(out, &history[literal_start..position]);

        if self.config.emit_stop_code {
            out.put_u8(GhcInstruction::Stop.to_codebyte());
            written += 1;
        }

        debug!(
            header_len = header.len(),
            compressed_len = written,
            "GHC header compressed"
        );
        Ok(())
    }
}

/// Compresses `header` with the default configuration.
///
/// # Errors
/// See [`GhcCompressor::compress`].
pub fn compress(header: &[u8], addresses: &AddressPair) -> Result<Vec<u8>, GhcEncodeError> {
    GhcCompressor::new().compress(header, addresses)
}

/// Picks the candidate with the largest savings at `position`.
///
/// Ties go to the zero run, then to the shortest distance.
fn best_candidate(history: &[u8], position: usize) -> Option<Candidate> {
    let ahead = &history[position..];

    let zeros = ahead
        .iter()
        .take(GHC_ZERO_RUN_MAX_LEN)
        .take_while(|&&byte| byte == 0)
        .count();
    let mut best = (zeros >= GHC_ZERO_RUN_MIN_LEN).then_some(Candidate::ZeroRun { len: zeros });

    for start in (0..position).rev() {
        let distance = position - start;
        let limit = distance.min(ahead.len());
        let len = history[start..start + limit]
            .iter()
            .zip(ahead)
            .take_while(|(a, b)| a == b)
            .count();
        if len < GHC_BACKREF_MIN_LEN {
            continue;
        }

        let candidate = Candidate::Backreference { len, distance };
        if best.is_none_or(|current| candidate.savings() > current.savings()) {
            best = Some(candidate);
        }
    }
    best
}

fn emit_literal<B: BufMut>(out: &mut B, bytes: &[u8]) -> usize {
    if bytes.is_empty() {
        return 0;
    }
    debug_assert!(bytes.len() <= GHC_LITERAL_MAX_LEN);
    out.put_u8(GhcInstruction::Literal { len: bytes.len() as u8 }.to_codebyte());
    out.put_slice(bytes);
    1 + bytes.len()
}

fn emit_candidate<B: BufMut>(out: &mut B, candidate: Candidate) -> usize {
    match candidate {
        Candidate::ZeroRun { len } => {
            out.put_u8(GhcInstruction::ZeroRun { len: len as u8 }.to_codebyte());
            1
        }
        Candidate::Backreference { len, distance } => {
            let length_units = (len - GHC_BACKREF_MIN_LEN) / GHC_EXTEND_UNIT;
            let length_bits = (len - GHC_BACKREF_MIN_LEN) % GHC_EXTEND_UNIT;
            let gap = distance - len;
            let mut distance_units = gap / GHC_EXTEND_UNIT;
            let distance_bits = gap % GHC_EXTEND_UNIT;

            let extensions = extension_count(len, distance);
            for index in 0..extensions {
                let units = distance_units.min(MAX_DISTANCE_UNITS_PER_EXTEND);
                distance_units -= units;
                out.put_u8(
                    GhcInstruction::ExtendArguments {
                        distance_units: units as u8,
                        extends_length: index < length_units,
                    }
                    .to_codebyte(),
                );
            }
            out.put_u8(
                GhcInstruction::Backreference {
                    length_bits: length_bits as u8,
                    distance_bits: distance_bits as u8,
                }
                .to_codebyte(),
            );
            extensions + 1
        }
    }
}
