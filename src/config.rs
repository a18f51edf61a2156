//! Codec options shared by the GHC compressor and decompressor.

use serde::{Deserialize, Serialize};

use crate::constants::{GHC_CONTEXT_LEN, GHC_MAX_PAYLOAD_LEN};

/// Configuration for [`GhcCompressor`](crate::GhcCompressor) and
/// [`GhcDecompressor`](crate::GhcDecompressor).
///
/// Missing fields take their defaults when deserialized, so a partial JSON
/// document such as `{"emit_stop_code": true}` is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GhcConfig {
    /// Largest header reconstructed or accepted for compression.
    /// Values above 127 are clamped to 127.
    pub max_payload_len: usize,
    /// Terminate compressed streams with the stop code.
    pub emit_stop_code: bool,
    /// Reject codebytes RFC 7400 leaves reserved instead of tolerating them.
    pub strict_codebytes: bool,
}

impl GhcConfig {
    /// Header limit after clamping to the working buffer's output area.
    #[inline]
    pub fn payload_limit(&self) -> usize {
        self.max_payload_len.min(GHC_MAX_PAYLOAD_LEN)
    }

    /// Working buffer capacity implied by [`payload_limit`](Self::payload_limit).
    #[inline]
    pub fn buffer_capacity(&self) -> usize {
        GHC_CONTEXT_LEN + self.payload_limit()
    }
}

impl Default for GhcConfig {
    fn default() -> Self {
        Self {
            max_payload_len: GHC_MAX_PAYLOAD_LEN,
            emit_stop_code: false,
            strict_codebytes: false,
        }
    }
}
