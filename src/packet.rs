//! In-place GHC processing of whole packets.
//!
//! These helpers locate the compressed (or uncompressed) header region inside a
//! packet buffer, run the codec over it and splice the result back, shifting the
//! rest of the packet.

use tracing::debug;

use crate::compressor::GhcCompressor;
use crate::decompressor::{DecompressedHeader, GhcDecompressor};
use crate::error::{DecodeStage, GhcDecodeError, GhcError, SpliceError};
use crate::traits::HeaderSplice;
use crate::types::AddressPair;

/// Decompresses the GHC region starting at `offset` and splices the header into
/// `packet` in its place.
///
/// With `region_len` set, exactly that many bytes are treated as compressed data
/// and replaced. Without it, decoding runs until the stop code (or the end of the
/// packet) and only the bytes read are replaced.
///
/// # Errors
/// - [`GhcError::Splice`] - `offset` lies past the end of the packet
/// - [`GhcError::Decode`] - `region_len` exceeds the packet, or the region fails to decode
pub fn decompress_in_place<P: HeaderSplice>(
    packet: &mut P,
    offset: usize,
    region_len: Option<usize>,
    addresses: &AddressPair,
    decompressor: &GhcDecompressor,
) -> Result<DecompressedHeader, GhcError> {
    let packet_len = packet.as_ref().len();
    if offset > packet_len {
        return Err(SpliceError::RegionOutOfBounds {
            offset,
            len: region_len.unwrap_or(0),
            packet_len,
        }
        .into());
    }

    let available = packet_len - offset;
    let region_end = match region_len {
        Some(len) if len > available => {
            return Err(GhcDecodeError::TruncatedInput {
                needed: len,
                got: available,
                stage: DecodeStage::DeclaredRegion,
            }
            .into());
        }
        Some(len) => offset + len,
        None => packet_len,
    };

    let result = decompressor.decompress(&packet.as_ref()[offset..region_end], addresses)?;
    let replaced = region_len.unwrap_or(result.consumed);
    packet.replace_header(offset, replaced, &result.header)?;

    debug!(
        offset,
        compressed_len = replaced,
        header_len = result.header.len(),
        "GHC header decompressed in place"
    );
    Ok(result)
}

/// Compresses the `header_len` bytes at `offset` and splices the compressed stream
/// into `packet` in their place. Returns the compressed length.
///
/// # Errors
/// - [`GhcError::Splice`] - The header region does not lie within the packet
/// - [`GhcError::Encode`] - The header exceeds the compressor's payload limit
pub fn compress_in_place<P: HeaderSplice>(
    packet: &mut P,
    offset: usize,
    header_len: usize,
    addresses: &AddressPair,
    compressor: &GhcCompressor,
) -> Result<usize, GhcError> {
    let packet_len = packet.as_ref().len();
    let end = offset
        .checked_add(header_len)
        .filter(|&end| end <= packet_len)
        .ok_or(SpliceError::RegionOutOfBounds {
            offset,
            len: header_len,
            packet_len,
        })?;

    let compressed = compressor.compress(&packet.as_ref()[offset..end], addresses)?;
    packet.replace_header(offset, header_len, &compressed)?;
    Ok(compressed.len())
}
