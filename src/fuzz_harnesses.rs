//! Fuzz testing harnesses for the GHC codec.
//!
//! Each harness takes an arbitrary byte slice, so it can be driven by a coverage
//! fuzzer, a property test or the simulator's fuzz mode alike. A harness panics only
//! when the codec violates one of its guarantees.

use crate::compressor::GhcCompressor;
use crate::constants::{GHC_ADDRESS_LEN, GHC_MAX_PAYLOAD_LEN};
use crate::decompressor::GhcDecompressor;
use crate::types::AddressPair;

/// Splits fuzz input into an address pair and the remaining bytes.
///
/// Inputs shorter than two addresses are zero-padded.
fn split_addresses(data: &[u8]) -> (AddressPair, &[u8]) {
    let mut octets = [0u8; 2 * GHC_ADDRESS_LEN];
    let seed_len = data.len().min(octets.len());
    octets[..seed_len].copy_from_slice(&data[..seed_len]);

    let mut source = [0u8; GHC_ADDRESS_LEN];
    let mut destination = [0u8; GHC_ADDRESS_LEN];
    source.copy_from_slice(&octets[..GHC_ADDRESS_LEN]);
    destination.copy_from_slice(&octets[GHC_ADDRESS_LEN..]);
    (
        AddressPair::from_octets(source, destination),
        &data[seed_len..],
    )
}

/// Fuzz tests the decompressor.
///
/// The first 32 bytes of `data` seed the addresses; the rest is decoded as a GHC
/// stream. Any result is acceptable, but a successful decode must stay within the
/// payload limit and report a consumed count no larger than its input.
///
/// # Parameters
/// - `data`: Fuzzer-generated input
pub fn ghc_decompressor_harness(data: &[u8]) {
    let (addresses, compressed) = split_addresses(data);
    if let Ok(result) = GhcDecompressor::new().decompress(compressed, &addresses) {
        assert!(result.header.len() <= GHC_MAX_PAYLOAD_LEN);
        assert!(result.consumed <= compressed.len());
    }
}

/// Fuzz tests compression followed by decompression.
///
/// The first 32 bytes of `data` seed the addresses; up to 127 following bytes are
/// compressed and must decompress back to themselves.
///
/// # Parameters
/// - `data`: Fuzzer-generated input
pub fn ghc_roundtrip_harness(data: &[u8]) {
    let (addresses, rest) = split_addresses(data);
    let header = &rest[..rest.len().min(GHC_MAX_PAYLOAD_LEN)];

    let compressed = match GhcCompressor::new().compress(header, &addresses) {
        Ok(compressed) => compressed,
        Err(e) => panic!("header of {} bytes failed to compress: {e}", header.len()),
    };
    match GhcDecompressor::new().decompress(&compressed, &addresses) {
        Ok(result) => assert_eq!(&result.header[..], header, "round trip mismatch"),
        Err(e) => panic!("compressed stream {compressed:02X?} failed to decode: {e}"),
    }
}
