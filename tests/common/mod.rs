//! Common test utilities for GHC integration tests.
//!
//! Provides the address contexts and realistic 6LoWPAN next headers shared by the
//! compression, decompression and packet splicing suites.

#![allow(dead_code)] // Not every suite uses every helper.

use ghcstar::{AddressPair, GhcCompressor, GhcDecompressor};

/// Link-local addresses derived from IEEE 802.15.4 extended addresses, as a
/// typical 6LoWPAN mesh would use.
pub fn link_local_addresses() -> AddressPair {
    AddressPair::new(
        "fe80::212:4b00:60d:9ab1".parse().unwrap(),
        "fe80::212:4b00:60d:9ab2".parse().unwrap(),
    )
}

/// Global addresses under the documentation prefix.
pub fn global_addresses() -> AddressPair {
    AddressPair::new(
        "2001:db8::ff:fe00:face".parse().unwrap(),
        "2001:db8::ff:fe00:beef".parse().unwrap(),
    )
}

/// Builds an 8-byte UDP header.
pub fn udp_header(source_port: u16, destination_port: u16, length: u16, checksum: u16) -> Vec<u8> {
    let mut header = Vec::with_capacity(8);
    header.extend_from_slice(&source_port.to_be_bytes());
    header.extend_from_slice(&destination_port.to_be_bytes());
    header.extend_from_slice(&length.to_be_bytes());
    header.extend_from_slice(&checksum.to_be_bytes());
    header
}

/// ICMPv6 echo request header with a short payload.
pub fn icmpv6_echo_request(identifier: u16, sequence: u16) -> Vec<u8> {
    let mut header = vec![
        0x80, // Type = Echo Request
        0x00, // Code
        0x5A, 0x1C, // Checksum
    ];
    header.extend_from_slice(&identifier.to_be_bytes());
    header.extend_from_slice(&sequence.to_be_bytes());
    header.extend_from_slice(&[0u8; 16]);
    header
}

/// RPL DIO message carrying a DODAG configuration option and a prefix information
/// option that repeats the DODAG ID prefix.
pub fn rpl_dio_message(addresses: &AddressPair) -> Vec<u8> {
    let dodag_id = addresses.source_octets();
    let mut message = vec![
        0x9B, 0x01, 0x7A, 0x5F, // ICMPv6 RPL, DIO, checksum
        0x00, 0xF0, 0x01, 0x00, // Instance, version, rank
        0x88, 0x00, 0x00, 0x00, // G/MOP/Prf, DTSN, flags, reserved
    ];
    message.extend_from_slice(&dodag_id);
    // DODAG configuration option.
    message.extend_from_slice(&[
        0x04, 0x0E, 0x00, 0x14, 0x09, 0xFF, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x00, 0x00,
    ]);
    // Prefix information option.
    message.extend_from_slice(&[
        0x08, 0x1E, 0x40, 0x20, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00,
        0x00, 0x00,
    ]);
    message.extend_from_slice(&dodag_id);
    message
}

/// IPv6 hop-by-hop extension header carrying an RPL option (RFC 6553).
pub fn rpl_hop_by_hop_header() -> Vec<u8> {
    vec![0x3A, 0x00, 0x63, 0x04, 0x00, 0x1E, 0x08, 0x00]
}

/// Compresses with the default compressor and checks that the default decompressor
/// restores `header`. Returns the compressed stream.
pub fn assert_round_trip(header: &[u8], addresses: &AddressPair) -> Vec<u8> {
    let compressed = GhcCompressor::new()
        .compress(header, addresses)
        .expect("compression failed");
    let decompressed = GhcDecompressor::new()
        .decompress(&compressed, addresses)
        .expect("decompression failed");
    assert_eq!(
        &decompressed.header[..],
        header,
        "round trip mismatch for stream {:02X?}",
        compressed
    );
    assert_eq!(decompressed.consumed, compressed.len());
    compressed
}
