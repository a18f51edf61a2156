//! Integration tests for in-place packet (de)compression.
//!
//! Frames here mimic the 6LoWPAN layout GHC lives in: an NHC dispatch byte that
//! announces the compressed header, followed by the GHC stream and the payload.

mod common;

use bytes::BytesMut;
use common::{global_addresses, link_local_addresses, rpl_dio_message, udp_header};
use ghcstar::{
    DecodeStage, GhcCompressor, GhcConfig, GhcDecodeError, GhcDecompressor, GhcError,
    GhcNextHeader, SpliceError, compress_in_place, decompress_in_place,
};

fn stop_code_compressor() -> GhcCompressor {
    GhcCompressor::with_config(GhcConfig {
        emit_stop_code: true,
        ..Default::default()
    })
}

#[test]
fn udp_frame_survives_compress_and_decompress() {
    let addresses = link_local_addresses();
    let header = udp_header(0xF0B3, 0x1633, 12, 0xC0DE);
    let payload = b"temp";

    let mut frame = vec![GhcNextHeader::Udp.dispatch()];
    frame.extend_from_slice(&header);
    frame.extend_from_slice(payload);
    let original = frame.clone();

    let compressed_len =
        compress_in_place(&mut frame, 1, header.len(), &addresses, &stop_code_compressor())
            .unwrap();
    assert_eq!(frame.len(), original.len() - header.len() + compressed_len);
    assert_eq!(&frame[frame.len() - payload.len()..], payload);

    assert_eq!(GhcNextHeader::from_dispatch(frame[0]), Some(GhcNextHeader::Udp));
    let result =
        decompress_in_place(&mut frame, 1, None, &addresses, &GhcDecompressor::new()).unwrap();
    assert!(result.stop_code_seen);
    assert_eq!(frame, original);
}

#[test]
fn icmpv6_frame_in_bytes_mut() {
    let addresses = global_addresses();
    let header = rpl_dio_message(&addresses);

    let mut frame = BytesMut::new();
    frame.extend_from_slice(&[GhcNextHeader::Icmpv6.dispatch()]);
    frame.extend_from_slice(&header);
    let original = frame.clone();

    let compressed_len =
        compress_in_place(&mut frame, 1, header.len(), &addresses, &GhcCompressor::new())
            .unwrap();
    assert!(compressed_len < header.len());

    let result = decompress_in_place(
        &mut frame,
        1,
        Some(compressed_len),
        &addresses,
        &GhcDecompressor::new(),
    )
    .unwrap();
    assert!(!result.stop_code_seen);
    assert_eq!(frame, original);
}

#[test]
fn declared_region_longer_than_frame_is_truncated_input() {
    let mut frame = vec![0xD0, 0x02, 0xAA, 0xBB];
    let err = decompress_in_place(
        &mut frame,
        1,
        Some(10),
        &link_local_addresses(),
        &GhcDecompressor::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        GhcError::Decode(GhcDecodeError::TruncatedInput {
            needed: 10,
            got: 3,
            stage: DecodeStage::DeclaredRegion
        })
    );
    assert_eq!(frame, [0xD0, 0x02, 0xAA, 0xBB]);
}

#[test]
fn malformed_stream_leaves_frame_untouched() {
    let mut frame = vec![0xD0, 0x8F, 0x8F, 0x8F, 0x8F, 0x8F, 0x8F, 0x8F, 0x8F, 0x90];
    let before = frame.clone();
    let err = decompress_in_place(
        &mut frame,
        1,
        None,
        &link_local_addresses(),
        &GhcDecompressor::new(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        GhcError::Decode(GhcDecodeError::BufferOverflow { .. })
    ));
    assert_eq!(frame, before);
}

#[test]
fn header_region_outside_frame_is_rejected() {
    let mut frame = vec![0u8; 6];
    let err = compress_in_place(
        &mut frame,
        4,
        8,
        &global_addresses(),
        &GhcCompressor::new(),
    )
    .unwrap_err();
    assert_eq!(
        err,
        GhcError::Splice(SpliceError::RegionOutOfBounds {
            offset: 4,
            len: 8,
            packet_len: 6
        })
    );
}

#[test]
fn extension_header_dispatch_carries_eid() {
    let kind = GhcNextHeader::from_dispatch(0xB3).unwrap();
    assert_eq!(kind, GhcNextHeader::Extension { eid: 3 });
    assert_eq!(kind.dispatch(), 0xB3);
    assert_eq!(GhcNextHeader::from_dispatch(0xF0), None);
}
