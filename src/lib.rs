//! `ghcstar`: 6LoWPAN Generic Header Compression (RFC 7400) in Rust.
//!
//! GHC compresses the headers that follow an IPHC-compressed IPv6 header (UDP,
//! ICMPv6, IPv6 extension headers) with a small LZ77-style instruction set. Both
//! directions run against a 48-byte context built from the packet's IPv6 source
//! and destination addresses and a fixed 16-byte static dictionary, so headers that
//! repeat address bytes or common option patterns shrink to a few codebytes.
//!
//! ## Core Concepts
//!
//! - **[`GhcDecompressor`]**: Interprets a compressed stream and rebuilds the header.
//! - **[`GhcCompressor`]**: Greedy encoder producing streams the decompressor accepts.
//! - **[`AddressPair`]**: The per-packet address context both directions are seeded with.
//! - **[`GhcConfig`]**: Payload limit, stop-code emission and strict codebyte handling.
//! - **[`packet`]**: Helpers that (de)compress a header region inside a packet buffer
//!   through the [`HeaderSplice`] trait.
//!
//! ## Quick Start
//!
//! ```rust
//! use ghcstar::{AddressPair, GhcCompressor, GhcDecompressor};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let addresses = AddressPair::new("fe80::1".parse()?, "fe80::2".parse()?);
//!
//!     // An 8-byte UDP header: ports 61616 -> 61617, length 16, checksum 0x1234.
//!     let header = [0xF0, 0xB0, 0xF0, 0xB1, 0x00, 0x10, 0x12, 0x34];
//!
//!     let compressed = GhcCompressor::new().compress(&header, &addresses)?;
//!     println!("Compressed {} bytes to {}", header.len(), compressed.len());
//!
//!     let decompressed = GhcDecompressor::new().decompress(&compressed, &addresses)?;
//!     assert_eq!(&decompressed.header[..], &header[..]);
//!
//!     // The RFC 7400 example stream: a three-byte literal and the stop code.
//!     let abc = GhcDecompressor::new().decompress(&[0x03, 0x41, 0x42, 0x43, 0x90], &addresses)?;
//!     assert_eq!(&abc.header[..], b"ABC");
//!     assert!(abc.stop_code_seen);
//!
//!     Ok(())
//! }
//! ```

pub mod compressor;
pub mod config;
pub mod constants;
pub mod context;
pub mod decompressor;
pub mod discriminator;
pub mod error;
pub mod fuzz_harnesses;
pub mod instruction;
pub mod packet;
pub mod traits;
pub mod types;

#[cfg(test)]
mod tidy;

pub use compressor::{GhcCompressor, compress};
pub use config::GhcConfig;
pub use context::GhcWorkingBuffer;
pub use decompressor::{DecompressedHeader, GhcDecompressor, decompress};
pub use discriminator::GhcNextHeader;
pub use error::{DecodeStage, GhcDecodeError, GhcEncodeError, GhcError, SpliceError};
pub use instruction::GhcInstruction;
pub use packet::{compress_in_place, decompress_in_place};
pub use traits::HeaderSplice;
pub use types::AddressPair;
