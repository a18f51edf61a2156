//! Address context shared by the GHC compressor and decompressor.
//!
//! RFC 7400 seeds the working buffer with the IPv6 source and destination
//! addresses of the enclosing header, taken from the already-decompressed
//! IPHC header.

use std::net::Ipv6Addr;

use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use crate::constants::GHC_ADDRESS_LEN;

/// Source and destination IPv6 addresses that seed the GHC working buffer.
#[serde_as]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressPair {
    /// Network-layer source address of the packet being (de)compressed.
    #[serde_as(as = "DisplayFromStr")]
    pub source: Ipv6Addr,
    /// Network-layer destination address of the packet being (de)compressed.
    #[serde_as(as = "DisplayFromStr")]
    pub destination: Ipv6Addr,
}

impl AddressPair {
    /// Creates a pair from parsed addresses.
    pub const fn new(source: Ipv6Addr, destination: Ipv6Addr) -> Self {
        Self {
            source,
            destination,
        }
    }

    /// Creates a pair from raw 16-byte address fields.
    pub fn from_octets(source: [u8; GHC_ADDRESS_LEN], destination: [u8; GHC_ADDRESS_LEN]) -> Self {
        Self {
            source: Ipv6Addr::from(source),
            destination: Ipv6Addr::from(destination),
        }
    }

    /// Source address as the 16 bytes seeded at offset 0.
    #[inline]
    pub const fn source_octets(&self) -> [u8; GHC_ADDRESS_LEN] {
        self.source.octets()
    }

    /// Destination address as the 16 bytes seeded at offset 16.
    #[inline]
    pub const fn destination_octets(&self) -> [u8; GHC_ADDRESS_LEN] {
        self.destination.octets()
    }
}

impl Default for AddressPair {
    fn default() -> Self {
        Self::new(Ipv6Addr::UNSPECIFIED, Ipv6Addr::UNSPECIFIED)
    }
}

impl From<(Ipv6Addr, Ipv6Addr)> for AddressPair {
    fn from((source, destination): (Ipv6Addr, Ipv6Addr)) -> Self {
        Self::new(source, destination)
    }
}
