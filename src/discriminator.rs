//! GHC next-header dispatch values (RFC 7400, Section 3.2).
//!
//! Inside a 6LoWPAN IPHC packet, a GHC-compressed next header is announced by an NHC
//! dispatch byte in place of the uncompressed header. Three kinds are defined:
//!
//! ```text
//! 11010000  UDP header follows, GHC-compressed
//! 10110eee  IPv6 extension header with EID eee follows, GHC-compressed
//! 11011111  ICMPv6 header follows, GHC-compressed
//! ```

use serde::{Deserialize, Serialize};

use crate::constants::{
    GHC_NHC_EXTENSION_EID_MASK, GHC_NHC_EXTENSION_PREFIX, GHC_NHC_EXTENSION_PREFIX_MASK,
    GHC_NHC_ICMPV6_DISPATCH, GHC_NHC_UDP_DISPATCH,
};

/// The header kind a GHC NHC dispatch byte announces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GhcNextHeader {
    /// GHC-compressed UDP header.
    Udp,
    /// GHC-compressed ICMPv6 header.
    Icmpv6,
    /// GHC-compressed IPv6 extension header; `eid` is the 3-bit extension header ID.
    Extension { eid: u8 },
}

impl GhcNextHeader {
    /// Classifies an NHC dispatch byte. Returns `None` for dispatches that are not GHC.
    pub fn from_dispatch(byte: u8) -> Option<Self> {
        if byte == GHC_NHC_UDP_DISPATCH {
            Some(GhcNextHeader::Udp)
        } else if byte == GHC_NHC_ICMPV6_DISPATCH {
            Some(GhcNextHeader::Icmpv6)
        } else if byte & GHC_NHC_EXTENSION_PREFIX_MASK == GHC_NHC_EXTENSION_PREFIX {
            Some(GhcNextHeader::Extension {
                eid: byte & GHC_NHC_EXTENSION_EID_MASK,
            })
        } else {
            None
        }
    }

    /// The dispatch byte announcing this header kind.
    pub fn dispatch(self) -> u8 {
        match self {
            GhcNextHeader::Udp => GHC_NHC_UDP_DISPATCH,
            GhcNextHeader::Icmpv6 => GHC_NHC_ICMPV6_DISPATCH,
            GhcNextHeader::Extension { eid } => {
                GHC_NHC_EXTENSION_PREFIX | (eid & GHC_NHC_EXTENSION_EID_MASK)
            }
        }
    }
}
