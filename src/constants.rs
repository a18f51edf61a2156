//! GHC (RFC 7400 Generic Header Compression) wire constants and bitmasks.
//!
//! Defines the stop code, the static dictionary, the layout of the seeded
//! working buffer, the codebyte patterns of the five instruction forms and the
//! LOWPAN_NHC dispatch values assigned to GHC-compressed next headers.

// --- Working Buffer Layout (RFC 7400, Section 2) ---

/// Length of an IPv6 address seeded into the working buffer.
pub const GHC_ADDRESS_LEN: usize = 16;
/// Offset of the source address within the working buffer.
pub const GHC_SOURCE_ADDRESS_OFFSET: usize = 0;
/// Offset of the destination address within the working buffer.
pub const GHC_DESTINATION_ADDRESS_OFFSET: usize = GHC_SOURCE_ADDRESS_OFFSET + GHC_ADDRESS_LEN;
/// Offset of the static dictionary within the working buffer.
pub const GHC_STATIC_DICTIONARY_OFFSET: usize = GHC_DESTINATION_ADDRESS_OFFSET + GHC_ADDRESS_LEN;
/// Bytes of pre-seeded context (two addresses plus the static dictionary).
pub const GHC_CONTEXT_LEN: usize = GHC_STATIC_DICTIONARY_OFFSET + GHC_STATIC_DICTIONARY.len();
/// Largest header the decompressor reconstructs.
pub const GHC_MAX_PAYLOAD_LEN: usize = 127;
/// Total working buffer capacity: seeded context followed by reconstructed output.
pub const GHC_WORKING_BUFFER_CAPACITY: usize = GHC_CONTEXT_LEN + GHC_MAX_PAYLOAD_LEN;

/// Static dictionary appended after the addresses (RFC 7400, Section 2, page 5).
pub const GHC_STATIC_DICTIONARY: [u8; 16] = [
    0x16, 0xfe, 0xfd, 0x17, 0xfe, 0xfd, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00,
];

// --- Codebytes (RFC 7400, Section 2, Figure 1) ---

/// `10010000`: end of compressed data.
pub const GHC_STOP_CODE: u8 = 0b1001_0000; // 0x90

/// Mask selecting the top bit of a literal codebyte (`0kkkkkkk`).
pub const GHC_LITERAL_PREFIX_MASK: u8 = 0b1000_0000;
/// Expected prefix of a literal codebyte.
pub const GHC_LITERAL_PREFIX: u8 = 0b0000_0000;
/// Mask extracting the literal byte count `k`.
pub const GHC_LITERAL_LEN_MASK: u8 = 0b0111_1111;
/// Largest literal count permitted by RFC 7400 (`k < 96`).
pub const GHC_LITERAL_MAX_LEN: usize = 95;

/// Mask selecting the top nibble of a zero-run codebyte (`1000nnnn`).
pub const GHC_ZERO_RUN_PREFIX_MASK: u8 = 0b1111_0000;
/// Expected prefix of a zero-run codebyte.
pub const GHC_ZERO_RUN_PREFIX: u8 = 0b1000_0000;
/// Mask extracting `nnnn` from a zero-run codebyte.
pub const GHC_ZERO_RUN_LEN_MASK: u8 = 0b0000_1111;
/// Zeros appended for `nnnn = 0`.
pub const GHC_ZERO_RUN_MIN_LEN: usize = 2;
/// Zeros appended for `nnnn = 15`.
pub const GHC_ZERO_RUN_MAX_LEN: usize = GHC_ZERO_RUN_MIN_LEN + GHC_ZERO_RUN_LEN_MASK as usize;

/// Mask selecting the top three bits of an extend-arguments codebyte (`101nssss`).
pub const GHC_EXTEND_PREFIX_MASK: u8 = 0b1110_0000;
/// Expected prefix of an extend-arguments codebyte.
pub const GHC_EXTEND_PREFIX: u8 = 0b1010_0000;
/// Mask extracting `ssss` (distance extension in units of 8).
pub const GHC_EXTEND_DISTANCE_MASK: u8 = 0b0000_1111;
/// Bit `n` (length extension of one unit of 8).
pub const GHC_EXTEND_LENGTH_BIT: u8 = 0b0001_0000;
/// Shift applied to both extension fields (`sa += ssss << 3`, `na += n << 3`).
pub const GHC_EXTEND_UNIT_SHIFT: u32 = 3;
/// Value of one extension unit.
pub const GHC_EXTEND_UNIT: usize = 1 << GHC_EXTEND_UNIT_SHIFT;

/// Mask selecting the top two bits of a backreference codebyte (`11nnnkkk`).
pub const GHC_BACKREF_PREFIX_MASK: u8 = 0b1100_0000;
/// Expected prefix of a backreference codebyte.
pub const GHC_BACKREF_PREFIX: u8 = 0b1100_0000;
/// Mask extracting `nnn` (before shifting).
pub const GHC_BACKREF_LENGTH_MASK: u8 = 0b0011_1000;
/// Shift applied to `nnn`.
pub const GHC_BACKREF_LENGTH_SHIFT: u32 = 3;
/// Mask extracting `kkk`.
pub const GHC_BACKREF_DISTANCE_MASK: u8 = 0b0000_0111;
/// Bytes copied by a backreference with `na = 0` and `nnn = 0`.
pub const GHC_BACKREF_MIN_LEN: usize = 2;

// --- LOWPAN_NHC Dispatch (RFC 7400, Section 3) ---

/// LOWPAN_NHC ID for a GHC-compressed UDP header.
pub const GHC_NHC_UDP_DISPATCH: u8 = 0b1101_0000; // 0xD0
/// LOWPAN_NHC ID for a GHC-compressed ICMPv6 header.
pub const GHC_NHC_ICMPV6_DISPATCH: u8 = 0b1101_1111; // 0xDF
/// Mask selecting the prefix of a GHC extension header NHC ID (`10110eee`).
pub const GHC_NHC_EXTENSION_PREFIX_MASK: u8 = 0b1111_1000;
/// Expected prefix of a GHC extension header NHC ID.
pub const GHC_NHC_EXTENSION_PREFIX: u8 = 0b1011_0000; // 0xB0
/// Mask extracting the extension header identifier (EID).
pub const GHC_NHC_EXTENSION_EID_MASK: u8 = 0b0000_0111;
