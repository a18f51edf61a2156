//! Packet buffer abstraction for in-place header (de)compression.
//!
//! GHC rewrites a region in the middle of a frame: the compressed bytes are replaced
//! by the reconstructed header (or the reverse), and everything after the region
//! shifts to make room. [`HeaderSplice`] is the one operation the packet helpers in
//! [`crate::packet`] need from a buffer to do that.

use std::fmt::Debug;

use bytes::{BufMut, BytesMut};

use crate::error::SpliceError;

/// A growable packet buffer whose bytes can be replaced in place.
pub trait HeaderSplice: AsRef<[u8]> + Debug {
    /// Replaces `old_len` bytes starting at `offset` with `new_bytes`.
    ///
    /// Bytes after the replaced region are kept and shifted by
    /// `new_bytes.len() - old_len`. On error the buffer is unchanged.
    ///
    /// # Errors
    /// - [`SpliceError::RegionOutOfBounds`] - `offset + old_len` exceeds the buffer length
    fn replace_header(
        &mut self,
        offset: usize,
        old_len: usize,
        new_bytes: &[u8],
    ) -> Result<(), SpliceError>;
}

fn check_region(offset: usize, len: usize, packet_len: usize) -> Result<usize, SpliceError> {
    match offset.checked_add(len) {
        Some(end) if end <= packet_len => Ok(end),
        _ => Err(SpliceError::RegionOutOfBounds {
            offset,
            len,
            packet_len,
        }),
    }
}

impl HeaderSplice for Vec<u8> {
    fn replace_header(
        &mut self,
        offset: usize,
        old_len: usize,
        new_bytes: &[u8],
    ) -> Result<(), SpliceError> {
        let end = check_region(offset, old_len, self.len())?;
        self.splice(offset..end, new_bytes.iter().copied());
        Ok(())
    }
}

impl HeaderSplice for BytesMut {
    fn replace_header(
        &mut self,
        offset: usize,
        old_len: usize,
        new_bytes: &[u8],
    ) -> Result<(), SpliceError> {
        let end = check_region(offset, old_len, self.len())?;
        let tail = self.split_off(end);
        self.truncate(offset);
        self.reserve(new_bytes.len() + tail.len());
        self.put_slice(new_bytes);
        self.unsplit(tail);
        Ok(())
    }
}
