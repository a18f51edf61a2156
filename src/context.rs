//! The seeded GHC working buffer.
//!
//! Decompression runs against a fixed buffer whose first 48 bytes are the
//! source address, destination address and static dictionary. Reconstructed
//! header bytes are appended after that context, and backreferences may reach
//! into any byte already in the buffer, context included.
//!
//! Every write is checked against the buffer's capacity before it happens.
//! A rejected write leaves the buffer untouched.

use crate::constants::{
    GHC_ADDRESS_LEN, GHC_CONTEXT_LEN, GHC_DESTINATION_ADDRESS_OFFSET, GHC_SOURCE_ADDRESS_OFFSET,
    GHC_STATIC_DICTIONARY, GHC_STATIC_DICTIONARY_OFFSET, GHC_WORKING_BUFFER_CAPACITY,
};
use crate::error::GhcDecodeError;
use crate::types::AddressPair;

/// Seeded working buffer for one compression or decompression call.
///
/// `position` is the index of the next byte to write. It starts at 48, one past
/// the last context byte, and only moves forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GhcWorkingBuffer {
    bytes: [u8; GHC_WORKING_BUFFER_CAPACITY],
    position: usize,
    capacity: usize,
}

impl GhcWorkingBuffer {
    /// Creates a buffer seeded with `addresses` and the static dictionary, with the
    /// full 127 bytes of output space.
    pub fn seeded(addresses: &AddressPair) -> Self {
        Self::with_capacity(addresses, GHC_WORKING_BUFFER_CAPACITY)
    }

    /// Creates a seeded buffer whose usable capacity is limited to `capacity` bytes
    /// (context included). Values outside `48..=175` are clamped.
    pub fn with_capacity(addresses: &AddressPair, capacity: usize) -> Self {
        let mut bytes = [0u8; GHC_WORKING_BUFFER_CAPACITY];
        bytes[GHC_SOURCE_ADDRESS_OFFSET..GHC_SOURCE_ADDRESS_OFFSET + GHC_ADDRESS_LEN]
            .copy_from_slice(&addresses.source_octets());
        bytes[GHC_DESTINATION_ADDRESS_OFFSET..GHC_DESTINATION_ADDRESS_OFFSET + GHC_ADDRESS_LEN]
            .copy_from_slice(&addresses.destination_octets());
        bytes[GHC_STATIC_DICTIONARY_OFFSET..GHC_CONTEXT_LEN]
            .copy_from_slice(&GHC_STATIC_DICTIONARY);

        Self {
            bytes,
            position: GHC_CONTEXT_LEN,
            capacity: capacity.clamp(GHC_CONTEXT_LEN, GHC_WORKING_BUFFER_CAPACITY),
        }
    }

    /// Index of the next byte to be written.
    #[inline]
    pub fn position(&self) -> usize {
        self.position
    }

    /// Usable capacity, context included.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes that can still be appended.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.position
    }

    /// The 48 seeded context bytes.
    #[inline]
    pub fn context(&self) -> &[u8] {
        &self.bytes[..GHC_CONTEXT_LEN]
    }

    /// Context plus everything written so far.
    #[inline]
    pub fn history(&self) -> &[u8] {
        &self.bytes[..self.position]
    }

    /// The reconstructed header: everything written after the context.
    #[inline]
    pub fn output(&self) -> &[u8] {
        &self.bytes[GHC_CONTEXT_LEN..self.position]
    }

    /// Appends `data` verbatim.
    ///
    /// # Errors
    /// - [`GhcDecodeError::BufferOverflow`] - `data` does not fit in the remaining space
    pub fn append_literal(&mut self, data: &[u8]) -> Result<(), GhcDecodeError> {
        let end = self.reserve(data.len())?;
        self.bytes[self.position..end].copy_from_slice(data);
        self.position = end;
        Ok(())
    }

    /// Appends `count` zero bytes.
    ///
    /// # Errors
    /// - [`GhcDecodeError::BufferOverflow`] - `count` bytes do not fit in the remaining space
    pub fn append_zeros(&mut self, count: usize) -> Result<(), GhcDecodeError> {
        let end = self.reserve(count)?;
        self.bytes[self.position..end].fill(0);
        self.position = end;
        Ok(())
    }

    /// Appends `length` bytes copied from `distance` bytes before the current position.
    ///
    /// The copy runs one byte at a time in forward order, so a `distance` shorter than
    /// `length` re-reads bytes written by this same call and repeats the pattern
    /// (`distance = 1` replicates the last byte).
    ///
    /// # Errors
    /// - [`GhcDecodeError::BufferOverflow`] - `length` bytes do not fit in the remaining space
    /// - [`GhcDecodeError::InvalidBackreference`] - `distance` is zero or reaches before index 0
    pub fn copy_back(&mut self, distance: usize, length: usize) -> Result<(), GhcDecodeError> {
        let end = self.reserve(length)?;
        if distance == 0 || distance > self.position {
            return Err(GhcDecodeError::InvalidBackreference {
                position: self.position,
                distance,
            });
        }

        for index in self.position..end {
            self.bytes[index] = self.bytes[index - distance];
        }
        self.position = end;
        Ok(())
    }

    /// Checks that `count` more bytes fit and returns the end index of the write.
    fn reserve(&self, count: usize) -> Result<usize, GhcDecodeError> {
        match self.position.checked_add(count) {
            Some(end) if end <= self.capacity => Ok(end),
            _ => Err(GhcDecodeError::BufferOverflow {
                position: self.position,
                requested: count,
                capacity: self.capacity,
            }),
        }
    }
}
