// src/font/reader.rs

//! Big-endian primitive reads over an in-memory table.
//!
//! Offsets are absolute within the wrapped slice. A read that would run past
//! the end reports a `Malformed` error rather than panicking.

use crate::error::{FontError, Result};

#[derive(Debug, Clone, Copy)]
pub struct TableReader<'a> {
    data: &'a [u8],
}

impl<'a> TableReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn bytes(&self, offset: usize, len: usize) -> Result<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.data.get(offset..end))
            .ok_or_else(|| {
                FontError::malformed(format!(
                    "truncated read of {} bytes at offset {} (table is {} bytes)",
                    len,
                    offset,
                    self.data.len()
                ))
            })
    }

    fn array<const N: usize>(&self, offset: usize) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.bytes(offset, N)?);
        Ok(out)
    }

    pub fn u8(&self, offset: usize) -> Result<u8> {
        Ok(self.array::<1>(offset)?[0])
    }

    pub fn u16(&self, offset: usize) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array(offset)?))
    }

    pub fn i16(&self, offset: usize) -> Result<i16> {
        Ok(i16::from_be_bytes(self.array(offset)?))
    }

    pub fn u32(&self, offset: usize) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array(offset)?))
    }

    pub fn i32(&self, offset: usize) -> Result<i32> {
        Ok(i32::from_be_bytes(self.array(offset)?))
    }

    /// Four-byte table tag.
    pub fn tag(&self, offset: usize) -> Result<[u8; 4]> {
        self.array(offset)
    }
}
