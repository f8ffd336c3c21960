use crate::error::*;
use byteorder::{ByteOrder, LittleEndian};

/// Forward-only read cursor over an immutable buffer.
///
/// The cursor is `Copy`: callers that need all-or-nothing reads decode
/// through a copy and store it back only once the whole element parsed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ParseBuf<'a> {
    buf: &'a [u8],
    read_off: usize,
}

impl<'a> ParseBuf<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        ParseBuf { buf, read_off: 0 }
    }

    pub fn offset(&self) -> usize {
        self.read_off
    }

    pub fn left(&self) -> usize {
        self.buf.len() - self.read_off
    }

    pub fn is_empty(&self) -> bool {
        self.left() == 0
    }

    pub fn peek_u8(&self) -> Result<u8, Error> {
        self.buf
            .get(self.read_off)
            .copied()
            .ok_or(Error::TruncatedPacket)
    }

    /// Returns the next `len` bytes and advances past them.
    pub fn slice(&mut self, len: usize) -> Result<&'a [u8], Error> {
        if len > self.left() {
            return Err(Error::TruncatedPacket);
        }
        let data = &self.buf[self.read_off..self.read_off + len];
        self.read_off += len;
        Ok(data)
    }

    pub fn le_u8(&mut self) -> Result<u8, Error> {
        Ok(self.slice(1)?[0])
    }

    pub fn le_u16(&mut self) -> Result<u16, Error> {
        Ok(LittleEndian::read_u16(self.slice(2)?))
    }

    pub fn le_u32(&mut self) -> Result<u32, Error> {
        Ok(LittleEndian::read_u32(self.slice(4)?))
    }

    pub fn le_u64(&mut self) -> Result<u64, Error> {
        Ok(LittleEndian::read_u64(self.slice(8)?))
    }

    /// Reads a `size`-byte little-endian unsigned value, `size` in 1..=8.
    pub fn le_uint(&mut self, size: usize) -> Result<u64, Error> {
        Ok(LittleEndian::read_uint(self.slice(size)?, size))
    }

    /// Reads a `size`-byte little-endian two's complement value, `size` in 1..=8.
    pub fn le_int(&mut self, size: usize) -> Result<i64, Error> {
        Ok(LittleEndian::read_int(self.slice(size)?, size))
    }
}
