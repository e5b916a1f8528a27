//! Bounds-checked sequential reader over SMF bytes

use crate::error::{DecodeError, DecodeResult};

/// Sequential big-endian reader over an immutable byte buffer
///
/// `origin` is the absolute offset of `data[0]` in the file, so a cursor over a
/// track payload still reports file offsets in its errors.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    pos: usize,
    origin: usize,
}

impl<'a> ByteCursor<'a> {
    /// Create a cursor over a whole file
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_origin(data, 0)
    }

    /// Create a cursor over a slice that starts at `origin` in the file
    pub fn with_origin(data: &'a [u8], origin: usize) -> Self {
        Self {
            data,
            pos: 0,
            origin,
        }
    }

    /// Absolute offset of the next byte to be read
    pub fn position(&self) -> usize {
        self.origin + self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_eof(&self) -> bool {
        self.pos >= self.data.len()
    }

    fn ensure(&self, needed: usize) -> DecodeResult<()> {
        if needed > self.remaining() {
            return Err(DecodeError::Truncated {
                position: self.position(),
                needed,
                remaining: self.remaining(),
            });
        }
        Ok(())
    }

    /// Look at the next byte without advancing
    pub fn peek_u8(&self) -> DecodeResult<u8> {
        self.ensure(1)?;
        Ok(self.data[self.pos])
    }

    pub fn read_u8(&mut self) -> DecodeResult<u8> {
        let b = self.peek_u8()?;
        self.pos += 1;
        Ok(b)
    }

    /// Read the next `len` bytes as a borrowed slice
    pub fn read_bytes(&mut self, len: usize) -> DecodeResult<&'a [u8]> {
        self.ensure(len)?;
        let bytes = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(bytes)
    }

    /// Advance past `len` bytes
    pub fn skip(&mut self, len: usize) -> DecodeResult<()> {
        self.read_bytes(len).map(|_| ())
    }

    /// Read a 16-bit big-endian value
    pub fn read_u16_be(&mut self) -> DecodeResult<u16> {
        let b = self.read_bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    /// Read a 32-bit big-endian value
    pub fn read_u32_be(&mut self) -> DecodeResult<u32> {
        let b = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a four-character chunk tag
    pub fn read_tag(&mut self) -> DecodeResult<[u8; 4]> {
        let b = self.read_bytes(4)?;
        Ok([b[0], b[1], b[2], b[3]])
    }
}
