//! Byte cursor
//!
//! Index entries and tree records are packed back to back in a flat buffer.
//! `ByteCursor` owns that buffer and tracks the read position, so callers
//! never do offset arithmetic by hand: every primitive either consumes
//! exactly what it returns or fails with [`Error::Corrupt`] without moving.

use crate::error::{Error, Result};
use byteorder::{ByteOrder, LittleEndian};
use bytes::Bytes;

#[derive(Debug, Clone)]
pub struct ByteCursor {
    data: Bytes,
    position: usize,
}

impl ByteCursor {
    pub fn new(data: impl Into<Bytes>) -> Self {
        ByteCursor {
            data: data.into(),
            position: 0,
        }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Consume exactly `len` bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<Bytes> {
        if len > self.remaining() {
            return Err(Error::Corrupt(format!(
                "truncated record: wanted {len} bytes at offset {}, {} available",
                self.position,
                self.remaining()
            )));
        }

        let bytes = self.data.slice(self.position..self.position + len);
        self.position += len;

        Ok(bytes)
    }

    /// Consume bytes up to and including `delimiter`, returning them without it
    pub fn read_until(&mut self, delimiter: u8) -> Result<Bytes> {
        let end = self.data[self.position..]
            .iter()
            .position(|&byte| byte == delimiter)
            .ok_or_else(|| {
                Error::Corrupt(format!(
                    "missing {delimiter:#04x} delimiter after offset {}",
                    self.position
                ))
            })?;

        let bytes = self.data.slice(self.position..self.position + end);
        self.position += end + 1;

        Ok(bytes)
    }

    /// Consume whatever is left
    pub fn read_rest(&mut self) -> Bytes {
        let bytes = self.data.slice(self.position..);
        self.position = self.data.len();
        bytes
    }

    pub fn skip(&mut self, len: usize) -> Result<()> {
        self.read_bytes(len).map(|_| ())
    }

    pub fn read_u16_le(&mut self) -> Result<u16> {
        Ok(LittleEndian::read_u16(&self.read_bytes(2)?))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        Ok(LittleEndian::read_u32(&self.read_bytes(4)?))
    }
}
