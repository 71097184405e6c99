/// Wire primitives: big-endian unsigned integers and length-prefixed text.
///
/// Every message is `[u8 tag][payload]`. Readers are bounds-checked
/// cursors over a fully received message; nothing here ever sees a
/// partial stream. No signed or floating values exist on the wire.

use std::fmt;

use thiserror::Error;

use crate::domain::coord::Coord;

/// Logical connection a message travelled on.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Channel {
    Lobby,
    Game,
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Channel::Lobby => f.write_str("lobby"),
            Channel::Game => f.write_str("game"),
        }
    }
}

/// Fatal decode failures. The connection must be treated as corrupt.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("buffer underrun: needed {needed} byte(s), {remaining} remaining")]
    BufferUnderrun { needed: usize, remaining: usize },

    #[error("unknown {channel} message tag {tag}")]
    UnknownTag { channel: Channel, tag: u8 },

    #[error("unknown snake change sub-tag {tag}")]
    UnknownSubTag { tag: u8 },

    #[error("text field is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid direction value {value}")]
    InvalidDirection { value: u8 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("length {len} does not fit its prefix (max {max})")]
    TooLong { len: usize, max: usize },
}

// ── Reader ──

pub struct WireReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        WireReader { data, pos: 0 }
    }

    /// True while unread bytes remain. Drives "decode until exhausted" loops.
    pub fn available(&self) -> bool {
        self.pos < self.data.len()
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::BufferUnderrun { needed: n, remaining: self.remaining() });
        }
        let slice = &self.data[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        self.take(len)
    }

    pub fn read_string(&mut self, len: usize) -> Result<String, DecodeError> {
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map(str::to_owned)
            .map_err(|_| DecodeError::InvalidUtf8)
    }

    pub fn read_coord(&mut self) -> Result<Coord, DecodeError> {
        let x = self.read_u16()?;
        let y = self.read_u16()?;
        Ok(Coord::new(x, y))
    }
}

// ── Writer ──

#[derive(Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn new() -> Self {
        WireWriter { buf: Vec::with_capacity(64) }
    }

    /// Start a message with its tag byte.
    pub fn with_tag(tag: u8) -> Self {
        let mut w = WireWriter::new();
        w.write_u8(tag);
        w
    }

    pub fn write_u8(&mut self, v: u8) {
        self.buf.push(v);
    }

    pub fn write_u16(&mut self, v: u16) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn write_coord(&mut self, c: Coord) {
        self.write_u16(c.x);
        self.write_u16(c.y);
    }

    /// Append UTF-8 text and return its encoded byte length,
    /// so the caller can emit the length prefix.
    pub fn write_string(&mut self, s: &str) -> usize {
        self.buf.extend_from_slice(s.as_bytes());
        s.len()
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Text with a `u8` length prefix. Encoded into a scratch writer
    /// first to learn its byte length.
    pub fn write_string_u8(&mut self, s: &str) -> Result<(), EncodeError> {
        let mut scratch = WireWriter::new();
        let len = scratch.write_string(s);
        let prefix = u8::try_from(len).map_err(|_| EncodeError::TooLong { len, max: u8::MAX as usize })?;
        self.write_u8(prefix);
        self.write_bytes(&scratch.buf);
        Ok(())
    }

    /// Text with a `u16` length prefix.
    pub fn write_string_u16(&mut self, s: &str) -> Result<(), EncodeError> {
        let mut scratch = WireWriter::new();
        let len = scratch.write_string(s);
        let prefix = u16::try_from(len).map_err(|_| EncodeError::TooLong { len, max: u16::MAX as usize })?;
        self.write_u16(prefix);
        self.write_bytes(&scratch.buf);
        Ok(())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Narrow a collection length to its wire prefix type.
pub fn length_prefix<T: TryFrom<usize>>(len: usize, max: usize) -> Result<T, EncodeError> {
    T::try_from(len).map_err(|_| EncodeError::TooLong { len, max })
}
