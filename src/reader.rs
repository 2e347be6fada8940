//! Token readers for the two wire forms.
//!
//! [`BinaryReader`] consumes compact UBJSON; [`BlockReader`] consumes the
//! block notation, scanning `[...]` groups and keeping a one-block
//! look-ahead so that peeking never consumes input.

use std::io::{self, BufRead, BufReader, Read};
use std::str::{self, FromStr};

use crate::error::{Error, Result};
use crate::marker::Marker;

/// Low-level token source.
///
/// `peek_marker` must not consume input. `read_string` enforces the
/// caller-supplied allocation cap before allocating.
pub trait TokenRead {
    /// Returns the next marker without advancing.
    fn peek_marker(&mut self) -> Result<Marker>;

    /// Reads the next marker and advances.
    fn read_marker(&mut self) -> Result<Marker>;

    fn read_u8(&mut self) -> Result<u8>;
    fn read_i8(&mut self) -> Result<i8>;
    fn read_i16(&mut self) -> Result<i16>;
    fn read_i32(&mut self) -> Result<i32>;
    fn read_i64(&mut self) -> Result<i64>;
    fn read_f32(&mut self) -> Result<f32>;
    fn read_f64(&mut self) -> Result<f64>;

    /// Reads a `Char` payload, rejecting values above 127.
    fn read_char(&mut self) -> Result<u8>;

    /// Reads a length-prefixed UBJSON string payload, failing when the
    /// prefix is negative or exceeds `max`.
    fn read_string(&mut self, max: usize) -> Result<String>;

    /// Reads a complete integer token of unspecified width, widening to
    /// `i64`. Accepts `U`, `i`, `I`, `l` and `L`; any other marker fails.
    fn read_int(&mut self) -> Result<i64> {
        let m = self.read_marker()?;
        match m {
            Marker::UInt8 => Ok(i64::from(self.read_u8()?)),
            Marker::Int8 => Ok(i64::from(self.read_i8()?)),
            Marker::Int16 => Ok(i64::from(self.read_i16()?)),
            Marker::Int32 => Ok(i64::from(self.read_i32()?)),
            Marker::Int64 => self.read_i64(),
            other => Err(Error::ExpectedIntMarker(other)),
        }
    }
}

/// Token reader for the compact binary form.
pub struct BinaryReader<R: Read> {
    r: BufReader<R>,
}

impl<R: Read> BinaryReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            r: BufReader::new(source),
        }
    }

    /// Reads exactly `buf.len()` bytes, mapping a short read to
    /// [`Error::UnexpectedEof`].
    fn fill(&mut self, buf: &mut [u8]) -> Result<()> {
        self.r.read_exact(buf).map_err(|e| {
            if e.kind() == io::ErrorKind::UnexpectedEof {
                Error::UnexpectedEof
            } else {
                Error::Io(e)
            }
        })
    }

    fn byte(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.fill(&mut b)?;
        Ok(b[0])
    }
}

impl<R: Read> TokenRead for BinaryReader<R> {
    fn peek_marker(&mut self) -> Result<Marker> {
        let buf = self.r.fill_buf()?;
        match buf.first() {
            Some(&b) => Marker::from_byte(b).ok_or(Error::IllegalMarker(b)),
            None => Err(Error::UnexpectedEof),
        }
    }

    fn read_marker(&mut self) -> Result<Marker> {
        let b = self.byte()?;
        Marker::from_byte(b).ok_or(Error::IllegalMarker(b))
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.byte()
    }

    fn read_i8(&mut self) -> Result<i8> {
        Ok(self.byte()? as i8)
    }

    fn read_i16(&mut self) -> Result<i16> {
        let mut b = [0u8; 2];
        self.fill(&mut b)?;
        Ok(i16::from_be_bytes(b))
    }

    fn read_i32(&mut self) -> Result<i32> {
        let mut b = [0u8; 4];
        self.fill(&mut b)?;
        Ok(i32::from_be_bytes(b))
    }

    fn read_i64(&mut self) -> Result<i64> {
        let mut b = [0u8; 8];
        self.fill(&mut b)?;
        Ok(i64::from_be_bytes(b))
    }

    fn read_f32(&mut self) -> Result<f32> {
        let mut b = [0u8; 4];
        self.fill(&mut b)?;
        Ok(f32::from_be_bytes(b))
    }

    fn read_f64(&mut self) -> Result<f64> {
        let mut b = [0u8; 8];
        self.fill(&mut b)?;
        Ok(f64::from_be_bytes(b))
    }

    fn read_char(&mut self) -> Result<u8> {
        let c = self.byte()?;
        if c > 127 {
            return Err(Error::IllegalChar(c));
        }
        Ok(c)
    }

    fn read_string(&mut self, max: usize) -> Result<String> {
        let len = self.read_int()?;
        if len < 0 || len as u64 > max as u64 {
            return Err(Error::IllegalLength(len));
        }
        let mut buf = vec![0u8; len as usize];
        self.fill(&mut buf)?;
        String::from_utf8(buf).map_err(|_| Error::InvalidUtf8)
    }
}

/// Token reader for the block form.
///
/// Bytes between `[` and `]` form one block; anything between blocks
/// (newlines, indentation) is skipped. A single block of look-ahead backs
/// `peek_marker`.
pub struct BlockReader<R: Read> {
    r: BufReader<R>,
    next: Option<Vec<u8>>,
}

impl<R: Read> BlockReader<R> {
    pub fn new(source: R) -> Self {
        Self {
            r: BufReader::new(source),
            next: None,
        }
    }

    /// Scans to the next `[`, then returns everything up to the matching
    /// `]`.
    fn read_block_raw(&mut self) -> Result<Vec<u8>> {
        let mut skipped = Vec::new();
        self.r.read_until(b'[', &mut skipped)?;
        if skipped.last() != Some(&b'[') {
            return Err(Error::UnexpectedEof);
        }
        let mut content = Vec::new();
        self.r.read_until(b']', &mut content)?;
        if content.pop() != Some(b']') {
            return Err(Error::UnexpectedEof);
        }
        Ok(content)
    }

    /// Returns the next block, consuming the look-ahead if one is cached.
    fn next_block(&mut self) -> Result<Vec<u8>> {
        match self.next.take() {
            Some(b) => Ok(b),
            None => self.read_block_raw(),
        }
    }

    /// Returns the next block without consuming it.
    fn peek_block(&mut self) -> Result<&[u8]> {
        if self.next.is_none() {
            let b = self.read_block_raw()?;
            if b.is_empty() {
                return Err(Error::InvalidBlock(String::new()));
            }
            self.next = Some(b);
        }
        Ok(self.next.as_deref().unwrap_or_default())
    }

    /// Parses the next block as a decimal number.
    fn parse_block<T: FromStr>(&mut self) -> Result<T> {
        let b = self.next_block()?;
        let s = str::from_utf8(&b)
            .map_err(|_| Error::InvalidNumberBlock(String::from_utf8_lossy(&b).into_owned()))?;
        s.parse()
            .map_err(|_| Error::InvalidNumberBlock(s.to_owned()))
    }
}

fn single_octet(block: &[u8]) -> Result<u8> {
    if block.len() != 1 {
        return Err(Error::InvalidBlock(
            String::from_utf8_lossy(block).into_owned(),
        ));
    }
    Ok(block[0])
}

impl<R: Read> TokenRead for BlockReader<R> {
    fn peek_marker(&mut self) -> Result<Marker> {
        let b = single_octet(self.peek_block()?)?;
        Marker::from_byte(b).ok_or(Error::IllegalMarker(b))
    }

    fn read_marker(&mut self) -> Result<Marker> {
        let block = self.next_block()?;
        let b = single_octet(&block)?;
        Marker::from_byte(b).ok_or(Error::IllegalMarker(b))
    }

    fn read_u8(&mut self) -> Result<u8> {
        self.parse_block()
    }

    fn read_i8(&mut self) -> Result<i8> {
        self.parse_block()
    }

    fn read_i16(&mut self) -> Result<i16> {
        self.parse_block()
    }

    fn read_i32(&mut self) -> Result<i32> {
        self.parse_block()
    }

    fn read_i64(&mut self) -> Result<i64> {
        self.parse_block()
    }

    fn read_f32(&mut self) -> Result<f32> {
        self.parse_block()
    }

    fn read_f64(&mut self) -> Result<f64> {
        self.parse_block()
    }

    fn read_char(&mut self) -> Result<u8> {
        let block = self.next_block()?;
        let c = single_octet(&block)?;
        if c > 127 {
            return Err(Error::IllegalChar(c));
        }
        Ok(c)
    }

    fn read_string(&mut self, max: usize) -> Result<String> {
        let len = self.read_int()?;
        if len < 1 || len as u64 > max as u64 {
            return Err(Error::IllegalLength(len));
        }
        let block = self.next_block()?;
        if block.len() as i64 != len {
            return Err(Error::CountMismatch {
                len,
                count: block.len() as i64,
            });
        }
        String::from_utf8(block).map_err(|_| Error::InvalidUtf8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_reads_fixed_width() {
        let data = [0x01, 0x02, 0xff, 0xfe, 0x00, 0x00, 0x00, 0x2a];
        let mut r = BinaryReader::new(&data[..]);
        assert_eq!(r.read_i16().unwrap(), 0x0102);
        assert_eq!(r.read_i16().unwrap(), -2);
        assert_eq!(r.read_i32().unwrap(), 42);
        assert!(matches!(r.read_u8(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn binary_peek_does_not_consume() {
        let data = [b'U', 0x08];
        let mut r = BinaryReader::new(&data[..]);
        assert_eq!(r.peek_marker().unwrap(), Marker::UInt8);
        assert_eq!(r.peek_marker().unwrap(), Marker::UInt8);
        assert_eq!(r.read_marker().unwrap(), Marker::UInt8);
        assert_eq!(r.read_u8().unwrap(), 8);
    }

    #[test]
    fn binary_int_token_widens() {
        let mut r = BinaryReader::new(&[b'U', 200][..]);
        assert_eq!(r.read_int().unwrap(), 200);
        let mut r = BinaryReader::new(&[b'i', 0xd6][..]);
        assert_eq!(r.read_int().unwrap(), -42);
        let mut r = BinaryReader::new(&[b'L', 0, 0, 0, 1, 0, 0, 0, 0][..]);
        assert_eq!(r.read_int().unwrap(), 1 << 32);
        let mut r = BinaryReader::new(&[b'S'][..]);
        assert!(matches!(
            r.read_int(),
            Err(Error::ExpectedIntMarker(Marker::String))
        ));
    }

    #[test]
    fn binary_string_respects_cap() {
        let data = [b'U', 5, b'h', b'e', b'l', b'l', b'o'];
        let mut r = BinaryReader::new(&data[..]);
        assert_eq!(r.read_string(1 << 20).unwrap(), "hello");
        let mut r = BinaryReader::new(&data[..]);
        assert!(matches!(r.read_string(4), Err(Error::IllegalLength(5))));
    }

    #[test]
    fn binary_truncated_string_fails() {
        let data = [b'U', 5, b'h', b'i'];
        let mut r = BinaryReader::new(&data[..]);
        assert!(matches!(r.read_string(1 << 20), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn block_scans_between_brackets() {
        let mut r = BlockReader::new(&b"\n\t[U][8]"[..]);
        assert_eq!(r.read_marker().unwrap(), Marker::UInt8);
        assert_eq!(r.read_u8().unwrap(), 8);
    }

    #[test]
    fn block_peek_caches_one_block() {
        let mut r = BlockReader::new(&b"[i][-42]"[..]);
        assert_eq!(r.peek_marker().unwrap(), Marker::Int8);
        assert_eq!(r.read_marker().unwrap(), Marker::Int8);
        assert_eq!(r.read_i8().unwrap(), -42);
        assert!(matches!(r.peek_marker(), Err(Error::UnexpectedEof)));
    }

    #[test]
    fn block_rejects_multi_byte_markers() {
        let mut r = BlockReader::new(&b"[UU][8]"[..]);
        assert!(matches!(r.read_marker(), Err(Error::InvalidBlock(_))));
    }

    #[test]
    fn block_string_checks_prefix_against_content() {
        let mut r = BlockReader::new(&b"[U][5][hello]"[..]);
        assert_eq!(r.read_string(1 << 20).unwrap(), "hello");
        let mut r = BlockReader::new(&b"[U][3][hello]"[..]);
        assert!(matches!(r.read_string(1 << 20), Err(Error::CountMismatch { .. })));
        let mut r = BlockReader::new(&b"[U][0]"[..]);
        assert!(matches!(r.read_string(1 << 20), Err(Error::IllegalLength(0))));
    }

    #[test]
    fn block_char_is_raw_octet() {
        let mut r = BlockReader::new(&b"[c]"[..]);
        assert_eq!(r.read_char().unwrap(), b'c');
        let mut r = BlockReader::new(&[b'[', 0xc3, b']'][..]);
        assert!(matches!(r.read_char(), Err(Error::IllegalChar(0xc3))));
    }

    #[test]
    fn block_number_parse_failures_are_reported() {
        let mut r = BlockReader::new(&b"[abc]"[..]);
        assert!(matches!(r.read_i32(), Err(Error::InvalidNumberBlock(_))));
        let mut r = BlockReader::new(&b"[300]"[..]);
        assert!(matches!(r.read_u8(), Err(Error::InvalidNumberBlock(_))));
    }
}
