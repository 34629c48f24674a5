//! PLAIN byte-array codec.
//!
//! Variable mode frames every value with a little-endian `i32` length; fixed
//! mode (FIXED_LEN_BYTE_ARRAY) writes exactly `N` bytes per value and no
//! length at all.

use std::io::{Read, Write};

use bytes::Bytes;

use super::{read_value, ByteArrayDecode, ByteArrayEncode, ByteArrayEncoding};
use crate::error::{EofContext, ParquetError, Result};

/// PLAIN decoder over a reader
pub struct PlainDecoder<R> {
    reader: R,
    // Set for fixed length byte arrays, otherwise each value carries its length
    fixed_length: Option<usize>,
}

impl<R: Read> PlainDecoder<R> {
    /// Decoder for length-prefixed values
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            fixed_length: None,
        }
    }

    /// Decoder for values of exactly `length` bytes
    pub fn with_fixed_length(reader: R, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(ParquetError::invalid_argument(
                "fixed length byte arrays need a positive length",
            ));
        }
        Ok(Self {
            reader,
            fixed_length: Some(length),
        })
    }

    pub fn into_inner(self) -> R {
        self.reader
    }

    fn read_length(&mut self) -> Result<usize> {
        let mut len = [0u8; 4];
        self.reader
            .read_exact(&mut len)
            .eof_context(|| "bytearray/plain: not enough data to read the length")?;
        let len = i32::from_le_bytes(len);
        if len < 0 {
            return Err(ParquetError::framing(format!(
                "bytearray/plain: len is negative ({})",
                len
            )));
        }
        Ok(len as usize)
    }
}

impl<R: Read> ByteArrayDecode for PlainDecoder<R> {
    fn next_value(&mut self) -> Result<Bytes> {
        let len = match self.fixed_length {
            Some(len) => len,
            None => self.read_length()?,
        };

        read_value(&mut self.reader, len, || {
            format!("bytearray/plain: expected {} bytes of value data", len)
        })
    }

    fn encoding(&self) -> ByteArrayEncoding {
        ByteArrayEncoding::Plain
    }
}

/// PLAIN encoder; every value is written as soon as it is put
pub struct PlainEncoder<W> {
    writer: W,
    fixed_length: Option<usize>,
    values_written: usize,
}

impl<W: Write> PlainEncoder<W> {
    /// Encoder for length-prefixed values
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            fixed_length: None,
            values_written: 0,
        }
    }

    /// Encoder for values of exactly `length` bytes
    pub fn with_fixed_length(writer: W, length: usize) -> Result<Self> {
        if length == 0 {
            return Err(ParquetError::invalid_argument(
                "fixed length byte arrays need a positive length",
            ));
        }
        Ok(Self {
            writer,
            fixed_length: Some(length),
            values_written: 0,
        })
    }

    pub fn values_written(&self) -> usize {
        self.values_written
    }
}

impl<W: Write> ByteArrayEncode for PlainEncoder<W> {
    type Writer = W;

    fn put(&mut self, value: &[u8]) -> Result<()> {
        match self.fixed_length {
            Some(expected) if value.len() != expected => {
                return Err(ParquetError::LengthMismatch {
                    expected,
                    actual: value.len(),
                });
            }
            Some(_) => {}
            None => {
                let len = i32::try_from(value.len()).map_err(|_| {
                    ParquetError::framing(format!(
                        "bytearray/plain: value of {} bytes does not fit an int32 length",
                        value.len()
                    ))
                })?;
                self.writer.write_all(&len.to_le_bytes())?;
            }
        }
        self.writer.write_all(value)?;
        self.values_written += 1;
        Ok(())
    }

    fn finish(self) -> Result<W> {
        Ok(self.writer)
    }

    fn encoding(&self) -> ByteArrayEncoding {
        ByteArrayEncoding::Plain
    }
}
