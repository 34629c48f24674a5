//! DELTA_LENGTH_BYTE_ARRAY codec.
//!
//! The lengths of all values are written first through the length codec,
//! followed by the concatenated value bytes. Because the length stream must
//! precede the data, the encoder buffers everything until [`finish`].
//!
//! [`finish`]: ByteArrayEncode::finish

use std::io::{Read, Write};

use bytes::{Bytes, BytesMut};
use log::debug;

use super::delta_bit_pack::{DeltaBitPackConfig, DeltaBitPackDecoder, DeltaBitPackEncoder};
use super::{read_value, ByteArrayDecode, ByteArrayEncode, ByteArrayEncoding};
use crate::error::{ParquetError, Result};

/// DELTA_LENGTH_BYTE_ARRAY decoder.
///
/// The whole length stream is decoded when the decoder is created; the value
/// bytes are then read lazily, one value per call.
pub struct DeltaLengthDecoder<R> {
    reader: R,
    lengths: Vec<i32>,
    // Index of the next value to read
    position: usize,
}

impl<R: Read> DeltaLengthDecoder<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let lengths = DeltaBitPackDecoder::new(&mut reader)?.decode_all()?;
        Ok(Self {
            reader,
            lengths,
            position: 0,
        })
    }

    /// All decoded value lengths
    pub fn lengths(&self) -> &[i32] {
        &self.lengths
    }

    /// Number of values already returned
    pub fn position(&self) -> usize {
        self.position
    }

    pub fn values_left(&self) -> usize {
        self.lengths.len() - self.position
    }

    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> ByteArrayDecode for DeltaLengthDecoder<R> {
    fn next_value(&mut self) -> Result<Bytes> {
        let len = *self.lengths.get(self.position).ok_or_else(|| {
            ParquetError::eof(format!(
                "bytearray/delta_length: all {} values already read",
                self.lengths.len()
            ))
        })?;
        if len < 0 {
            return Err(ParquetError::corrupt(format!(
                "bytearray/delta_length: negative length {} at position {}",
                len, self.position
            )));
        }

        let position = self.position;
        let value = read_value(&mut self.reader, len as usize, || {
            format!(
                "bytearray/delta_length: expected {} bytes for value {}",
                len, position
            )
        })?;
        self.position += 1;
        Ok(value)
    }

    fn encoding(&self) -> ByteArrayEncoding {
        ByteArrayEncoding::DeltaLengthByteArray
    }
}

/// DELTA_LENGTH_BYTE_ARRAY encoder.
///
/// Values accumulate in memory; nothing reaches the writer until
/// [`ByteArrayEncode::finish`], which consumes the encoder.
pub struct DeltaLengthEncoder<W> {
    writer: W,
    config: DeltaBitPackConfig,
    lengths: Vec<i32>,
    data: BytesMut,
}

impl<W: Write> DeltaLengthEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, DeltaBitPackConfig::default())
    }

    pub fn with_config(writer: W, config: DeltaBitPackConfig) -> Self {
        Self {
            writer,
            config,
            lengths: Vec::new(),
            data: BytesMut::new(),
        }
    }

    /// Lengths buffered so far
    pub fn lengths(&self) -> &[i32] {
        &self.lengths
    }

    /// Size of the buffered value bytes
    pub fn buffered_bytes(&self) -> usize {
        self.data.len()
    }

    /// Mutable access to the writer, for streams that must precede this one
    pub(crate) fn get_mut(&mut self) -> &mut W {
        &mut self.writer
    }
}

impl<W: Write> ByteArrayEncode for DeltaLengthEncoder<W> {
    type Writer = W;

    fn put(&mut self, value: &[u8]) -> Result<()> {
        let len = i32::try_from(value.len()).map_err(|_| {
            ParquetError::framing(format!(
                "bytearray/delta_length: value of {} bytes does not fit an int32 length",
                value.len()
            ))
        })?;
        self.lengths.push(len);
        self.data.extend_from_slice(value);
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        DeltaBitPackEncoder::new(self.config).encode(&mut self.writer, &self.lengths)?;
        self.writer.write_all(&self.data)?;
        debug!(
            "flushed DELTA_LENGTH_BYTE_ARRAY stream: {} values, {} data bytes",
            self.lengths.len(),
            self.data.len()
        );
        Ok(self.writer)
    }

    fn encoding(&self) -> ByteArrayEncoding {
        ByteArrayEncoding::DeltaLengthByteArray
    }
}
