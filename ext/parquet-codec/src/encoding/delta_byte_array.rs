//! DELTA_BYTE_ARRAY (prefix compressed) codec.
//!
//! Each value is stored as the length of the prefix it shares with the
//! previous value plus the remaining suffix. The prefix lengths go through
//! the length codec; the suffixes form a DELTA_LENGTH_BYTE_ARRAY stream that
//! directly follows them.

use std::io::{Read, Write};

use bytes::{Bytes, BytesMut};
use log::debug;

use super::delta_bit_pack::{DeltaBitPackConfig, DeltaBitPackDecoder, DeltaBitPackEncoder};
use super::delta_length::{DeltaLengthDecoder, DeltaLengthEncoder};
use super::{ByteArrayDecode, ByteArrayEncode, ByteArrayEncoding};
use crate::error::{ParquetError, Result};

/// Length of the longest common prefix of `a` and `b`, compared byte by byte
#[inline]
pub fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}

/// DELTA_BYTE_ARRAY decoder
pub struct DeltaByteArrayDecoder<R> {
    prefix_lengths: Vec<i32>,
    suffixes: DeltaLengthDecoder<R>,
    previous_value: Bytes,
}

impl<R: Read> DeltaByteArrayDecoder<R> {
    pub fn new(mut reader: R) -> Result<Self> {
        let prefix_lengths = DeltaBitPackDecoder::new(&mut reader)?.decode_all()?;
        let suffixes = DeltaLengthDecoder::new(reader)?;

        if prefix_lengths.len() != suffixes.lengths().len() {
            return Err(ParquetError::corrupt(format!(
                "bytearray/delta: different number of suffixes ({}) and prefixes ({})",
                suffixes.lengths().len(),
                prefix_lengths.len()
            )));
        }

        Ok(Self {
            prefix_lengths,
            suffixes,
            previous_value: Bytes::new(),
        })
    }

    pub fn prefix_lengths(&self) -> &[i32] {
        &self.prefix_lengths
    }

    pub fn values_left(&self) -> usize {
        self.suffixes.values_left()
    }

    pub fn into_inner(self) -> R {
        self.suffixes.into_inner()
    }
}

impl<R: Read> ByteArrayDecode for DeltaByteArrayDecoder<R> {
    fn next_value(&mut self) -> Result<Bytes> {
        let position = self.suffixes.position();
        let suffix = self.suffixes.next_value()?;
        let prefix_len = self.prefix_lengths[position];

        // a malformed stream must not index past the previous value
        if prefix_len < 0 || self.previous_value.len() < prefix_len as usize {
            return Err(ParquetError::corrupt(format!(
                "bytearray/delta: invalid prefix len {} at position {}, the previous value is {} bytes",
                prefix_len,
                position,
                self.previous_value.len()
            )));
        }
        let prefix_len = prefix_len as usize;

        let value = if prefix_len == 0 {
            suffix
        } else {
            let mut value = BytesMut::with_capacity(prefix_len + suffix.len());
            value.extend_from_slice(&self.previous_value[..prefix_len]);
            value.extend_from_slice(&suffix);
            value.freeze()
        };
        self.previous_value = value.clone();
        Ok(value)
    }

    fn encoding(&self) -> ByteArrayEncoding {
        ByteArrayEncoding::DeltaByteArray
    }
}

/// DELTA_BYTE_ARRAY encoder.
///
/// Buffers prefix lengths and suffixes; [`ByteArrayEncode::finish`] writes the
/// prefix length stream followed by the suffix stream.
pub struct DeltaByteArrayEncoder<W> {
    config: DeltaBitPackConfig,
    prefix_lengths: Vec<i32>,
    previous_value: Vec<u8>,
    suffixes: DeltaLengthEncoder<W>,
}

impl<W: Write> DeltaByteArrayEncoder<W> {
    pub fn new(writer: W) -> Self {
        Self::with_config(writer, DeltaBitPackConfig::default())
    }

    pub fn with_config(writer: W, config: DeltaBitPackConfig) -> Self {
        Self {
            config,
            prefix_lengths: Vec::new(),
            previous_value: Vec::new(),
            suffixes: DeltaLengthEncoder::with_config(writer, config),
        }
    }

    /// Prefix lengths recorded so far
    pub fn prefix_lengths(&self) -> &[i32] {
        &self.prefix_lengths
    }

    /// Suffix lengths recorded so far
    pub fn suffix_lengths(&self) -> &[i32] {
        self.suffixes.lengths()
    }
}

impl<W: Write> ByteArrayEncode for DeltaByteArrayEncoder<W> {
    type Writer = W;

    fn put(&mut self, value: &[u8]) -> Result<()> {
        let prefix_len = common_prefix_len(&self.previous_value, value);
        let prefix = i32::try_from(prefix_len).map_err(|_| {
            ParquetError::framing(format!(
                "bytearray/delta: prefix of {} bytes does not fit an int32 length",
                prefix_len
            ))
        })?;
        self.suffixes.put(&value[prefix_len..])?;
        self.prefix_lengths.push(prefix);
        self.previous_value.clear();
        self.previous_value.extend_from_slice(value);
        Ok(())
    }

    fn finish(mut self) -> Result<W> {
        DeltaBitPackEncoder::new(self.config)
            .encode(self.suffixes.get_mut(), &self.prefix_lengths)?;
        debug!(
            "flushing DELTA_BYTE_ARRAY stream: {} values, {} shared prefix bytes",
            self.prefix_lengths.len(),
            self.prefix_lengths.iter().map(|&p| p as i64).sum::<i64>()
        );
        self.suffixes.finish()
    }

    fn encoding(&self) -> ByteArrayEncoding {
        ByteArrayEncoding::DeltaByteArray
    }
}
