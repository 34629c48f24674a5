//! Byte-array value codecs
//!
//! Three encodings are supported for `BYTE_ARRAY` and `FIXED_LEN_BYTE_ARRAY`
//! columns:
//!
//! - **PLAIN**: `[i32 length][bytes]` per value, or `[N bytes]` per value for
//!   fixed length columns ([`plain`])
//! - **DELTA_LENGTH_BYTE_ARRAY**: all lengths through the length codec, then
//!   the concatenated bytes ([`delta_length`])
//! - **DELTA_BYTE_ARRAY**: prefix lengths through the length codec, then the
//!   suffixes as a DELTA_LENGTH_BYTE_ARRAY stream ([`delta_byte_array`])
//!
//! Which encoding a column uses is decided by the caller. A codec instance
//! covers exactly one column chunk; encoders are consumed by
//! [`ByteArrayEncode::finish`], so no value can be put after the stream has
//! been flushed.

pub mod bit_util;
pub mod delta_bit_pack;
pub mod delta_byte_array;
pub mod delta_length;
pub mod plain;

use std::io::{Read, Write};

use bytes::Bytes;
use parquet::basic::{Encoding, Type as PhysicalType};

use crate::error::{ParquetError, Result};
use crate::schema::PrimitiveNode;

pub use delta_bit_pack::{DeltaBitPackConfig, DeltaBitPackDecoder, DeltaBitPackEncoder};
pub use delta_byte_array::{DeltaByteArrayDecoder, DeltaByteArrayEncoder};
pub use delta_length::{DeltaLengthDecoder, DeltaLengthEncoder};
pub use plain::{PlainDecoder, PlainEncoder};

/// Encodings available for byte-array values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteArrayEncoding {
    Plain,
    DeltaLengthByteArray,
    DeltaByteArray,
}

impl ByteArrayEncoding {
    /// Get the encoding name as it appears in file metadata
    pub fn name(&self) -> &'static str {
        match self {
            ByteArrayEncoding::Plain => "PLAIN",
            ByteArrayEncoding::DeltaLengthByteArray => "DELTA_LENGTH_BYTE_ARRAY",
            ByteArrayEncoding::DeltaByteArray => "DELTA_BYTE_ARRAY",
        }
    }
}

impl std::fmt::Display for ByteArrayEncoding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<Encoding> for ByteArrayEncoding {
    type Error = ParquetError;

    fn try_from(encoding: Encoding) -> Result<Self> {
        match encoding {
            Encoding::PLAIN => Ok(ByteArrayEncoding::Plain),
            Encoding::DELTA_LENGTH_BYTE_ARRAY => Ok(ByteArrayEncoding::DeltaLengthByteArray),
            Encoding::DELTA_BYTE_ARRAY => Ok(ByteArrayEncoding::DeltaByteArray),
            other => Err(ParquetError::unsupported(format!(
                "{:?} is not a byte array value encoding",
                other
            ))),
        }
    }
}

impl From<ByteArrayEncoding> for Encoding {
    fn from(encoding: ByteArrayEncoding) -> Self {
        match encoding {
            ByteArrayEncoding::Plain => Encoding::PLAIN,
            ByteArrayEncoding::DeltaLengthByteArray => Encoding::DELTA_LENGTH_BYTE_ARRAY,
            ByteArrayEncoding::DeltaByteArray => Encoding::DELTA_BYTE_ARRAY,
        }
    }
}

/// Sequential byte-array decoding
pub trait ByteArrayDecode {
    /// Decode the next value
    fn next_value(&mut self) -> Result<Bytes>;

    /// Fill `dst` with the next `dst.len()` values.
    ///
    /// Stops at the first error; slots already written are left for the
    /// caller to discard.
    fn decode_values(&mut self, dst: &mut [Bytes]) -> Result<()> {
        for slot in dst.iter_mut() {
            *slot = self.next_value()?;
        }
        Ok(())
    }

    fn encoding(&self) -> ByteArrayEncoding;
}

/// Byte-array encoding with an explicit flush
pub trait ByteArrayEncode {
    type Writer;

    /// Encode one value
    fn put(&mut self, value: &[u8]) -> Result<()>;

    /// Encode every value of `values` in order
    fn put_all<I, V>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = V>,
        V: AsRef<[u8]>,
        Self: Sized,
    {
        for value in values {
            self.put(value.as_ref())?;
        }
        Ok(())
    }

    /// Flush everything still buffered and give back the writer
    fn finish(self) -> Result<Self::Writer>
    where
        Self: Sized;

    fn encoding(&self) -> ByteArrayEncoding;
}

/// Read exactly `len` bytes of value data.
///
/// Lengths come from the stream itself, so the buffer grows with the data
/// actually read instead of trusting `len` up front.
pub(crate) fn read_value<R: Read, S, F>(reader: &mut R, len: usize, context: F) -> Result<Bytes>
where
    S: Into<String>,
    F: FnOnce() -> S,
{
    let mut buf = Vec::with_capacity(len.min(64 * 1024));
    reader.take(len as u64).read_to_end(&mut buf)?;
    if buf.len() != len {
        return Err(ParquetError::eof(context()));
    }
    Ok(Bytes::from(buf))
}

/// Builder for configured byte-array encoders and decoders
#[derive(Debug, Clone)]
pub struct CodecBuilder {
    encoding: ByteArrayEncoding,
    fixed_length: Option<usize>,
    delta_config: DeltaBitPackConfig,
}

impl CodecBuilder {
    /// Create a new builder for `encoding` with default settings
    pub fn new(encoding: ByteArrayEncoding) -> Self {
        Self {
            encoding,
            fixed_length: None,
            delta_config: DeltaBitPackConfig::default(),
        }
    }

    /// Create a builder matching a leaf column.
    ///
    /// `FIXED_LEN_BYTE_ARRAY` columns encoded as PLAIN pick up the column's
    /// type length.
    pub fn for_column(encoding: ByteArrayEncoding, column: &PrimitiveNode) -> Result<Self> {
        let builder = Self::new(encoding);
        match column.physical_type() {
            PhysicalType::BYTE_ARRAY => Ok(builder),
            PhysicalType::FIXED_LEN_BYTE_ARRAY => {
                if encoding != ByteArrayEncoding::Plain {
                    return Ok(builder);
                }
                let length = column
                    .type_length()
                    .filter(|len| *len > 0)
                    .ok_or_else(|| {
                        ParquetError::schema(format!(
                            "column {} has no positive type length",
                            column.path()
                        ))
                    })?;
                Ok(builder.with_fixed_length(length as usize))
            }
            other => Err(ParquetError::unsupported(format!(
                "column {} is {:?}, not a byte array",
                column.path(),
                other
            ))),
        }
    }

    /// Use fixed length framing (PLAIN only)
    pub fn with_fixed_length(mut self, length: usize) -> Self {
        self.fixed_length = Some(length);
        self
    }

    /// Set the block layout of the length codec
    pub fn with_delta_config(mut self, config: DeltaBitPackConfig) -> Self {
        self.delta_config = config;
        self
    }

    pub fn encoding(&self) -> ByteArrayEncoding {
        self.encoding
    }

    fn validate(&self) -> Result<()> {
        if self.fixed_length.is_some() && self.encoding != ByteArrayEncoding::Plain {
            return Err(ParquetError::invalid_argument(format!(
                "fixed length framing is only available for PLAIN, not {}",
                self.encoding
            )));
        }
        Ok(())
    }

    /// Build an encoder writing to `writer`
    pub fn build_encoder<W: Write>(&self, writer: W) -> Result<ValueEncoder<W>> {
        self.validate()?;
        Ok(match (self.encoding, self.fixed_length) {
            (ByteArrayEncoding::Plain, Some(length)) => {
                ValueEncoder::Plain(PlainEncoder::with_fixed_length(writer, length)?)
            }
            (ByteArrayEncoding::Plain, None) => ValueEncoder::Plain(PlainEncoder::new(writer)),
            (ByteArrayEncoding::DeltaLengthByteArray, _) => ValueEncoder::DeltaLength(
                DeltaLengthEncoder::with_config(writer, self.delta_config),
            ),
            (ByteArrayEncoding::DeltaByteArray, _) => ValueEncoder::DeltaByteArray(
                DeltaByteArrayEncoder::with_config(writer, self.delta_config),
            ),
        })
    }

    /// Build a decoder reading from `reader`.
    ///
    /// The delta decoders read their length sub-streams here.
    pub fn build_decoder<R: Read>(&self, reader: R) -> Result<ValueDecoder<R>> {
        self.validate()?;
        Ok(match (self.encoding, self.fixed_length) {
            (ByteArrayEncoding::Plain, Some(length)) => {
                ValueDecoder::Plain(PlainDecoder::with_fixed_length(reader, length)?)
            }
            (ByteArrayEncoding::Plain, None) => ValueDecoder::Plain(PlainDecoder::new(reader)),
            (ByteArrayEncoding::DeltaLengthByteArray, _) => {
                ValueDecoder::DeltaLength(DeltaLengthDecoder::new(reader)?)
            }
            (ByteArrayEncoding::DeltaByteArray, _) => {
                ValueDecoder::DeltaByteArray(DeltaByteArrayDecoder::new(reader)?)
            }
        })
    }
}

/// Encoder for any of the byte-array encodings
pub enum ValueEncoder<W> {
    Plain(PlainEncoder<W>),
    DeltaLength(DeltaLengthEncoder<W>),
    DeltaByteArray(DeltaByteArrayEncoder<W>),
}

impl<W: Write> ByteArrayEncode for ValueEncoder<W> {
    type Writer = W;

    fn put(&mut self, value: &[u8]) -> Result<()> {
        match self {
            ValueEncoder::Plain(e) => e.put(value),
            ValueEncoder::DeltaLength(e) => e.put(value),
            ValueEncoder::DeltaByteArray(e) => e.put(value),
        }
    }

    fn finish(self) -> Result<W> {
        match self {
            ValueEncoder::Plain(e) => e.finish(),
            ValueEncoder::DeltaLength(e) => e.finish(),
            ValueEncoder::DeltaByteArray(e) => e.finish(),
        }
    }

    fn encoding(&self) -> ByteArrayEncoding {
        match self {
            ValueEncoder::Plain(e) => e.encoding(),
            ValueEncoder::DeltaLength(e) => e.encoding(),
            ValueEncoder::DeltaByteArray(e) => e.encoding(),
        }
    }
}

/// Decoder for any of the byte-array encodings
pub enum ValueDecoder<R> {
    Plain(PlainDecoder<R>),
    DeltaLength(DeltaLengthDecoder<R>),
    DeltaByteArray(DeltaByteArrayDecoder<R>),
}

impl<R: Read> ValueDecoder<R> {
    /// Values left in the stream, when the encoding records a count
    pub fn values_left(&self) -> Option<usize> {
        match self {
            ValueDecoder::Plain(_) => None,
            ValueDecoder::DeltaLength(d) => Some(d.values_left()),
            ValueDecoder::DeltaByteArray(d) => Some(d.values_left()),
        }
    }

    pub fn into_inner(self) -> R {
        match self {
            ValueDecoder::Plain(d) => d.into_inner(),
            ValueDecoder::DeltaLength(d) => d.into_inner(),
            ValueDecoder::DeltaByteArray(d) => d.into_inner(),
        }
    }
}

impl<R: Read> ByteArrayDecode for ValueDecoder<R> {
    fn next_value(&mut self) -> Result<Bytes> {
        match self {
            ValueDecoder::Plain(d) => d.next_value(),
            ValueDecoder::DeltaLength(d) => d.next_value(),
            ValueDecoder::DeltaByteArray(d) => d.next_value(),
        }
    }

    fn encoding(&self) -> ByteArrayEncoding {
        match self {
            ValueDecoder::Plain(d) => d.encoding(),
            ValueDecoder::DeltaLength(d) => d.encoding(),
            ValueDecoder::DeltaByteArray(d) => d.encoding(),
        }
    }
}
