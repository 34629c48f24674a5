//! Byte-array value codecs and schema flattening for Parquet-style files
//!
//! `parquet-codec` provides the pieces of a columnar reader/writer that sit
//! between raw page bytes and typed column values.
//!
//! # Key Components
//!
//! - **Encoding**: Byte-array value codecs over `std::io::Read` / `Write`
//!   - PLAIN, variable or fixed length, through [`encoding::PlainEncoder`]
//!   - DELTA_LENGTH_BYTE_ARRAY through [`encoding::DeltaLengthEncoder`]
//!   - DELTA_BYTE_ARRAY (prefix compression) through [`encoding::DeltaByteArrayEncoder`]
//!   - The DELTA_BINARY_PACKED length codec they share
//!   - [`encoding::CodecBuilder`] to configure one for a column
//!
//! - **Schema**: Tree built from the flat schema element list
//!   - Groups and primitive leaves in schema order
//!   - Leaf columns by dotted path with max definition/repetition levels
//!   - Schema introspection through the [`traits::SchemaInspector`] trait
//!
//! # Usage
//!
//! One codec instance covers one column chunk. Encoders buffer what the
//! wire format requires and write it on [`ByteArrayEncode::finish`], which
//! consumes them. A built [`Schema`] is immutable and can be shared between
//! threads.

pub mod encoding;
pub mod error;
pub mod schema;
pub mod traits;

#[cfg(test)]
pub mod test_utils;

pub use encoding::{
    ByteArrayDecode, ByteArrayEncode, ByteArrayEncoding, CodecBuilder, DeltaBitPackConfig,
    ValueDecoder, ValueEncoder,
};
pub use error::{LevelKind, ParquetError, Result};
pub use schema::{Column, GroupNode, PrimitiveNode, Schema, SchemaBuilder, SchemaElement, SchemaNode};
