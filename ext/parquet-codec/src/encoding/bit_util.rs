//! Variable-length integers (LEB128, zigzag) and little-endian bit packing
//! used by the DELTA_BINARY_PACKED length codec.

use std::io::{Read, Write};

use crate::error::{EofContext, ParquetError, Result};

/// Longest LEB128 encoding of a u64
const MAX_VARINT_LEN: usize = 10;

/// Write an unsigned LEB128 varint
#[inline]
pub fn write_uleb128<W: Write>(writer: &mut W, mut n: u64) -> Result<()> {
    let mut buf = [0u8; MAX_VARINT_LEN];
    let mut i = 0;
    while n >= 0x80 {
        buf[i] = (n as u8) | 0x80;
        n >>= 7;
        i += 1;
    }
    buf[i] = n as u8;
    writer.write_all(&buf[..=i])?;
    Ok(())
}

/// Read an unsigned LEB128 varint
pub fn read_uleb128<R: Read>(reader: &mut R) -> Result<u64> {
    let mut result: u64 = 0;
    let mut shift = 0;
    for _ in 0..MAX_VARINT_LEN {
        let mut byte = [0u8; 1];
        reader
            .read_exact(&mut byte)
            .eof_context(|| "not enough data to decode varint")?;
        result |= ((byte[0] & 0x7F) as u64) << shift;
        if byte[0] & 0x80 == 0 {
            return Ok(result);
        }
        shift += 7;
    }
    Err(ParquetError::corrupt("varint is longer than 10 bytes"))
}

/// Write a signed integer as a zigzag LEB128 varint
#[inline]
pub fn write_zigzag<W: Write>(writer: &mut W, n: i64) -> Result<()> {
    write_uleb128(writer, ((n << 1) ^ (n >> 63)) as u64)
}

/// Read a zigzag LEB128 varint
#[inline]
pub fn read_zigzag<R: Read>(reader: &mut R) -> Result<i64> {
    let val = read_uleb128(reader)?;
    Ok(((val >> 1) as i64) ^ (-((val & 1) as i64)))
}

/// Number of bits needed to represent `max`
#[inline]
pub fn bit_width(max: u32) -> u8 {
    (32 - max.leading_zeros()) as u8
}

#[inline]
fn mask(bit_width: u8) -> u64 {
    if bit_width >= 64 {
        u64::MAX
    } else {
        (1u64 << bit_width) - 1
    }
}

/// Pack `values` LSB-first using `bit_width` bits each and append to `out`.
///
/// The trailing partial byte, if any, is zero padded.
pub fn pack_u32(values: &[u32], bit_width: u8, out: &mut Vec<u8>) {
    debug_assert!(bit_width <= 32);
    let mask = mask(bit_width);
    let mut acc: u64 = 0;
    let mut bits: u32 = 0;
    for &v in values {
        acc |= (v as u64 & mask) << bits;
        bits += bit_width as u32;
        while bits >= 8 {
            out.push(acc as u8);
            acc >>= 8;
            bits -= 8;
        }
    }
    if bits > 0 {
        out.push(acc as u8);
    }
}

/// Unpack `out.len()` values of `bit_width` bits from `data`, LSB-first.
pub fn unpack_u32(data: &[u8], bit_width: u8, out: &mut [u32]) -> Result<()> {
    if bit_width > 32 {
        return Err(ParquetError::corrupt(format!(
            "bit width {} is larger than 32",
            bit_width
        )));
    }
    let mask = mask(bit_width);
    let mut bytes = data.iter();
    let mut acc: u64 = 0;
    let mut bits: u32 = 0;
    for slot in out.iter_mut() {
        while bits < bit_width as u32 {
            let byte = bytes
                .next()
                .ok_or_else(|| ParquetError::eof("not enough data to unpack mini block"))?;
            acc |= (*byte as u64) << bits;
            bits += 8;
        }
        *slot = (acc & mask) as u32;
        acc >>= bit_width;
        bits -= bit_width as u32;
    }
    Ok(())
}

/// Bytes needed to hold `count` values of `bit_width` bits
#[inline]
pub fn packed_len(count: usize, bit_width: u8) -> usize {
    (count * bit_width as usize).div_ceil(8)
}
