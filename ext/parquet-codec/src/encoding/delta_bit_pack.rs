//! DELTA_BINARY_PACKED codec for `i32` sequences.
//!
//! Used as the length sub-stream of the delta byte-array encodings. The
//! stream starts with a header
//!
//! ```text
//! <block size> <mini blocks per block> <total value count> <first value>
//! ```
//!
//! followed by blocks of `<min delta> <bit width of each mini block>
//! <mini blocks>`. Every mini block that holds at least one delta is written
//! in full; unused mini blocks of the last block get width 0 and no bytes, so
//! a decoder stops reading exactly where the stream ends.

use std::io::{Read, Write};

use log::trace;

use super::bit_util::{
    bit_width, pack_u32, packed_len, read_uleb128, read_zigzag, unpack_u32, write_uleb128,
    write_zigzag,
};
use crate::error::{EofContext, ParquetError, Result};

const DEFAULT_BLOCK_SIZE: usize = 128;
const DEFAULT_MINI_BLOCK_COUNT: usize = 4;
/// Largest block accepted, from a config or from a stream header
pub const MAX_BLOCK_SIZE: usize = 1 << 16;

/// Check a block layout, returning the problem on failure
fn check_layout(block_size: u64, mini_block_count: u64) -> std::result::Result<(), String> {
    if block_size == 0 || block_size % 128 != 0 || block_size > MAX_BLOCK_SIZE as u64 {
        return Err(format!(
            "block size must be a positive multiple of 128 up to {}, got {}",
            MAX_BLOCK_SIZE, block_size
        ));
    }
    if mini_block_count == 0
        || block_size % mini_block_count != 0
        || (block_size / mini_block_count) % 32 != 0
    {
        return Err(format!(
            "{} mini blocks do not split a block of {} into multiples of 32",
            mini_block_count, block_size
        ));
    }
    Ok(())
}

/// Block layout of the length codec
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaBitPackConfig {
    block_size: usize,
    mini_block_count: usize,
}

impl Default for DeltaBitPackConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            mini_block_count: DEFAULT_MINI_BLOCK_COUNT,
        }
    }
}

impl DeltaBitPackConfig {
    /// Create a validated configuration.
    ///
    /// `block_size` must be a positive multiple of 128 no larger than
    /// [`MAX_BLOCK_SIZE`], and every mini block must hold a positive multiple
    /// of 32 values.
    pub fn new(block_size: usize, mini_block_count: usize) -> Result<Self> {
        check_layout(block_size as u64, mini_block_count as u64)
            .map_err(ParquetError::InvalidArgument)?;
        Ok(Self {
            block_size,
            mini_block_count,
        })
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn mini_block_count(&self) -> usize {
        self.mini_block_count
    }

    pub fn values_per_mini_block(&self) -> usize {
        self.block_size / self.mini_block_count
    }
}

/// Encoder for a complete `i32` sequence
#[derive(Debug, Clone, Copy, Default)]
pub struct DeltaBitPackEncoder {
    config: DeltaBitPackConfig,
}

impl DeltaBitPackEncoder {
    pub fn new(config: DeltaBitPackConfig) -> Self {
        Self { config }
    }

    /// Encode `values` and write the whole stream to `writer`
    pub fn encode<W: Write>(&self, writer: &mut W, values: &[i32]) -> Result<()> {
        let per_mini_block = self.config.values_per_mini_block();

        write_uleb128(writer, self.config.block_size as u64)?;
        write_uleb128(writer, self.config.mini_block_count as u64)?;
        write_uleb128(writer, values.len() as u64)?;
        write_zigzag(writer, values.first().copied().unwrap_or(0) as i64)?;

        if values.len() < 2 {
            return Ok(());
        }

        let deltas: Vec<i32> = values
            .windows(2)
            .map(|pair| pair[1].wrapping_sub(pair[0]))
            .collect();

        let mut adjusted = Vec::with_capacity(self.config.block_size);
        let mut padded = vec![0u32; per_mini_block];
        let mut packed = Vec::new();
        for block in deltas.chunks(self.config.block_size) {
            let min_delta = block.iter().copied().min().unwrap_or(0);
            adjusted.clear();
            adjusted.extend(block.iter().map(|d| d.wrapping_sub(min_delta) as u32));

            let mut widths = vec![0u8; self.config.mini_block_count];
            packed.clear();
            for (width, mini_block) in widths.iter_mut().zip(adjusted.chunks(per_mini_block)) {
                *width = bit_width(mini_block.iter().copied().max().unwrap_or(0));
                padded.fill(0);
                padded[..mini_block.len()].copy_from_slice(mini_block);
                pack_u32(&padded, *width, &mut packed);
            }

            write_zigzag(writer, min_delta as i64)?;
            writer.write_all(&widths)?;
            writer.write_all(&packed)?;
        }
        Ok(())
    }
}

/// Streaming decoder over a reader positioned at a DELTA_BINARY_PACKED stream
pub struct DeltaBitPackDecoder<R> {
    reader: R,

    // Header info
    values_count: usize,
    mini_block_count: usize,
    values_per_mini_block: usize,
    first_value: i32,
    first_value_read: bool,

    // Per block info
    min_delta: i32,
    bit_widths: Vec<u8>,
    mini_block_idx: usize,

    // Eagerly unpacked deltas of the current mini block
    deltas: Vec<u32>,
    delta_pos: usize,
    scratch: Vec<u8>,

    values_left: usize,
    current_value: i32,
}

impl<R: Read> DeltaBitPackDecoder<R> {
    /// Read the stream header; the total value count becomes available
    pub fn new(mut reader: R) -> Result<Self> {
        let block_size = read_uleb128(&mut reader)?;
        let mini_block_count = read_uleb128(&mut reader)?;
        let values_count = read_uleb128(&mut reader)?;
        let first_value = read_zigzag(&mut reader)?;

        // Buffers below are sized from the layout, so it must be sane first
        check_layout(block_size, mini_block_count)
            .map_err(|msg| ParquetError::corrupt(format!("invalid block layout: {}", msg)))?;
        let mini_block_count = mini_block_count as usize;
        let values_per_mini_block = block_size as usize / mini_block_count;
        if values_count > i32::MAX as u64 {
            return Err(ParquetError::corrupt(format!(
                "value count {} is out of range",
                values_count
            )));
        }
        let first_value = i32::try_from(first_value)
            .map_err(|_| ParquetError::corrupt("first value does not fit in int32"))?;

        Ok(Self {
            reader,
            values_count: values_count as usize,
            mini_block_count,
            values_per_mini_block,
            first_value,
            first_value_read: false,
            min_delta: 0,
            bit_widths: Vec::with_capacity(mini_block_count),
            mini_block_idx: 0,
            deltas: Vec::with_capacity(values_per_mini_block),
            delta_pos: 0,
            scratch: Vec::new(),
            values_left: values_count as usize,
            current_value: 0,
        })
    }

    /// Total number of values declared by the header
    pub fn values_count(&self) -> usize {
        self.values_count
    }

    /// Number of values not yet returned
    pub fn values_left(&self) -> usize {
        self.values_left
    }

    /// Decode up to `buffer.len()` values, returning how many were written
    pub fn next_batch(&mut self, buffer: &mut [i32]) -> Result<usize> {
        let num_values = buffer.len().min(self.values_left);
        for slot in buffer[..num_values].iter_mut() {
            if !self.first_value_read {
                self.first_value_read = true;
                self.current_value = self.first_value;
                *slot = self.current_value;
                continue;
            }

            if self.delta_pos == self.deltas.len() {
                self.load_mini_block()?;
            }

            self.current_value = self
                .current_value
                .wrapping_add(self.min_delta)
                .wrapping_add(self.deltas[self.delta_pos] as i32);
            self.delta_pos += 1;
            *slot = self.current_value;
        }

        self.values_left -= num_values;
        Ok(num_values)
    }

    /// Decode every remaining value
    pub fn decode_all(&mut self) -> Result<Vec<i32>> {
        // The header count is untrusted, so grow with what actually decodes
        let mut values = Vec::with_capacity(self.values_left.min(self.values_per_mini_block * 64));
        let mut chunk = vec![0i32; self.values_per_mini_block];
        loop {
            let read = self.next_batch(&mut chunk)?;
            if read == 0 {
                return Ok(values);
            }
            values.extend_from_slice(&chunk[..read]);
        }
    }

    /// Give back the reader, positioned after whatever has been consumed
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn init_block(&mut self) -> Result<()> {
        let min_delta = read_zigzag(&mut self.reader)?;
        self.min_delta = i32::try_from(min_delta)
            .map_err(|_| ParquetError::corrupt("min delta does not fit in int32"))?;

        self.bit_widths.resize(self.mini_block_count, 0);
        self.reader
            .read_exact(&mut self.bit_widths)
            .eof_context(|| "not enough data to decode mini block bit widths")?;
        self.mini_block_idx = 0;
        trace!(
            "delta bit pack block: min delta {}, widths {:?}",
            self.min_delta,
            self.bit_widths
        );
        Ok(())
    }

    fn load_mini_block(&mut self) -> Result<()> {
        if self.mini_block_idx >= self.bit_widths.len() {
            self.init_block()?;
        }

        let width = self.bit_widths[self.mini_block_idx];
        if width > 32 {
            return Err(ParquetError::corrupt(format!(
                "mini block bit width {} is larger than 32",
                width
            )));
        }

        self.scratch
            .resize(packed_len(self.values_per_mini_block, width), 0);
        self.reader
            .read_exact(&mut self.scratch)
            .eof_context(|| "not enough data to decode mini block")?;

        self.deltas.resize(self.values_per_mini_block, 0);
        unpack_u32(&self.scratch, width, &mut self.deltas)?;
        self.delta_pos = 0;
        self.mini_block_idx += 1;
        Ok(())
    }
}
