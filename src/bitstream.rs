/// Bit-level reader and writer over fixed-capacity byte buffers.
///
/// Both directions use the same bit-addressable contract: bits are
/// packed most-significant-bit-first within each byte, and multi-bit
/// fields travel with their most significant bit first. Buffers never
/// grow: the writer fails with [`HufError::Overflow`] the moment a
/// completed byte has nowhere to land, and the reader fails with
/// [`HufError::Truncated`] the moment it steps past the end. Fixed
/// capacity keeps overflow detection deterministic and the hot
/// bit-packing loop allocation-free.
use crate::{HufError, HufResult};

/// Writes individual bits and multi-bit fields into a byte buffer.
///
/// Completed bytes are committed at the byte cursor; bits of a partial
/// byte accumulate in a pending byte that never becomes observable
/// output until it wraps or [`BitWriter::finalize`] pads it out.
#[derive(Debug)]
pub struct BitWriter<'a> {
    buf: &'a mut [u8],
    /// Next byte slot to commit into.
    byte_pos: usize,
    /// Bits accumulated in `pending` (0..8).
    bit_pos: u8,
    /// Partially filled byte, MSB side first.
    pending: u8,
}

impl<'a> BitWriter<'a> {
    /// Create a writer over the full capacity of `buf`.
    pub fn new(buf: &'a mut [u8]) -> Self {
        BitWriter {
            buf,
            byte_pos: 0,
            bit_pos: 0,
            pending: 0,
        }
    }

    /// Append one bit.
    ///
    /// Fails with `Overflow` if this bit would complete a byte that has
    /// no slot left in the buffer. On failure the stream is unchanged:
    /// everything up to the last successful bit stays valid.
    pub fn write_bit(&mut self, bit: bool) -> HufResult<()> {
        // Check commit capacity before mutating anything.
        if self.bit_pos == 7 && self.byte_pos >= self.buf.len() {
            return Err(HufError::Overflow);
        }

        if bit {
            self.pending |= 1 << (7 - self.bit_pos);
        }
        self.bit_pos += 1;

        if self.bit_pos == 8 {
            self.buf[self.byte_pos] = self.pending;
            self.byte_pos += 1;
            self.pending = 0;
            self.bit_pos = 0;
        }

        Ok(())
    }

    /// Append the low `count` bits of `value`, most significant first.
    ///
    /// Stops at the first failing bit, leaving the stream at the last
    /// successful one.
    pub fn write_bits(&mut self, value: u64, count: u32) -> HufResult<()> {
        debug_assert!(count <= 64);
        for i in (0..count).rev() {
            self.write_bit((value >> i) & 1 == 1)?;
        }
        Ok(())
    }

    /// Commit any pending partial byte, zero-padded, and return the
    /// total number of committed bytes.
    ///
    /// Idempotent in effect: with nothing pending this is a no-op
    /// returning the same count. Fails with `Overflow` under the same
    /// capacity rule as [`BitWriter::write_bit`].
    pub fn finalize(&mut self) -> HufResult<usize> {
        if self.bit_pos > 0 {
            if self.byte_pos >= self.buf.len() {
                return Err(HufError::Overflow);
            }
            self.buf[self.byte_pos] = self.pending;
            self.byte_pos += 1;
            self.pending = 0;
            self.bit_pos = 0;
        }
        Ok(self.byte_pos)
    }

    /// Number of bytes committed so far (pending bits not included).
    pub fn bytes_committed(&self) -> usize {
        self.byte_pos
    }
}

/// Reads individual bits and multi-bit fields from a byte buffer.
#[derive(Debug)]
pub struct BitReader<'a> {
    data: &'a [u8],
    /// Byte currently being consumed.
    byte_pos: usize,
    /// Bits already consumed from the current byte (0..8).
    bit_pos: u8,
    /// Copy of the current byte, loaded on each byte boundary.
    current: u8,
}

impl<'a> BitReader<'a> {
    /// Create a reader over all of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        BitReader {
            data,
            byte_pos: 0,
            bit_pos: 0,
            current: 0,
        }
    }

    /// Read one bit, most-significant-first within each byte.
    ///
    /// Fails with `Truncated` when a fresh byte is needed and the
    /// buffer is exhausted.
    pub fn read_bit(&mut self) -> HufResult<bool> {
        if self.bit_pos == 0 {
            if self.byte_pos >= self.data.len() {
                return Err(HufError::Truncated);
            }
            self.current = self.data[self.byte_pos];
        }

        let bit = (self.current >> (7 - self.bit_pos)) & 1 == 1;

        self.bit_pos += 1;
        if self.bit_pos == 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(bit)
    }

    /// Read `count` bits into a value, most significant bit first.
    ///
    /// Fails with `Truncated` the moment any underlying bit read fails;
    /// the partial value is discarded.
    pub fn read_bits(&mut self, count: u32) -> HufResult<u64> {
        debug_assert!(count <= 64);
        let mut value = 0u64;
        for _ in 0..count {
            value = (value << 1) | self.read_bit()? as u64;
        }
        Ok(value)
    }
}
