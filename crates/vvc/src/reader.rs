use std::io;

use scuffle_bytes_util::BitReader;
use scuffle_expgolomb::BitReaderExpGolombExt;

use crate::error::{Result, VvcError};

/// A single syntax element read from the bitstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldRecord {
    /// The name of the syntax element.
    pub name: &'static str,
    /// The decoded value. Flags are `0` or `1`.
    pub value: i64,
    /// The number of bits the element occupied.
    pub bit_count: usize,
}

/// An MSB-first bit reader over an RBSP (emulation prevention bytes already removed).
///
/// Every read takes the name of the syntax element being read. The name is used for error
/// messages, `trace` level logging, and the optional field log.
pub struct RbspReader<'a> {
    bit_reader: BitReader<io::Cursor<&'a [u8]>>,
    data: &'a [u8],
    bit_pos: usize,
    field_log: Option<Vec<FieldRecord>>,
}

impl std::fmt::Debug for RbspReader<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RbspReader")
            .field("bit_pos", &self.bit_pos)
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}

impl<'a> RbspReader<'a> {
    /// Creates a reader positioned at the first bit of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self::with_bit_offset(data, 0)
    }

    /// Creates a reader positioned `bit_offset` bits into `data`.
    ///
    /// This is used to skip the NAL unit header, so the offset is expected to be whole bytes.
    /// Any remaining bits are skipped on the first read.
    pub fn with_bit_offset(data: &'a [u8], bit_offset: usize) -> Self {
        let start = (bit_offset / 8).min(data.len());
        let mut reader = Self {
            bit_reader: BitReader::new_from_slice(&data[start..]),
            data,
            bit_pos: start * 8,
            field_log: None,
        };
        // a failure here leaves the reader exhausted, which the next read reports
        let _ = reader.skip_bits("bit_offset", bit_offset - start * 8);
        reader
    }

    /// Enables recording of every syntax element read.
    pub fn with_field_log(mut self) -> Self {
        self.field_log = Some(Vec::new());
        self
    }

    /// Takes the recorded syntax elements, leaving the log empty.
    ///
    /// Returns an empty list if recording was never enabled.
    pub fn take_field_log(&mut self) -> Vec<FieldRecord> {
        self.field_log.as_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Number of bits consumed so far.
    #[inline]
    pub const fn bits_read(&self) -> usize {
        self.bit_pos
    }

    /// Number of bits left in the buffer.
    #[inline]
    pub const fn bits_remaining(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bit_pos)
    }

    /// Returns `true` if the cursor is on a byte boundary.
    #[inline]
    pub const fn byte_aligned(&self) -> bool {
        self.bit_pos % 8 == 0
    }

    /// Returns `true` if there is more data before the `rbsp_stop_one_bit`.
    ///
    /// The stop bit is the last bit equal to 1 in the buffer.
    pub fn more_rbsp_data(&self) -> bool {
        let Some((byte_idx, byte)) = self.data.iter().enumerate().rev().find(|(_, b)| **b != 0) else {
            return false;
        };

        let stop_bit_pos = byte_idx * 8 + 7 - byte.trailing_zeros() as usize;
        self.bit_pos < stop_bit_pos
    }

    fn peek_bit(&self, pos: usize) -> Option<bool> {
        self.data.get(pos / 8).map(|byte| (byte >> (7 - pos % 8)) & 1 == 1)
    }

    const fn exhausted(&self, field: &'static str, requested: usize) -> VvcError {
        VvcError::BitstreamExhausted {
            field,
            requested,
            remaining: self.bits_remaining(),
        }
    }

    fn ensure_remaining(&self, field: &'static str, requested: usize) -> Result<()> {
        if requested > self.bits_remaining() {
            Err(self.exhausted(field, requested))
        } else {
            Ok(())
        }
    }

    fn record(&mut self, name: &'static str, value: i64, bit_count: usize) {
        self.bit_pos += bit_count;
        tracing::trace!(field = name, value, bit_count, "read syntax element");
        if let Some(log) = &mut self.field_log {
            log.push(FieldRecord { name, value, bit_count });
        }
    }

    /// Reads `n` bits (at most 64) as an unsigned integer, `u(n)`.
    pub fn read_bits(&mut self, name: &'static str, n: u32) -> Result<u64> {
        debug_assert!(n <= 64, "cannot read more than 64 bits at once");
        self.ensure_remaining(name, n as usize)?;

        let value = if n == 0 { 0 } else { self.bit_reader.read_bits(n as u8)? };
        self.record(name, value as i64, n as usize);
        Ok(value)
    }

    /// Reads a single bit as a flag, `u(1)`.
    pub fn read_flag(&mut self, name: &'static str) -> Result<bool> {
        self.ensure_remaining(name, 1)?;

        let bit = self.bit_reader.read_bit()?;
        self.record(name, bit as i64, 1);
        Ok(bit)
    }

    /// Returns the length of the Exp-Golomb code at the cursor.
    ///
    /// A prefix of more than 32 zero bits is rejected before anything is consumed.
    fn exp_golomb_len(&self, name: &'static str) -> Result<usize> {
        let leading_zeros = (self.bit_pos..)
            .take(33)
            .map(|pos| self.peek_bit(pos))
            .position(|bit| bit != Some(false));

        match leading_zeros.map(|n| (n, self.peek_bit(self.bit_pos + n))) {
            Some((n, Some(true))) => {
                let len = 2 * n + 1;
                self.ensure_remaining(name, len)?;
                Ok(len)
            }
            Some((_, None)) => Err(self.exhausted(name, self.bits_remaining() + 1)),
            _ => Err(VvcError::RangeViolation {
                field: name,
                value: 33,
                min: 0,
                max: 32,
            }),
        }
    }

    /// Reads an unsigned Exp-Golomb coded value, `ue(v)`.
    pub fn read_uev(&mut self, name: &'static str) -> Result<u64> {
        let len = self.exp_golomb_len(name)?;
        let value = self.bit_reader.read_exp_golomb()?;
        self.record(name, value as i64, len);
        Ok(value)
    }

    /// Reads a signed Exp-Golomb coded value, `se(v)`.
    pub fn read_sev(&mut self, name: &'static str) -> Result<i64> {
        let len = self.exp_golomb_len(name)?;
        let value = self.bit_reader.read_signed_exp_golomb()?;
        self.record(name, value, len);
        Ok(value)
    }

    /// Skips `n` bits without interpreting them.
    pub fn skip_bits(&mut self, name: &'static str, n: usize) -> Result<()> {
        self.ensure_remaining(name, n)?;
        if n == 0 {
            return Ok(());
        }

        self.bit_reader.seek_bits(n as i64)?;
        self.bit_pos += n;
        Ok(())
    }

    /// Reads zero bits until the cursor is byte aligned.
    pub fn read_zero_bits_until_aligned(&mut self, name: &'static str) -> Result<()> {
        while !self.byte_aligned() {
            if self.read_flag(name)? {
                return Err(VvcError::NonZeroAlignment(name));
            }
        }

        Ok(())
    }

    /// Reads `byte_alignment()`: a one bit followed by zero bits up to the next byte boundary.
    pub fn read_byte_alignment(&mut self) -> Result<()> {
        if !self.read_flag("byte_alignment_bit_equal_to_one")? {
            return Err(VvcError::TrailingBits);
        }

        self.read_zero_bits_until_aligned("byte_alignment_bit_equal_to_zero")
    }

    /// Reads `rbsp_trailing_bits()`.
    pub fn read_rbsp_trailing_bits(&mut self) -> Result<()> {
        if !self.read_flag("rbsp_stop_one_bit")? {
            return Err(VvcError::TrailingBits);
        }

        self.read_zero_bits_until_aligned("rbsp_alignment_zero_bit")
    }

    /// Consumes `*_extension_data_flag` bits while there is more RBSP data.
    pub fn skip_extension_data(&mut self, name: &'static str) -> Result<()> {
        while self.more_rbsp_data() {
            self.read_flag(name)?;
        }

        Ok(())
    }
}

/// `Ceil(Log2(n))` as used for fixed length codes whose range depends on a derived count.
pub(crate) const fn ceil_log2(n: u64) -> u32 {
    if n <= 1 { 0 } else { 64 - (n - 1).leading_zeros() }
}
