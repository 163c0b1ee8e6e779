use crate::handle::overflow;
use crate::nib32::UNib32;
use crate::un::{low_mask, read_unx};
use crate::{BufReader, Error};

/// Bitwise scope over a [BufReader], created with [BufReader::enter_bitwise_context].
///
/// Mirrors [BitWriter](crate::BitWriter): bits are taken starting from the least significant bit
/// of each byte, and dropping the scope skips the rest of the last touched byte.
pub struct BitReader<'r, 'a> {
    rd: &'r mut BufReader<'a>,
    bit_pos: usize,
}

impl<'r, 'a> BitReader<'r, 'a> {
    pub(crate) fn new(rd: &'r mut BufReader<'a>) -> Self {
        let bit_pos = rd.handle.cursor * 8;
        BitReader { rd, bit_pos }
    }

    /// Returns false if fewer than `bit_count` bits are left.
    pub fn try_begin_read_bits(&mut self, bit_count: usize) -> bool {
        match self.bit_pos.checked_add(bit_count) {
            Some(end) if end <= self.rd.len() * 8 => {
                self.rd.handle.commit(end.div_ceil(8));
                true
            }
            _ => {
                #[cfg(feature = "tracing-extended")]
                tracing::trace!("begin_read_bits({bit_count}) rejected at bit {}", self.bit_pos);
                false
            }
        }
    }

    pub fn read_bit(&mut self) -> Result<bool, Error> {
        Ok(self.read_bits(1)? != 0)
    }

    /// Read `bit_count` bits, least significant first.
    pub fn read_bits(&mut self, bit_count: u8) -> Result<u64, Error> {
        if bit_count > 64 {
            return Err(Error::InvalidBitCount);
        }
        if !self.try_begin_read_bits(bit_count as usize) {
            return Err(overflow(
                self.bit_pos / 8,
                (self.bit_pos % 8 + bit_count as usize).div_ceil(8),
                self.rd.len(),
            ));
        }
        let bytes = self.rd.as_slice();
        let mut value = 0u64;
        let mut read = 0u8;
        while read < bit_count {
            let byte_idx = self.bit_pos / 8;
            let offset = (self.bit_pos % 8) as u8;
            let take = (8 - offset).min(bit_count - read);
            let Some(byte) = bytes.get(byte_idx) else {
                return Err(overflow(byte_idx, 1, bytes.len()));
            };
            let chunk = (*byte >> offset) as u64 & low_mask(take);
            value |= chunk << read;
            self.bit_pos += take as usize;
            read += take;
        }
        Ok(value)
    }

    /// Read a whole byte at the current, possibly unaligned, bit position.
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        Ok(self.read_bits(8)? as u8)
    }

    read_unx!(read_un8, u8, 8);
    read_unx!(read_un16, u16, 16);
    read_unx!(read_un32, u32, 32);
    read_unx!(read_un64, u64, 64);

    pub fn read_unib32(&mut self) -> Result<u32, Error> {
        Ok(UNib32::read_forward(self)?.0)
    }

    /// Absolute position in bits.
    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }

    /// Bits left until the end of the reader.
    pub fn bits_left(&self) -> usize {
        (self.rd.len() * 8).saturating_sub(self.bit_pos)
    }
}

impl Drop for BitReader<'_, '_> {
    fn drop(&mut self) {
        self.rd.handle.cursor = self.bit_pos.div_ceil(8).min(self.rd.len());
        self.rd.handle.exit_bit_mode();

        #[cfg(feature = "tracing-extended")]
        tracing::trace!("exit bitwise read at {}", self.rd.handle.cursor);
    }
}
