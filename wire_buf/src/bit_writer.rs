use crate::handle::overflow;
use crate::nib32::UNib32;
use crate::un::{low_mask, write_unx};
use crate::{BufWriter, Error};

/// Bitwise scope over a [BufWriter], created with [BufWriter::enter_bitwise_context].
///
/// Bits are packed starting from the least significant bit of each byte. A byte is zeroed when
/// its first bit is written, so unused high bits of the last byte are always 0.
/// Dropping the scope moves the byte cursor past the last touched byte.
///
/// Every bit operation checks capacity (growing owned storage when allowed), there is no
/// unchecked tier in bitwise mode.
pub struct BitWriter<'w, 'a> {
    wr: &'w mut BufWriter<'a>,
    // Absolute position in bits from the start of the buffer
    bit_pos: usize,
}

impl<'w, 'a> BitWriter<'w, 'a> {
    pub(crate) fn new(wr: &'w mut BufWriter<'a>) -> Self {
        let bit_pos = wr.handle.cursor * 8;
        BitWriter { wr, bit_pos }
    }

    /// Make room for `bit_count` more bits. Returns false if they cannot fit.
    pub fn try_begin_write_bits(&mut self, bit_count: usize) -> bool {
        let Some(end) = self.bit_pos.checked_add(bit_count) else {
            return false;
        };
        let end_byte = end.div_ceil(8);
        if end_byte > self.wr.capacity() && !self.wr.grow(end_byte) {
            #[cfg(feature = "defmt-extended")]
            defmt::trace!("begin_write_bits({}) rejected at bit {}", bit_count, self.bit_pos);
            #[cfg(feature = "tracing-extended")]
            tracing::trace!("begin_write_bits({bit_count}) rejected at bit {}", self.bit_pos);
            return false;
        }
        self.wr.handle.commit(end_byte);
        true
    }

    pub(crate) fn reserve_bits(&mut self, bit_count: usize) -> Result<(), Error> {
        if self.try_begin_write_bits(bit_count) {
            Ok(())
        } else {
            Err(overflow(
                self.bit_pos / 8,
                (self.bit_pos % 8 + bit_count).div_ceil(8),
                self.wr.max_capacity(),
            ))
        }
    }

    pub fn write_bit(&mut self, bit: bool) -> Result<(), Error> {
        self.write_bits(bit as u64, 1)
    }

    /// Write the lower `bit_count` bits of `value`, least significant first.
    pub fn write_bits(&mut self, value: u64, bit_count: u8) -> Result<(), Error> {
        if bit_count > 64 {
            return Err(Error::InvalidBitCount);
        }
        self.reserve_bits(bit_count as usize)?;
        let capacity = self.wr.capacity();
        let mut written = 0u8;
        while written < bit_count {
            let byte_idx = self.bit_pos / 8;
            let offset = (self.bit_pos % 8) as u8;
            let take = (8 - offset).min(bit_count - written);
            let chunk = ((value >> written) & low_mask(take)) as u8;
            let Some(byte) = self.wr.handle.storage.as_mut_slice().get_mut(byte_idx) else {
                return Err(overflow(byte_idx, 1, capacity));
            };
            if offset == 0 {
                *byte = 0;
            }
            *byte |= chunk << offset;
            self.bit_pos += take as usize;
            written += take;
        }
        Ok(())
    }

    /// Write a whole byte at the current, possibly unaligned, bit position.
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.write_bits(byte as u64, 8)
    }

    write_unx!(write_un8, u8, 8);
    write_unx!(write_un16, u16, 16);
    write_unx!(write_un32, u32, 32);
    write_unx!(write_un64, u64, 64);

    /// Write a variable length u32, 3 bits per nibble.
    pub fn write_unib32(&mut self, value: u32) -> Result<(), Error> {
        UNib32(value).write_forward(self)
    }

    /// Absolute position in bits.
    pub fn bit_position(&self) -> usize {
        self.bit_pos
    }
}

impl Drop for BitWriter<'_, '_> {
    fn drop(&mut self) {
        self.wr.handle.cursor = self.bit_pos.div_ceil(8);
        self.wr.handle.exit_bit_mode();

        #[cfg(feature = "tracing-extended")]
        tracing::trace!("exit bitwise write at {}", self.wr.handle.cursor);
    }
}
