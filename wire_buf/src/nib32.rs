use core::fmt::{Debug, Formatter};

use crate::{BitReader, BitWriter, Error};

/// Variable length encoded u32 based on nibbles, used in bitwise scopes.
/// Each nibble carries 1 bit indicating whether there are more nibbles + 3 bits from the original number,
/// lowest 3 bits first.
#[derive(Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UNib32(pub u32);

const ONE_MORE_NIBBLE: u8 = 0b1000;

impl UNib32 {
    pub fn len_nibbles(&self) -> usize {
        if self.0 == 0 {
            1
        } else {
            ((32 - self.0.leading_zeros()) as usize).div_ceil(3)
        }
    }

    pub(crate) fn write_forward(&self, wr: &mut BitWriter<'_, '_>) -> Result<(), Error> {
        let nibbles = self.len_nibbles();
        // Whole number or nothing
        wr.reserve_bits(nibbles * 4)?;
        let mut val = self.0;
        for i in 0..nibbles {
            let nib = (val & 0b111) as u8;
            let nib = if i + 1 < nibbles {
                nib | ONE_MORE_NIBBLE
            } else {
                nib
            };
            wr.write_un8(4, nib)?;
            val >>= 3;
        }
        Ok(())
    }

    pub(crate) fn read_forward(rd: &mut BitReader<'_, '_>) -> Result<Self, Error> {
        let mut num = 0;
        let mut offset = 0;
        for i in 0..=10 {
            let nib = rd.read_un8(4)?;
            if i == 10 {
                // 11th nibble should be the last for u32
                if nib & ONE_MORE_NIBBLE != 0 {
                    return Err(Error::MalformedUNib32);
                }
            }
            num |= (nib as u32 & 0b111) << offset;
            if nib & ONE_MORE_NIBBLE == 0 {
                break;
            }
            offset += 3;
        }
        Ok(UNib32(num))
    }
}

impl Debug for UNib32 {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}
