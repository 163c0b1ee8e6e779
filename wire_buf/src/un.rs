macro_rules! write_unx {
    ($fn_name:ident, $base_ty:ty, $max_bit_count:literal) => {
        #[doc = "Write the lower `bit_count` bits (up to "]
        #[doc = stringify!($max_bit_count)]
        #[doc = ") of a "]
        #[doc = stringify!($base_ty)]
        #[doc = " number."]
        pub fn $fn_name(&mut self, bit_count: u8, value: $base_ty) -> Result<(), Error> {
            if bit_count > $max_bit_count {
                return Err(Error::InvalidBitCount);
            }
            self.write_bits(value as u64, bit_count)
        }
    };
}
pub(crate) use write_unx;

macro_rules! read_unx {
    ($fn_name:ident, $base_ty:ty, $max_bit_count:literal) => {
        #[doc = "Read `bit_count` bits (up to "]
        #[doc = stringify!($max_bit_count)]
        #[doc = ") into a "]
        #[doc = stringify!($base_ty)]
        #[doc = " number."]
        pub fn $fn_name(&mut self, bit_count: u8) -> Result<$base_ty, Error> {
            if bit_count > $max_bit_count {
                return Err(Error::InvalidBitCount);
            }
            // bit_count <= width of the result, so the cast is lossless
            Ok(self.read_bits(bit_count)? as $base_ty)
        }
    };
}
pub(crate) use read_unx;

/// Mask with the lower `bits` set, `bits` in 0..=64.
#[inline]
pub(crate) fn low_mask(bits: u8) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}
