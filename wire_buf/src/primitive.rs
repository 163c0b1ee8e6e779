//! Numbers and bool, copied in native byte order.

use crate::traits::{DeserializeWire, SerializationKind, SerializeWire};
use crate::{BufReader, BufWriter, Error};

macro_rules! impl_primitive {
    ($($ty:ident),*) => {
        $(
            paste::paste! {
                impl BufWriter<'_> {
                    #[doc = "Unchecked write of `" $ty "` in native byte order."]
                    #[inline]
                    pub fn [<write_ $ty>](&mut self, value: $ty) -> Result<(), Error> {
                        self.write_bytes(&value.to_ne_bytes())
                    }

                    #[doc = "Checked write of `" $ty "` in native byte order."]
                    pub fn [<write_ $ty _safe>](&mut self, value: $ty) -> Result<(), Error> {
                        self.write_bytes_safe(&value.to_ne_bytes())
                    }
                }

                impl BufReader<'_> {
                    #[doc = "Unchecked read of `" $ty "` in native byte order."]
                    #[inline]
                    pub fn [<read_ $ty>](&mut self) -> Result<$ty, Error> {
                        let mut bytes = [0u8; size_of::<$ty>()];
                        self.read_bytes_into(&mut bytes)?;
                        Ok(<$ty>::from_ne_bytes(bytes))
                    }

                    #[doc = "Checked read of `" $ty "` in native byte order."]
                    pub fn [<read_ $ty _safe>](&mut self) -> Result<$ty, Error> {
                        let mut bytes = [0u8; size_of::<$ty>()];
                        self.read_bytes_into_safe(&mut bytes)?;
                        Ok(<$ty>::from_ne_bytes(bytes))
                    }
                }

                impl SerializeWire for $ty {
                    const KIND: SerializationKind = SerializationKind::Primitive;

                    #[inline]
                    fn wire_size(&self) -> usize {
                        size_of::<$ty>()
                    }

                    #[inline]
                    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
                        wr.[<write_ $ty>](*self)
                    }
                }

                impl DeserializeWire for $ty {
                    const KIND: SerializationKind = SerializationKind::Primitive;
                    const MIN_WIRE_SIZE: usize = size_of::<$ty>();

                    #[inline]
                    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error> {
                        rd.[<read_ $ty>]()
                    }
                }
            }
        )*
    };
}

impl_primitive!(u8, u16, u32, u64, u128, i8, i16, i32, i64, i128, f32, f64);

impl BufWriter<'_> {
    /// Unchecked write of a bool as one byte, 1 or 0.
    #[inline]
    pub fn write_bool(&mut self, value: bool) -> Result<(), Error> {
        self.write_byte(value as u8)
    }

    pub fn write_bool_safe(&mut self, value: bool) -> Result<(), Error> {
        self.write_byte_safe(value as u8)
    }
}

impl BufReader<'_> {
    /// Unchecked read of a bool, any non zero byte is true.
    #[inline]
    pub fn read_bool(&mut self) -> Result<bool, Error> {
        Ok(self.read_byte()? != 0)
    }

    pub fn read_bool_safe(&mut self) -> Result<bool, Error> {
        Ok(self.read_byte_safe()? != 0)
    }
}

impl SerializeWire for bool {
    const KIND: SerializationKind = SerializationKind::Primitive;

    fn wire_size(&self) -> usize {
        1
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        wr.write_bool(*self)
    }
}

impl DeserializeWire for bool {
    const KIND: SerializationKind = SerializationKind::Primitive;
    const MIN_WIRE_SIZE: usize = 1;

    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        rd.read_bool()
    }
}
