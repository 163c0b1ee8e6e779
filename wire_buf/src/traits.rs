use alloc::vec::Vec;

use crate::buf_writer::len_prefix;
use crate::{BufReader, BufWriter, Error};

/// Category of a type, selecting how it is laid out on the wire.
/// Never stored in the buffer itself, both sides agree on types out of band.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SerializationKind {
    /// Numbers and bool, copied in native layout.
    Primitive,
    /// Enum backed by an integer representation, see [impl_wire_enum](crate::impl_wire_enum).
    Enum,
    /// Plain old data struct copied verbatim, see [impl_wire_pod](crate::impl_wire_pod).
    Struct,
    /// User type with its own read / write logic, see [NetworkSerializable].
    Serializable,
    /// u32 length prefix followed by characters in a caller chosen [CharWidth](crate::CharWidth).
    String,
    /// u32 logical length followed by that many bytes, without the unused tail.
    FixedString,
    /// u32 element count followed by every element.
    Array,
}

pub trait SerializeWire {
    const KIND: SerializationKind;

    /// Exact amount of bytes [ser_wire](SerializeWire::ser_wire) will write.
    fn wire_size(&self) -> usize;

    /// Write self, assuming that [wire_size](SerializeWire::wire_size) bytes are already reserved.
    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error>;

    /// Reserve space and write self.
    fn ser_wire_safe(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        wr.reserve(self.wire_size())?;
        self.ser_wire(wr)
    }
}

pub trait DeserializeWire: Sized {
    const KIND: SerializationKind;
    /// Amount of bytes that is always present: whole value for fixed size kinds,
    /// length prefix for strings and arrays, 0 for [NetworkSerializable] types.
    const MIN_WIRE_SIZE: usize;

    /// Read a value, assuming that enough bytes were declared with [BufReader::try_begin_read].
    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error>;

    /// Read a value, checking every access. Variable size kinds must override this,
    /// the default only covers [MIN_WIRE_SIZE](DeserializeWire::MIN_WIRE_SIZE) bytes.
    fn des_wire_safe(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        rd.reserve(Self::MIN_WIRE_SIZE)?;
        Self::des_wire(rd)
    }
}

/// Type with hand written wire logic, calling back into the reader / writer.
///
/// Values are default constructed before [read_from](NetworkSerializable::read_from) is invoked.
/// [write_to](NetworkSerializable::write_to) must write exactly
/// [serialized_size](NetworkSerializable::serialized_size) bytes: checked writes reserve that much
/// up front, so unchecked writes can be used inside. Reads cannot know the size in advance,
/// prefer `read_*_safe` inside [read_from](NetworkSerializable::read_from).
pub trait NetworkSerializable: Default {
    fn serialized_size(&self) -> usize;

    fn write_to(&self, wr: &mut BufWriter<'_>) -> Result<(), Error>;

    fn read_from(&mut self, rd: &mut BufReader<'_>) -> Result<(), Error>;
}

impl<T: NetworkSerializable> SerializeWire for T {
    const KIND: SerializationKind = SerializationKind::Serializable;

    fn wire_size(&self) -> usize {
        self.serialized_size()
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        self.write_to(wr)
    }
}

impl<T: NetworkSerializable> DeserializeWire for T {
    const KIND: SerializationKind = SerializationKind::Serializable;
    const MIN_WIRE_SIZE: usize = 0;

    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        let mut value = T::default();
        value.read_from(rd)?;
        Ok(value)
    }
}

impl<T: SerializeWire> SerializeWire for [T] {
    const KIND: SerializationKind = SerializationKind::Array;

    fn wire_size(&self) -> usize {
        self.iter().fold(4, |size, item| size + item.wire_size())
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        let len = len_prefix(self.len())?;

        #[cfg(feature = "tracing-extended")]
        tracing::trace!("array of {len} at {}", wr.position());

        wr.write_u32(len)?;
        for item in self {
            item.ser_wire(wr)?;
        }
        Ok(())
    }
}

impl<T: SerializeWire> SerializeWire for Vec<T> {
    const KIND: SerializationKind = SerializationKind::Array;

    fn wire_size(&self) -> usize {
        self.as_slice().wire_size()
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        self.as_slice().ser_wire(wr)
    }
}

impl<T: DeserializeWire> DeserializeWire for Vec<T> {
    const KIND: SerializationKind = SerializationKind::Array;
    const MIN_WIRE_SIZE: usize = 4;

    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        let len = rd.read_u32()? as usize;
        // Length comes from the wire, do not trust it for allocation
        let mut items = Vec::with_capacity(len.min(rd.remaining()));
        for _ in 0..len {
            items.push(T::des_wire(rd)?);
        }
        Ok(items)
    }

    fn des_wire_safe(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        let len = rd.read_u32_safe()? as usize;

        #[cfg(feature = "defmt-extended")]
        defmt::trace!("array of {} at {}", len, rd.position());
        #[cfg(feature = "tracing-extended")]
        tracing::trace!("array of {len} at {}", rd.position());

        if len.saturating_mul(T::MIN_WIRE_SIZE) > rd.remaining() {
            return Err(Error::Overflow {
                offset: rd.position(),
                requested: len.saturating_mul(T::MIN_WIRE_SIZE),
                available: rd.remaining(),
            });
        }
        let mut items = Vec::with_capacity(len.min(rd.remaining()));
        for _ in 0..len {
            items.push(T::des_wire_safe(rd)?);
        }
        Ok(items)
    }
}
