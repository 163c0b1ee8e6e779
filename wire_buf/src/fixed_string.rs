use core::fmt::{Debug, Display, Formatter};

use crate::buf_writer::len_prefix;
use crate::traits::{DeserializeWire, SerializationKind, SerializeWire};
use crate::{BufReader, BufWriter, Error};

/// UTF-8 text stored inline in `N` bytes.
///
/// Only the logical length and the used bytes go on the wire, the unused tail is never sent.
#[derive(Copy, Clone)]
pub struct FixedString<const N: usize> {
    len: usize,
    bytes: [u8; N],
}

impl<const N: usize> Default for FixedString<N> {
    fn default() -> Self {
        FixedString {
            len: 0,
            bytes: [0u8; N],
        }
    }
}

impl<const N: usize> FixedString<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `s`, fails without modifying self if it does not fit.
    pub fn push_str(&mut self, s: &str) -> Result<(), Error> {
        let end = self.len + s.len();
        if end > N {
            return Err(Error::FixedStringTooLong {
                len: end,
                capacity: N,
            });
        }
        self.bytes[self.len..end].copy_from_slice(s.as_bytes());
        self.len = end;
        Ok(())
    }

    pub fn as_str(&self) -> &str {
        // Contents are only ever filled from &str or validated on read
        core::str::from_utf8(self.as_bytes()).unwrap_or_default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<const N: usize> TryFrom<&str> for FixedString<N> {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        let mut fixed = FixedString::new();
        fixed.push_str(s)?;
        Ok(fixed)
    }
}

impl<const N: usize> PartialEq for FixedString<N> {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl<const N: usize> Eq for FixedString<N> {}

impl<const N: usize> core::hash::Hash for FixedString<N> {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl<const N: usize> Debug for FixedString<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

impl<const N: usize> Display for FixedString<N> {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for FixedString<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

impl<const N: usize> SerializeWire for FixedString<N> {
    const KIND: SerializationKind = SerializationKind::FixedString;

    fn wire_size(&self) -> usize {
        4 + self.len
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        wr.write_u32(len_prefix(self.len)?)?;
        wr.write_bytes(self.as_bytes())
    }
}

impl<const N: usize> FixedString<N> {
    fn read_body(rd: &mut BufReader<'_>, len: usize, checked: bool) -> Result<Self, Error> {
        if len > N {
            return Err(Error::FixedStringTooLong { len, capacity: N });
        }
        let mut fixed = FixedString::new();
        if checked {
            rd.read_bytes_into_safe(&mut fixed.bytes[..len])?;
        } else {
            rd.read_bytes_into(&mut fixed.bytes[..len])?;
        }
        if core::str::from_utf8(&fixed.bytes[..len]).is_err() {
            return Err(Error::MalformedText);
        }
        fixed.len = len;
        Ok(fixed)
    }
}

impl<const N: usize> DeserializeWire for FixedString<N> {
    const KIND: SerializationKind = SerializationKind::FixedString;
    const MIN_WIRE_SIZE: usize = 4;

    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        let len = rd.read_u32()? as usize;
        Self::read_body(rd, len, false)
    }

    fn des_wire_safe(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        let len = rd.read_u32_safe()? as usize;
        Self::read_body(rd, len, true)
    }
}
