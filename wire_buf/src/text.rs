use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::{Display, Formatter};
use core::ops::Deref;

use crate::traits::{DeserializeWire, SerializationKind, SerializeWire};
use crate::{BufReader, BufWriter, Error};

/// Character width of a string on the wire. Not stored in the buffer, both sides must agree.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CharWidth {
    /// One byte per character, ASCII only.
    OneByte,
    /// UTF-16 code units in native byte order.
    #[default]
    Utf16,
}

impl CharWidth {
    /// Bytes per character or code unit.
    pub const fn unit_size(&self) -> usize {
        match self {
            CharWidth::OneByte => 1,
            CharWidth::Utf16 => 2,
        }
    }

    /// Bytes taken by `count` characters, None on overflow.
    pub fn byte_len(&self, count: usize) -> Option<usize> {
        count.checked_mul(self.unit_size())
    }
}

/// Encoded size of `s` in the given width, including the u32 length prefix.
/// Non-ASCII text has no one-byte encoding, its size is given as if every byte was a character.
pub fn str_wire_size(s: &str, width: CharWidth) -> usize {
    4 + match width {
        CharWidth::OneByte => s.len(),
        CharWidth::Utf16 => s.encode_utf16().count() * 2,
    }
}

pub(crate) fn decode_chars(bytes: &[u8], width: CharWidth) -> Result<String, Error> {
    match width {
        CharWidth::OneByte => {
            if !bytes.is_ascii() {
                return Err(Error::MalformedText);
            }
            let mut s = String::with_capacity(bytes.len());
            s.extend(bytes.iter().map(|&b| b as char));
            Ok(s)
        }
        CharWidth::Utf16 => {
            let units: Vec<u16> = bytes
                .chunks_exact(2)
                .map(|unit| u16::from_ne_bytes([unit[0], unit[1]]))
                .collect();
            String::from_utf16(&units).map_err(|_| Error::MalformedText)
        }
    }
}

impl SerializeWire for str {
    const KIND: SerializationKind = SerializationKind::String;

    fn wire_size(&self) -> usize {
        str_wire_size(self, CharWidth::Utf16)
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        #[cfg(feature = "tracing-extended")]
        tracing::trace!("string of {} bytes at {}", self.len(), wr.position());

        wr.write_str(self, CharWidth::Utf16)
    }
}

impl SerializeWire for String {
    const KIND: SerializationKind = SerializationKind::String;

    fn wire_size(&self) -> usize {
        self.as_str().wire_size()
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        self.as_str().ser_wire(wr)
    }
}

impl DeserializeWire for String {
    const KIND: SerializationKind = SerializationKind::String;
    const MIN_WIRE_SIZE: usize = 4;

    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        rd.read_str(CharWidth::Utf16)
    }

    fn des_wire_safe(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        rd.read_str_safe(CharWidth::Utf16)
    }
}

/// ASCII only string, dispatched as a [CharWidth::OneByte] string.
///
/// Plain [String] and [str] values use [CharWidth::Utf16] when written through
/// [write_value](BufWriter::write_value), wrap text in this type to get one byte per character
/// in struct fields and arrays.
#[derive(Clone, Debug, Default, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct AsciiString(String);

impl AsciiString {
    /// Fails with [Error::MalformedText] if `s` is not ASCII.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        if !s.is_ascii() {
            return Err(Error::MalformedText);
        }
        Ok(AsciiString(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl Deref for AsciiString {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for AsciiString {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        AsciiString::new(s)
    }
}

impl TryFrom<String> for AsciiString {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        AsciiString::new(s)
    }
}

impl Display for AsciiString {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for AsciiString {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=str}", self.as_str())
    }
}

impl SerializeWire for AsciiString {
    const KIND: SerializationKind = SerializationKind::String;

    fn wire_size(&self) -> usize {
        str_wire_size(&self.0, CharWidth::OneByte)
    }

    fn ser_wire(&self, wr: &mut BufWriter<'_>) -> Result<(), Error> {
        wr.write_str(&self.0, CharWidth::OneByte)
    }
}

impl DeserializeWire for AsciiString {
    const KIND: SerializationKind = SerializationKind::String;
    const MIN_WIRE_SIZE: usize = 4;

    fn des_wire(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        rd.read_str(CharWidth::OneByte).map(AsciiString)
    }

    fn des_wire_safe(rd: &mut BufReader<'_>) -> Result<Self, Error> {
        rd.read_str_safe(CharWidth::OneByte).map(AsciiString)
    }
}

#[cfg(test)]
mod tests {
    use crate::{AllocationMode, AsciiString, BufReader, BufWriter, CharWidth, Error};
    use hex_literal::hex;

    #[cfg(target_endian = "little")]
    #[test]
    fn one_byte_layout() {
        let mut wr = BufWriter::new(8);
        wr.write_str_safe("hi", CharWidth::OneByte).unwrap();
        assert_eq!(wr.as_slice(), hex!("02 00 00 00 68 69"));
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn utf16_layout() {
        let mut wr = BufWriter::new(16);
        wr.write_str_safe("hé", CharWidth::Utf16).unwrap();
        assert_eq!(wr.as_slice(), hex!("02 00 00 00 68 00 E9 00"));
    }

    #[test]
    fn utf16_round_trip() {
        for s in ["", "plain", "żółć", "emoji \u{1F600} pair"] {
            let mut wr = BufWriter::growable(0, 256);
            wr.write_value_safe(s).unwrap();
            assert_eq!(wr.len(), crate::text::str_wire_size(s, CharWidth::Utf16));
            let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
            assert_eq!(rd.read_value_safe::<String>().unwrap(), s);
        }
    }

    #[test]
    fn truncated_string() {
        let mut wr = BufWriter::new(16);
        wr.write_str_safe("hello", CharWidth::OneByte).unwrap();
        let bytes = &wr.as_slice()[..7];
        let mut rd = BufReader::borrowed(bytes);
        assert!(
            rd.read_str_safe(CharWidth::OneByte)
                .unwrap_err()
                .is_overflow()
        );
    }

    #[test]
    fn lone_surrogate_is_malformed() {
        let mut wr = BufWriter::new(8);
        wr.write_u32_safe(1).unwrap();
        wr.write_u16_safe(0xD800).unwrap();
        let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
        assert_eq!(rd.read_str_safe(CharWidth::Utf16), Err(Error::MalformedText));
    }

    #[test]
    fn non_ascii_one_byte_is_malformed() {
        let mut wr = BufWriter::new(8);
        wr.write_u32_safe(1).unwrap();
        wr.write_u8_safe(0xC3).unwrap();
        let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
        assert_eq!(rd.read_str_safe(CharWidth::OneByte), Err(Error::MalformedText));
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn ascii_string_dispatch() {
        let name = AsciiString::new("hi").unwrap();
        let mut wr = BufWriter::new(8);
        wr.write_value_safe(&name).unwrap();
        assert_eq!(wr.as_slice(), hex!("02 00 00 00 68 69"));
        let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
        assert_eq!(rd.read_value_safe::<AsciiString>(), Ok(name));
    }

    #[test]
    fn ascii_string_rejects_non_ascii() {
        assert_eq!(AsciiString::new("grüße"), Err(Error::MalformedText));
        assert_eq!(AsciiString::try_from("ok").unwrap().as_str(), "ok");
    }
}
