#![cfg_attr(not(feature = "std"), no_std)]

//! Paired buffer reader / writer for real-time networked simulations.
//!
//! [BufWriter] accumulates bytes into an owned (fixed or growable) or borrowed buffer,
//! [BufReader] consumes them back, owning a copy or borrowing the bytes without copying.
//! Both offer two tiers for every operation:
//! * checked (`*_safe`) operations validate available space themselves and return [Error::Overflow];
//! * unchecked operations assume the caller reserved space with
//!   [try_begin_write](BufWriter::try_begin_write) / [try_begin_read](BufReader::try_begin_read).
//!   In debug builds (or with the `diagnostics` feature) going past the reserved amount is still caught.
//!
//! Bit level packing is available through a [BitWriter] / [BitReader] scope, which always
//! re-aligns to a byte boundary when dropped.
//!
//! Values are routed to the right routine by their [SerializationKind]: primitives, enums
//! ([impl_wire_enum]), plain old data structs ([impl_wire_pod]), user types ([NetworkSerializable]),
//! strings, [FixedString] and arrays of any of those.
//!
//! # Example
//! ```
//! use wire_buf::prelude::*;
//!
//! let mut wr = BufWriter::growable(8, 1024);
//! wr.write_u32_safe(0xDEAD_BEEF).unwrap();
//! wr.write_value_safe(&vec![1u16, 2, 3]).unwrap();
//! wr.write_str_safe("hi", CharWidth::OneByte).unwrap();
//!
//! let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
//! assert_eq!(rd.read_u32_safe().unwrap(), 0xDEAD_BEEF);
//! assert_eq!(rd.read_value_safe::<Vec<u16>>().unwrap(), [1, 2, 3]);
//! assert_eq!(rd.read_str_safe(CharWidth::OneByte).unwrap(), "hi");
//! assert_eq!(rd.position(), 20);
//! ```

extern crate alloc;

pub mod bit_reader;
pub mod bit_writer;
pub mod buf_reader;
pub mod buf_writer;
pub mod fixed_string;
pub mod handle;
pub mod kinds;
#[cfg(feature = "std")]
pub mod link;
pub mod nib32;
pub mod primitive;
pub mod text;
pub mod traits;
mod un;

pub use bit_reader::BitReader;
pub use bit_writer::BitWriter;
pub use buf_reader::BufReader;
pub use buf_writer::{BufWriter, Growth, WriterConfig};
pub use fixed_string::FixedString;
pub use handle::AllocationMode;
pub use kinds::WireEnum;
pub use text::{AsciiString, CharWidth};
pub use traits::{DeserializeWire, NetworkSerializable, SerializationKind, SerializeWire};

/// Re-exported for [impl_wire_pod] users.
pub use bytemuck;

#[derive(thiserror::Error, Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    #[error("access of {requested} bytes at offset {offset} overflows the buffer, {available} bytes available")]
    Overflow {
        offset: usize,
        requested: usize,
        available: usize,
    },
    #[error("protocol violation: {0}")]
    ProtocolViolation(Violation),
    #[error("{0:?} allocation is not supported for this source")]
    UnsupportedAllocationMode(AllocationMode),
    #[error("malformed text")]
    MalformedText,
    #[error("enum value out of range")]
    InvalidEnumValue,
    #[error("fixed string of {len} bytes does not fit into {capacity} bytes")]
    FixedStringTooLong { len: usize, capacity: usize },
    #[error("length does not fit into u32 prefix")]
    LengthTooLarge,
    #[error("invalid bit count")]
    InvalidBitCount,
    #[error("malformed UNib32")]
    MalformedUNib32,
}

/// Caller logic errors around bitwise scopes.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Violation {
    /// Bytewise access while a bitwise scope is open.
    BytewiseInBitMode,
    /// Bitwise scope entered while another one is still open.
    NestedBitMode,
}

impl core::fmt::Display for Violation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Violation::BytewiseInBitMode => f.write_str("bytewise access inside a bitwise scope"),
            Violation::NestedBitMode => f.write_str("nested bitwise scope"),
        }
    }
}

impl Error {
    pub fn is_overflow(&self) -> bool {
        matches!(self, Error::Overflow { .. })
    }
}

pub mod prelude {
    pub use crate::Error as WireBufError;
    pub use crate::bit_reader::BitReader;
    pub use crate::bit_writer::BitWriter;
    pub use crate::buf_reader::BufReader;
    pub use crate::buf_writer::{BufWriter, Growth, WriterConfig};
    pub use crate::fixed_string::FixedString;
    pub use crate::handle::AllocationMode;
    pub use crate::kinds::WireEnum;
    pub use crate::text::{AsciiString, CharWidth};
    pub use crate::traits::{
        DeserializeWire, NetworkSerializable, SerializationKind, SerializeWire,
    };
    pub use crate::{impl_wire_enum, impl_wire_pod};
}
