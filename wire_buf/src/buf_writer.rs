use alloc::vec;
use alloc::vec::Vec;

use crate::handle::{overflow, Handle, StorageMut};
use crate::text::{str_wire_size, CharWidth};
use crate::{AllocationMode, BitWriter, Error, SerializeWire};

/// How an owned growable writer picks its next capacity.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Growth {
    /// Double the capacity until the write fits.
    #[default]
    Double,
    /// Add the given amount of bytes until the write fits.
    Step(usize),
}

/// Construction parameters of an owned [BufWriter].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WriterConfig {
    /// Initially allocated bytes.
    pub capacity: usize,
    /// Upper bound for growth, equal to `capacity` for fixed size writers.
    pub max_capacity: usize,
    pub growth: Growth,
}

impl WriterConfig {
    pub fn fixed(capacity: usize) -> Self {
        WriterConfig {
            capacity,
            max_capacity: capacity,
            growth: Growth::Double,
        }
    }

    pub fn growable(capacity: usize, max_capacity: usize) -> Self {
        WriterConfig {
            capacity,
            max_capacity: max_capacity.max(capacity),
            growth: Growth::Double,
        }
    }

    pub fn with_growth(mut self, growth: Growth) -> Self {
        self.growth = growth;
        self
    }
}

/// Buffer writer with a byte cursor, over owned (fixed or growable) or borrowed storage.
///
/// Every write comes in two flavours:
/// * `write_*_safe` checks capacity itself (growing owned storage when allowed) and returns
///   [Error::Overflow] if the value does not fit;
/// * `write_*` assumes that [try_begin_write](BufWriter::try_begin_write) already reserved space.
///   With diagnostics on, writing past the reservation is reported as [Error::Overflow] even if
///   the buffer has room. Without diagnostics only the storage bounds are checked.
///
/// # Example
/// ```
/// let mut wr = wire_buf::BufWriter::new(16);
/// assert!(wr.try_begin_write(6));
/// wr.write_u16(7).unwrap();
/// wr.write_u32(0xAABB_CCDD).unwrap();
/// assert_eq!(wr.len(), 6);
/// assert!(wr.write_u64_safe(0).is_ok());
/// assert!(wr.write_u32_safe(0).unwrap_err().is_overflow());
/// ```
pub struct BufWriter<'a> {
    pub(crate) handle: Handle<StorageMut<'a>>,
    // Furthest position written before the last seek, see len()
    length: usize,
    max_capacity: usize,
    growth: Growth,
}

impl<'a> BufWriter<'a> {
    /// Fixed capacity writer with owned storage.
    pub fn new(capacity: usize) -> BufWriter<'static> {
        BufWriter::with_config(WriterConfig::fixed(capacity))
    }

    /// Owned writer that doubles its storage when needed, up to `max_capacity` bytes.
    pub fn growable(capacity: usize, max_capacity: usize) -> BufWriter<'static> {
        BufWriter::with_config(WriterConfig::growable(capacity, max_capacity))
    }

    pub fn with_config(config: WriterConfig) -> BufWriter<'static> {
        BufWriter {
            handle: Handle::new(StorageMut::Owned(vec![0u8; config.capacity])),
            length: 0,
            max_capacity: config.max_capacity.max(config.capacity),
            growth: config.growth,
        }
    }

    /// Fixed capacity writer over caller provided storage. Old contents of `buf` are overwritten
    /// as writing progresses, the storage is never freed or reallocated by the writer.
    pub fn borrowed(buf: &'a mut [u8]) -> Self {
        let max_capacity = buf.len();
        BufWriter {
            handle: Handle::new(StorageMut::Borrowed(buf)),
            length: 0,
            max_capacity,
            growth: Growth::Double,
        }
    }

    /// Take over a vector as fixed capacity owned storage, writing from the start.
    /// A moved vector cannot be borrowed, so [AllocationMode::Borrowed] is rejected.
    pub fn from_vec(vec: Vec<u8>, mode: AllocationMode) -> Result<BufWriter<'static>, Error> {
        if mode == AllocationMode::Borrowed {
            return Err(Error::UnsupportedAllocationMode(mode));
        }
        let max_capacity = vec.len();
        Ok(BufWriter {
            handle: Handle::new(StorageMut::Owned(vec)),
            length: 0,
            max_capacity,
            growth: Growth::Double,
        })
    }

    /// Declare an intent to write `len` bytes, growing owned storage if needed and allowed.
    /// Returns false if the bytes cannot fit. On success, the next `len` bytes can be written
    /// with unchecked `write_*` methods.
    pub fn try_begin_write(&mut self, len: usize) -> bool {
        let Some(end) = self.handle.cursor.checked_add(len) else {
            return false;
        };
        if end > self.capacity() && !self.grow(end) {
            #[cfg(feature = "defmt-extended")]
            defmt::trace!("begin_write({}) rejected at {}", len, self.handle.cursor);
            #[cfg(feature = "tracing-extended")]
            tracing::trace!(
                "begin_write({len}) rejected at {}, capacity {}",
                self.handle.cursor,
                self.capacity()
            );
            return false;
        }
        self.handle.commit(end);
        true
    }

    /// Same as [try_begin_write](BufWriter::try_begin_write) with the encoded size of `value`.
    pub fn try_begin_write_value<T: SerializeWire + ?Sized>(&mut self, value: &T) -> bool {
        self.try_begin_write(value.wire_size())
    }

    /// Checked counterpart of try_begin_write used by all `*_safe` methods.
    pub(crate) fn reserve(&mut self, len: usize) -> Result<(), Error> {
        self.handle.check_bytewise()?;
        if self.try_begin_write(len) {
            Ok(())
        } else {
            Err(overflow(self.handle.cursor, len, self.max_capacity))
        }
    }

    /// Grow owned storage so that at least `required` bytes fit.
    pub(crate) fn grow(&mut self, required: usize) -> bool {
        if required > self.max_capacity {
            return false;
        }
        let mut new_capacity = self.capacity().max(1);
        while new_capacity < required {
            new_capacity = match self.growth {
                Growth::Double => new_capacity.saturating_mul(2),
                Growth::Step(step) => new_capacity.saturating_add(step.max(1)),
            };
        }
        let new_capacity = new_capacity.min(self.max_capacity);
        let grown = self.handle.storage.resize(new_capacity);

        #[cfg(feature = "defmt-extended")]
        defmt::debug!("grow to {} bytes: {}", new_capacity, grown);
        #[cfg(feature = "tracing-extended")]
        tracing::debug!("grow to {new_capacity} bytes (required {required}): {grown}");

        grown
    }

    /// Unchecked write of raw bytes.
    #[inline]
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.handle.check_unchecked(bytes.len())?;
        let start = self.handle.cursor;
        let end = start + bytes.len();
        let capacity = self.capacity();
        let Some(dst) = self.handle.storage.as_mut_slice().get_mut(start..end) else {
            return Err(overflow(start, bytes.len(), capacity));
        };
        dst.copy_from_slice(bytes);
        self.handle.cursor = end;
        Ok(())
    }

    /// Write raw bytes without a length prefix. Reader must know the length by other means.
    pub fn write_bytes_safe(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.reserve(bytes.len())?;
        self.write_bytes(bytes)
    }

    #[inline]
    pub fn write_byte(&mut self, byte: u8) -> Result<(), Error> {
        self.write_bytes(&[byte])
    }

    pub fn write_byte_safe(&mut self, byte: u8) -> Result<(), Error> {
        self.write_bytes_safe(&[byte])
    }

    /// Unchecked write of any value, dispatched by its [SerializationKind](crate::SerializationKind).
    #[inline]
    pub fn write_value<T: SerializeWire + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        value.ser_wire(self)
    }

    /// Checked write of any value, dispatched by its [SerializationKind](crate::SerializationKind).
    pub fn write_value_safe<T: SerializeWire + ?Sized>(&mut self, value: &T) -> Result<(), Error> {
        self.handle.check_bytewise()?;
        value.ser_wire_safe(self)
    }

    /// Unchecked verbatim copy of a plain old data value in native layout.
    #[inline]
    pub fn write_pod<T: bytemuck::Pod>(&mut self, value: &T) -> Result<(), Error> {
        self.write_bytes(bytemuck::bytes_of(value))
    }

    pub fn write_pod_safe<T: bytemuck::Pod>(&mut self, value: &T) -> Result<(), Error> {
        self.write_bytes_safe(bytemuck::bytes_of(value))
    }

    /// Checked write of a u32 element count followed by the verbatim bytes of every element.
    pub fn write_pod_slice_safe<T: bytemuck::Pod>(&mut self, values: &[T]) -> Result<(), Error> {
        let bytes: &[u8] = bytemuck::cast_slice(values);
        let len = len_prefix(values.len())?;
        self.reserve(4 + bytes.len())?;
        self.write_bytes(&len.to_ne_bytes())?;
        self.write_bytes(bytes)
    }

    /// Unchecked write of a string: u32 length prefix and characters in the selected width.
    pub fn write_str(&mut self, s: &str, width: CharWidth) -> Result<(), Error> {
        match width {
            CharWidth::OneByte => {
                if !s.is_ascii() {
                    return Err(Error::MalformedText);
                }
                self.write_bytes(&len_prefix(s.len())?.to_ne_bytes())?;
                self.write_bytes(s.as_bytes())
            }
            CharWidth::Utf16 => {
                let units = s.encode_utf16().count();
                self.write_bytes(&len_prefix(units)?.to_ne_bytes())?;
                for unit in s.encode_utf16() {
                    self.write_bytes(&unit.to_ne_bytes())?;
                }
                Ok(())
            }
        }
    }

    pub fn write_str_safe(&mut self, s: &str, width: CharWidth) -> Result<(), Error> {
        if width == CharWidth::OneByte && !s.is_ascii() {
            return Err(Error::MalformedText);
        }
        self.reserve(str_wire_size(s, width))?;
        self.write_str(s, width)
    }

    /// Unchecked write of a u32 element count followed by every element.
    pub fn write_array<T: SerializeWire>(&mut self, values: &[T]) -> Result<(), Error> {
        values.ser_wire(self)
    }

    pub fn write_array_safe<T: SerializeWire>(&mut self, values: &[T]) -> Result<(), Error> {
        self.write_value_safe(values)
    }

    /// Open a bitwise scope at the current (byte aligned) position.
    /// Bytewise access is blocked until the returned [BitWriter] is dropped.
    pub fn enter_bitwise_context(&mut self) -> Result<BitWriter<'_, 'a>, Error> {
        self.handle.enter_bit_mode()?;

        #[cfg(feature = "tracing-extended")]
        tracing::trace!("enter bitwise write at {}", self.handle.cursor);

        Ok(BitWriter::new(self))
    }

    /// Move the cursor, clamped to capacity. Bytes written past the new position still count
    /// towards [len](BufWriter::len) until [truncate](BufWriter::truncate) is called.
    /// Seeking past the end zero fills the gap, so stale storage contents never reach [as_slice](BufWriter::as_slice).
    pub fn seek(&mut self, position: usize) {
        let len = self.len();
        let position = position.min(self.capacity());
        if position > len {
            if let Some(gap) = self.handle.storage.as_mut_slice().get_mut(len..position) {
                gap.fill(0);
            }
        }
        self.length = len;
        self.handle.cursor = position;
    }

    /// Forget written bytes past `len` and move the cursor back if it was beyond.
    pub fn truncate(&mut self, len: usize) {
        let len = len.min(self.len());
        self.length = len;
        self.handle.cursor = self.handle.cursor.min(len);
    }

    /// Current byte position of the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.handle.cursor
    }

    /// Amount of written bytes: the furthest position reached.
    #[inline]
    pub fn len(&self) -> usize {
        self.length.max(self.handle.cursor)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Currently allocated bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.handle.storage.as_slice().len()
    }

    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.handle.storage.mode()
    }

    /// Written bytes, without copying. This is the view handed over to a link for sending.
    pub fn as_slice(&self) -> &[u8] {
        &self.handle.storage.as_slice()[..self.len()]
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.as_slice().to_vec()
    }

    /// Consume the writer, returning written bytes. Owned storage is reused, borrowed one is copied.
    pub fn into_vec(self) -> Vec<u8> {
        let len = self.len();
        match self.handle.storage {
            StorageMut::Owned(mut vec) => {
                vec.truncate(len);
                vec
            }
            StorageMut::Borrowed(slice) => slice[..len].to_vec(),
        }
    }
}

pub(crate) fn len_prefix(len: usize) -> Result<u32, Error> {
    u32::try_from(len).map_err(|_| Error::LengthTooLarge)
}
