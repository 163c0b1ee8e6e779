use alloc::string::String;
use alloc::vec::Vec;

use crate::handle::{overflow, Handle, Storage};
use crate::text::{decode_chars, CharWidth};
use crate::{AllocationMode, BitReader, BufWriter, DeserializeWire, Error};

/// Buffer reader with a byte cursor, over an owned copy or a borrowed view of the input.
///
/// Mirrors [BufWriter]: `read_*_safe` methods check the remaining length themselves,
/// `read_*` methods rely on a prior [try_begin_read](BufReader::try_begin_read).
/// With diagnostics on, unchecked reads past the declared amount fail with [Error::Overflow]
/// even when the bytes are present.
pub struct BufReader<'a> {
    pub(crate) handle: Handle<Storage<'a>>,
}

impl<'a> BufReader<'a> {
    /// Create a reader over `bytes`, borrowing them or copying them into owned storage.
    pub fn new(bytes: &'a [u8], mode: AllocationMode) -> Self {
        match mode {
            AllocationMode::Borrowed => BufReader::borrowed(bytes),
            AllocationMode::Owned => BufReader::owned(bytes),
        }
    }

    /// Zero copy reader, cannot outlive `bytes`.
    pub fn borrowed(bytes: &'a [u8]) -> Self {
        BufReader {
            handle: Handle::new(Storage::Borrowed(bytes)),
        }
    }

    /// Reader over a private copy of `bytes`.
    pub fn owned(bytes: &[u8]) -> BufReader<'static> {
        BufReader::from_storage(Storage::Owned(bytes.to_vec()))
    }

    /// Take over a vector. A moved vector cannot be borrowed, so [AllocationMode::Borrowed] is rejected.
    pub fn from_vec(vec: Vec<u8>, mode: AllocationMode) -> Result<BufReader<'static>, Error> {
        match mode {
            AllocationMode::Owned => Ok(BufReader::from_storage(Storage::Owned(vec))),
            AllocationMode::Borrowed => Err(Error::UnsupportedAllocationMode(mode)),
        }
    }

    /// Reader over everything written so far by `wr`.
    pub fn from_writer(wr: &'a BufWriter<'_>, mode: AllocationMode) -> Self {
        BufReader::new(wr.as_slice(), mode)
    }

    /// Reader over `len` bytes of another reader starting at `offset`, independent of its cursor.
    /// Combined with [into_owned](BufReader::into_owned), promotes part of a short-lived borrowed
    /// view into an owned copy.
    pub fn from_reader(
        rd: &'a BufReader<'_>,
        mode: AllocationMode,
        offset: usize,
        len: usize,
    ) -> Result<Self, Error> {
        let bytes = rd.as_slice();
        let Some(bytes) = offset
            .checked_add(len)
            .and_then(|end| bytes.get(offset..end))
        else {
            return Err(overflow(offset, len, rd.len()));
        };
        Ok(BufReader::new(bytes, mode))
    }

    /// Detach the reader from the lifetime of its source, keeping the cursor.
    /// Owned storage is moved as is, borrowed bytes are copied once.
    pub fn into_owned(self) -> BufReader<'static> {
        BufReader {
            handle: self.handle.map_storage(|storage| match storage {
                Storage::Owned(vec) => Storage::Owned(vec),
                Storage::Borrowed(bytes) => Storage::Owned(bytes.to_vec()),
            }),
        }
    }

    pub(crate) fn from_storage(storage: Storage<'a>) -> Self {
        BufReader {
            handle: Handle::new(storage),
        }
    }

    /// Declare an intent to read `len` bytes. Returns false if fewer bytes remain.
    /// On success, the next `len` bytes can be read with unchecked `read_*` methods.
    pub fn try_begin_read(&mut self, len: usize) -> bool {
        match self.handle.cursor.checked_add(len) {
            Some(end) if end <= self.len() => {
                self.handle.commit(end);
                true
            }
            _ => {
                #[cfg(feature = "defmt-extended")]
                defmt::trace!("begin_read({}) rejected at {}", len, self.handle.cursor);
                #[cfg(feature = "tracing-extended")]
                tracing::trace!(
                    "begin_read({len}) rejected at {}, length {}",
                    self.handle.cursor,
                    self.len()
                );
                false
            }
        }
    }

    /// Same as [try_begin_read](BufReader::try_begin_read) with the minimal encoded size of `T`,
    /// which is the whole value for fixed size kinds and the length prefix for variable size ones.
    pub fn try_begin_read_value<T: DeserializeWire>(&mut self) -> bool {
        self.try_begin_read(T::MIN_WIRE_SIZE)
    }

    pub(crate) fn reserve(&mut self, len: usize) -> Result<(), Error> {
        self.handle.check_bytewise()?;
        if self.try_begin_read(len) {
            Ok(())
        } else {
            Err(overflow(self.handle.cursor, len, self.len()))
        }
    }

    /// Unchecked read of `len` bytes, returned as a view into the reader.
    #[inline]
    pub fn read_bytes(&mut self, len: usize) -> Result<&[u8], Error> {
        self.handle.check_unchecked(len)?;
        let start = self.handle.cursor;
        let Some(bytes) = start
            .checked_add(len)
            .and_then(|end| self.handle.storage.as_slice().get(start..end))
        else {
            return Err(overflow(start, len, self.len()));
        };
        self.handle.cursor = start + len;
        Ok(bytes)
    }

    pub fn read_bytes_safe(&mut self, len: usize) -> Result<&[u8], Error> {
        self.reserve(len)?;
        self.read_bytes(len)
    }

    /// Unchecked read filling the whole `dst`.
    #[inline]
    pub fn read_bytes_into(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        let src = self.read_bytes(dst.len())?;
        dst.copy_from_slice(src);
        Ok(())
    }

    pub fn read_bytes_into_safe(&mut self, dst: &mut [u8]) -> Result<(), Error> {
        self.reserve(dst.len())?;
        self.read_bytes_into(dst)
    }

    #[inline]
    pub fn read_byte(&mut self) -> Result<u8, Error> {
        Ok(self.read_bytes(1)?[0])
    }

    pub fn read_byte_safe(&mut self) -> Result<u8, Error> {
        Ok(self.read_bytes_safe(1)?[0])
    }

    /// Unchecked read of any value, dispatched by its [SerializationKind](crate::SerializationKind).
    #[inline]
    pub fn read_value<T: DeserializeWire>(&mut self) -> Result<T, Error> {
        T::des_wire(self)
    }

    /// Checked read of any value, dispatched by its [SerializationKind](crate::SerializationKind).
    pub fn read_value_safe<T: DeserializeWire>(&mut self) -> Result<T, Error> {
        self.handle.check_bytewise()?;
        T::des_wire_safe(self)
    }

    /// Unchecked verbatim read of a plain old data value in native layout.
    #[inline]
    pub fn read_pod<T: bytemuck::Pod>(&mut self) -> Result<T, Error> {
        let bytes = self.read_bytes(size_of::<T>())?;
        Ok(bytemuck::pod_read_unaligned(bytes))
    }

    pub fn read_pod_safe<T: bytemuck::Pod>(&mut self) -> Result<T, Error> {
        self.reserve(size_of::<T>())?;
        self.read_pod()
    }

    /// Checked read of a u32 element count followed by the verbatim bytes of every element.
    pub fn read_pod_vec_safe<T: bytemuck::Pod>(&mut self) -> Result<Vec<T>, Error> {
        let count = self.read_u32_safe()? as usize;
        let Some(len) = count.checked_mul(size_of::<T>()) else {
            return Err(overflow(self.handle.cursor, usize::MAX, self.len()));
        };
        let bytes = self.read_bytes_safe(len)?;
        Ok(bytes
            .chunks_exact(size_of::<T>().max(1))
            .take(count)
            .map(bytemuck::pod_read_unaligned)
            .collect())
    }

    /// Unchecked read of a string written with [write_str](BufWriter::write_str) in the same width.
    pub fn read_str(&mut self, width: CharWidth) -> Result<String, Error> {
        let chars = self.read_u32()? as usize;
        let len = width.byte_len(chars).ok_or(Error::LengthTooLarge)?;
        decode_chars(self.read_bytes(len)?, width)
    }

    pub fn read_str_safe(&mut self, width: CharWidth) -> Result<String, Error> {
        let chars = self.read_u32_safe()? as usize;
        let len = width.byte_len(chars).ok_or(Error::LengthTooLarge)?;
        decode_chars(self.read_bytes_safe(len)?, width)
    }

    /// Unchecked read of a u32 element count followed by that many elements.
    pub fn read_array<T: DeserializeWire>(&mut self) -> Result<Vec<T>, Error> {
        self.read_value()
    }

    pub fn read_array_safe<T: DeserializeWire>(&mut self) -> Result<Vec<T>, Error> {
        self.read_value_safe()
    }

    /// Open a bitwise scope at the current (byte aligned) position.
    /// Bytewise access is blocked until the returned [BitReader] is dropped.
    pub fn enter_bitwise_context(&mut self) -> Result<BitReader<'_, 'a>, Error> {
        self.handle.enter_bit_mode()?;

        #[cfg(feature = "tracing-extended")]
        tracing::trace!("enter bitwise read at {}", self.handle.cursor);

        Ok(BitReader::new(self))
    }

    /// Move the cursor, clamped to `[0, len]`. Used to re-read a header once the payload size is known.
    pub fn seek(&mut self, position: usize) {
        self.handle.cursor = position.min(self.len());
    }

    /// Current byte position of the cursor.
    #[inline]
    pub fn position(&self) -> usize {
        self.handle.cursor
    }

    /// Total amount of bytes in the reader.
    #[inline]
    pub fn len(&self) -> usize {
        self.handle.storage.as_slice().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bytes left between the cursor and the end.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.len() - self.handle.cursor
    }

    pub fn allocation_mode(&self) -> AllocationMode {
        self.handle.storage.mode()
    }

    /// All bytes of the reader, regardless of the cursor.
    pub fn as_slice(&self) -> &[u8] {
        self.handle.storage.as_slice()
    }
}

#[cfg(test)]
mod tests {
    use crate::{AllocationMode, BufReader, BufWriter, Error};
    use hex_literal::hex;

    #[test]
    fn bytes() {
        let buf = [1, 2, 3];
        let mut rd = BufReader::borrowed(&buf);
        assert_eq!(rd.read_byte_safe(), Ok(1));
        assert_eq!(rd.remaining(), 2);
        assert_eq!(rd.read_byte_safe(), Ok(2));
        assert_eq!(rd.remaining(), 1);
        assert_eq!(rd.read_byte_safe(), Ok(3));
        assert_eq!(rd.remaining(), 0);
        assert_eq!(
            rd.read_byte_safe(),
            Err(Error::Overflow {
                offset: 3,
                requested: 1,
                available: 0
            })
        );
    }

    #[cfg(target_endian = "little")]
    #[test]
    fn float() {
        let buf = [0, 0, 0x80, 0x3E];
        let mut rd = BufReader::borrowed(&buf);
        assert_eq!(rd.read_f32_safe(), Ok(0.25));
        assert_eq!(rd.remaining(), 0);
    }

    #[test]
    fn bounds() {
        let buf = [0u8; 10];
        for n in 0..=12 {
            let mut rd = BufReader::borrowed(&buf);
            rd.seek(3);
            assert_eq!(rd.try_begin_read(n), n <= 7);
            assert_eq!(rd.read_bytes_safe(n).is_ok(), n <= 7);
        }
    }

    #[test]
    fn seek_clamps() {
        let buf = hex!("01 02 03 04");
        let mut rd = BufReader::borrowed(&buf);
        rd.seek(10);
        assert_eq!(rd.position(), 4);
        rd.seek(2);
        assert_eq!(rd.read_byte_safe(), Ok(3));
    }

    #[test]
    fn from_reader_promotes_to_owned() {
        let mut owned: BufReader<'static> = {
            let buf = hex!("AA BB CC DD");
            let rd = BufReader::borrowed(&buf);
            let sub = BufReader::from_reader(&rd, AllocationMode::Owned, 1, 2).unwrap();
            let copy = sub.as_slice().as_ptr();
            let owned = sub.into_owned();
            assert_eq!(owned.as_slice().as_ptr(), copy);
            owned
        };
        assert_eq!(owned.allocation_mode(), AllocationMode::Owned);
        assert_eq!(owned.read_u16_safe(), Ok(u16::from_ne_bytes([0xBB, 0xCC])));
    }

    #[test]
    fn into_owned_keeps_cursor() {
        let mut promoted = {
            let buf = hex!("01 02 03");
            let mut rd = BufReader::borrowed(&buf);
            assert_eq!(rd.read_byte_safe(), Ok(1));
            rd.into_owned()
        };
        assert_eq!(promoted.allocation_mode(), AllocationMode::Owned);
        assert_eq!(promoted.position(), 1);
        assert_eq!(promoted.read_byte_safe(), Ok(2));
        assert_eq!(promoted.remaining(), 1);
    }

    #[test]
    fn from_reader_out_of_range() {
        let buf = [0u8; 4];
        let rd = BufReader::borrowed(&buf);
        assert!(
            BufReader::from_reader(&rd, AllocationMode::Borrowed, 3, 2)
                .err()
                .is_some_and(|e| e.is_overflow())
        );
    }

    #[test]
    fn from_vec_rejects_borrowed() {
        assert_eq!(
            BufReader::from_vec(vec![1, 2], AllocationMode::Borrowed).err(),
            Some(Error::UnsupportedAllocationMode(AllocationMode::Borrowed))
        );
        let mut rd = BufReader::from_vec(vec![1, 2], AllocationMode::Owned).unwrap();
        assert_eq!(rd.read_byte_safe(), Ok(1));
    }

    #[test]
    fn from_writer() {
        let mut wr = BufWriter::new(8);
        wr.write_bytes_safe(&[5, 6, 7]).unwrap();
        let rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
        assert_eq!(rd.len(), 3);
        assert_eq!(rd.allocation_mode(), AllocationMode::Borrowed);
    }

    #[test]
    fn pod_vec() {
        let mut wr = BufWriter::new(32);
        wr.write_pod_slice_safe(&[1u32, 2, 3]).unwrap();
        let mut rd = BufReader::from_writer(&wr, AllocationMode::Borrowed);
        assert_eq!(rd.read_pod_vec_safe::<u32>(), Ok(vec![1, 2, 3]));
        assert_eq!(rd.remaining(), 0);
    }

    #[cfg(any(debug_assertions, feature = "diagnostics"))]
    #[test]
    fn unchecked_read_past_watermark() {
        let buf = [0u8; 8];
        let mut rd = BufReader::borrowed(&buf);
        assert!(rd.try_begin_read_value::<u32>());
        assert_eq!(rd.read_u32(), Ok(0));
        assert_eq!(
            rd.read_u8(),
            Err(Error::Overflow {
                offset: 4,
                requested: 1,
                available: 0
            })
        );
    }
}
