use alloc::vec::Vec;

use crate::Error;

/// Whether a reader or writer frees its backing bytes.
///
/// Fixed at construction and never changes for the lifetime of the handle.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AllocationMode {
    /// Bytes are allocated by the handle and freed when it is dropped.
    Owned,
    /// Bytes belong to the caller, dropping the handle leaves them untouched.
    Borrowed,
}

/// Backing bytes of a reader.
pub(crate) enum Storage<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a [u8]),
}

impl Storage<'_> {
    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            Storage::Owned(vec) => vec.as_slice(),
            Storage::Borrowed(slice) => slice,
        }
    }

    pub(crate) fn mode(&self) -> AllocationMode {
        match self {
            Storage::Owned(_) => AllocationMode::Owned,
            Storage::Borrowed(_) => AllocationMode::Borrowed,
        }
    }
}

/// Backing bytes of a writer. Only the owned variant can be reallocated.
pub(crate) enum StorageMut<'a> {
    Owned(Vec<u8>),
    Borrowed(&'a mut [u8]),
}

impl StorageMut<'_> {
    #[inline]
    pub(crate) fn as_slice(&self) -> &[u8] {
        match self {
            StorageMut::Owned(vec) => vec.as_slice(),
            StorageMut::Borrowed(slice) => slice,
        }
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            StorageMut::Owned(vec) => vec.as_mut_slice(),
            StorageMut::Borrowed(slice) => slice,
        }
    }

    pub(crate) fn mode(&self) -> AllocationMode {
        match self {
            StorageMut::Owned(_) => AllocationMode::Owned,
            StorageMut::Borrowed(_) => AllocationMode::Borrowed,
        }
    }

    /// Resize owned storage to `new_len` bytes, keeping the existing prefix.
    /// Returns false for borrowed storage, which cannot be reallocated.
    pub(crate) fn resize(&mut self, new_len: usize) -> bool {
        match self {
            StorageMut::Owned(vec) => {
                vec.resize(new_len, 0);
                true
            }
            StorageMut::Borrowed(_) => false,
        }
    }
}

/// Cursor and bookkeeping shared by [BufReader](crate::BufReader) and [BufWriter](crate::BufWriter).
///
/// `cursor` never exceeds the storage length. `limit` and `in_bit_mode` only exist in diagnostics
/// builds (debug or `diagnostics` feature) and are used to catch callers that access more bytes
/// than they declared with begin-read / begin-write, or that mix bytewise and bitwise access.
pub(crate) struct Handle<S> {
    pub(crate) storage: S,
    pub(crate) cursor: usize,
    #[cfg(any(debug_assertions, feature = "diagnostics"))]
    limit: usize,
    #[cfg(any(debug_assertions, feature = "diagnostics"))]
    in_bit_mode: bool,
}

impl<S> Handle<S> {
    pub(crate) fn new(storage: S) -> Self {
        Handle {
            storage,
            cursor: 0,
            #[cfg(any(debug_assertions, feature = "diagnostics"))]
            limit: 0,
            #[cfg(any(debug_assertions, feature = "diagnostics"))]
            in_bit_mode: false,
        }
    }

    /// Same cursor and diagnostics state over converted storage.
    pub(crate) fn map_storage<T>(self, f: impl FnOnce(S) -> T) -> Handle<T> {
        Handle {
            storage: f(self.storage),
            cursor: self.cursor,
            #[cfg(any(debug_assertions, feature = "diagnostics"))]
            limit: self.limit,
            #[cfg(any(debug_assertions, feature = "diagnostics"))]
            in_bit_mode: self.in_bit_mode,
        }
    }

    /// Raise the watermark so that unchecked accesses up to `end` are considered pre-validated.
    #[inline(always)]
    pub(crate) fn commit(&mut self, end: usize) {
        #[cfg(any(debug_assertions, feature = "diagnostics"))]
        if end > self.limit {
            self.limit = end;
        }
        #[cfg(not(any(debug_assertions, feature = "diagnostics")))]
        let _ = end;
    }

    /// Validate an unchecked access of `len` bytes against the diagnostics state.
    #[inline(always)]
    pub(crate) fn check_unchecked(&self, len: usize) -> Result<(), Error> {
        #[cfg(any(debug_assertions, feature = "diagnostics"))]
        {
            self.check_bytewise()?;
            if self.cursor.saturating_add(len) > self.limit {
                return Err(Error::Overflow {
                    offset: self.cursor,
                    requested: len,
                    available: self.limit.saturating_sub(self.cursor),
                });
            }
        }
        #[cfg(not(any(debug_assertions, feature = "diagnostics")))]
        let _ = len;
        Ok(())
    }

    #[inline(always)]
    pub(crate) fn check_bytewise(&self) -> Result<(), Error> {
        #[cfg(any(debug_assertions, feature = "diagnostics"))]
        if self.in_bit_mode {
            return Err(Error::ProtocolViolation(crate::Violation::BytewiseInBitMode));
        }
        Ok(())
    }

    pub(crate) fn enter_bit_mode(&mut self) -> Result<(), Error> {
        #[cfg(any(debug_assertions, feature = "diagnostics"))]
        {
            if self.in_bit_mode {
                return Err(Error::ProtocolViolation(crate::Violation::NestedBitMode));
            }
            self.in_bit_mode = true;
        }
        Ok(())
    }

    pub(crate) fn exit_bit_mode(&mut self) {
        #[cfg(any(debug_assertions, feature = "diagnostics"))]
        {
            self.in_bit_mode = false;
        }
    }
}

/// Overflow error for an access of `requested` bytes at `offset` into `capacity` bytes.
#[inline]
pub(crate) fn overflow(offset: usize, requested: usize, capacity: usize) -> Error {
    Error::Overflow {
        offset,
        requested,
        available: capacity.saturating_sub(offset),
    }
}
