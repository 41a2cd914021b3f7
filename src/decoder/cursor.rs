//! Bounded cursor over a blob's property stream
//!
//! Reads stop at the footer boundary; offsets are reported relative to the
//! start of the whole blob.

use std::io::Cursor;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::names::NameId;

use super::DecodeError;

pub(super) struct BlobCursor<'a> {
    inner: Cursor<&'a [u8]>,
    /// Blob offset of `inner`'s first byte
    base: usize,
}

impl<'a> BlobCursor<'a> {
    /// `stream` is the property region, starting at blob offset `base`
    pub(super) fn new(stream: &'a [u8], base: usize) -> Self {
        Self {
            inner: Cursor::new(stream),
            base,
        }
    }

    /// Current blob offset
    pub(super) fn position(&self) -> usize {
        self.base + self.inner.position() as usize
    }

    /// Bytes left before the footer
    pub(super) fn remaining(&self) -> usize {
        self.inner.get_ref().len() - self.inner.position() as usize
    }

    fn ensure(&self, needed: usize) -> Result<(), DecodeError> {
        let available = self.remaining();
        if needed > available {
            return Err(DecodeError::Truncated {
                offset: self.position(),
                needed,
                available,
            });
        }
        Ok(())
    }

    fn read_with<T>(
        &mut self,
        width: usize,
        read: impl FnOnce(&mut Cursor<&'a [u8]>) -> std::io::Result<T>,
    ) -> Result<T, DecodeError> {
        self.ensure(width)?;
        let offset = self.position();
        read(&mut self.inner).map_err(|_| DecodeError::Truncated {
            offset,
            needed: width,
            available: 0,
        })
    }

    pub(super) fn skip(&mut self, count: usize) -> Result<(), DecodeError> {
        self.ensure(count)?;
        let next = self.inner.position() + count as u64;
        self.inner.set_position(next);
        Ok(())
    }

    /// Borrow the next `count` bytes and advance past them
    pub(super) fn take(&mut self, count: usize) -> Result<&'a [u8], DecodeError> {
        self.ensure(count)?;
        let start = self.inner.position() as usize;
        let stream: &'a [u8] = *self.inner.get_ref();
        self.inner.set_position((start + count) as u64);
        Ok(&stream[start..start + count])
    }

    pub(super) fn read_u8(&mut self) -> Result<u8, DecodeError> {
        self.read_with(1, |c| c.read_u8())
    }

    pub(super) fn read_u32(&mut self) -> Result<u32, DecodeError> {
        self.read_with(4, |c| c.read_u32::<LittleEndian>())
    }

    pub(super) fn read_i32(&mut self) -> Result<i32, DecodeError> {
        self.read_with(4, |c| c.read_i32::<LittleEndian>())
    }

    pub(super) fn read_name_id(&mut self) -> Result<NameId, DecodeError> {
        self.read_u32().map(NameId)
    }

    pub(super) fn read_f32(&mut self) -> Result<f32, DecodeError> {
        self.read_with(4, |c| c.read_f32::<LittleEndian>())
    }

    pub(super) fn read_f64(&mut self) -> Result<f64, DecodeError> {
        self.read_with(8, |c| c.read_f64::<LittleEndian>())
    }
}
