use byteorder::{ReadBytesExt, BE};
use std::io::Cursor;

use crate::error::ClassFileError;

/// A forward-only big-endian reader over a borrowed byte slice.
///
/// Every multi-byte primitive is read big-endian, matching the class-file
/// wire format. `sub_reader` carves out a length-bounded child reader that
/// cannot observe bytes past its declared budget; attribute decoding relies
/// on this to keep a malformed inner length from desynchronising the outer
/// stream.
pub struct Reader<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> Reader<'a> {
    pub fn new(bytes: &'a [u8]) -> Reader<'a> {
        Reader {
            cursor: Cursor::new(bytes),
        }
    }

    fn eof<T>(result: std::io::Result<T>) -> Result<T, ClassFileError> {
        result.map_err(|_| ClassFileError::UnexpectedEof)
    }

    pub fn read_u8(&mut self) -> Result<u8, ClassFileError> {
        Self::eof(self.cursor.read_u8())
    }

    pub fn read_u16(&mut self) -> Result<u16, ClassFileError> {
        Self::eof(self.cursor.read_u16::<BE>())
    }

    pub fn read_u32(&mut self) -> Result<u32, ClassFileError> {
        Self::eof(self.cursor.read_u32::<BE>())
    }

    pub fn read_u64(&mut self) -> Result<u64, ClassFileError> {
        Self::eof(self.cursor.read_u64::<BE>())
    }

    pub fn read_f32(&mut self) -> Result<f32, ClassFileError> {
        Self::eof(self.cursor.read_f32::<BE>())
    }

    pub fn read_f64(&mut self) -> Result<f64, ClassFileError> {
        Self::eof(self.cursor.read_f64::<BE>())
    }

    /// Reads `len` raw bytes, rejecting counts that would overrun what's left
    /// in the underlying buffer rather than allocating on the caller's word.
    pub fn read_bytes(&mut self, len: usize) -> Result<Vec<u8>, ClassFileError> {
        if len as u64 > self.remaining() {
            return Err(ClassFileError::UnexpectedEof);
        }
        let mut buf = vec![0u8; len];
        Self::eof(std::io::Read::read_exact(&mut self.cursor, &mut buf))?;
        Ok(buf)
    }

    /// Bytes left between the current position and the end of the slice.
    pub fn remaining(&self) -> u64 {
        let total = self.cursor.get_ref().len() as u64;
        total.saturating_sub(self.cursor.position())
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Carves out a reader restricted to the next `len` bytes and advances
    /// this reader past them. The returned reader cannot see anything beyond
    /// `len` bytes even if its decoder tries to read further.
    pub fn sub_reader(&mut self, len: usize) -> Result<Reader<'a>, ClassFileError> {
        if len as u64 > self.remaining() {
            return Err(ClassFileError::UnexpectedEof);
        }
        let start = self.cursor.position() as usize;
        let slice = &self.cursor.get_ref()[start..start + len];
        self.cursor.set_position((start + len) as u64);
        Ok(Reader::new(slice))
    }

    /// Fails with `AttributeLengthMismatch` if this reader has bytes left
    /// unconsumed; used after a sub-reader's per-attribute decoder returns.
    pub fn finish(self) -> Result<(), ClassFileError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ClassFileError::AttributeLengthMismatch)
        }
    }
}
