//! Positionable little-endian reader over an in-memory block.
//!
//! Every on-disk structure of the volume (boot sector, FAT region, directory slots) is
//! decoded through a `ByteCursor`. Each read advances the cursor by its width and fails
//! with [`FATError::OutOfRange`] rather than reading past the end of the block.

use binread::BinReaderExt;
use std::io::{Cursor, Read, Seek, SeekFrom};

use super::fat_error::FATError;

/// Cursor over a window of a byte block.
///
/// Offsets passed to [`ByteCursor::seek`] are relative to the start of the window.
pub struct ByteCursor<'a> {
    reader: Cursor<&'a [u8]>,
}

impl<'a> ByteCursor<'a> {
    /// Creates a cursor over the whole block, positioned at offset 0.
    pub fn new(block: &'a [u8]) -> Self {
        Self {
            reader: Cursor::new(block),
        }
    }

    /// Creates a cursor over `len` bytes of `block` starting at `start`.
    ///
    /// # Errors
    /// - `FATError::OutOfRange` if the window does not fit inside the block.
    pub fn window(block: &'a [u8], start: usize, len: usize) -> Result<Self, FATError> {
        let end = start.checked_add(len).filter(|end| *end <= block.len());
        match end {
            Some(end) => Ok(Self::new(&block[start..end])),
            None => Err(FATError::OutOfRange {
                offset: start,
                width: len,
                len: block.len(),
            }),
        }
    }

    /// Length of the window in bytes.
    pub fn len(&self) -> usize {
        self.reader.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current position of the cursor inside the window.
    pub fn position(&self) -> usize {
        self.reader.position() as usize
    }

    /// Number of bytes left between the cursor and the end of the window.
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    /// Moves the cursor to `offset`.
    ///
    /// Seeking to the very end of the window is allowed; the next read then fails.
    pub fn seek(&mut self, offset: usize) -> Result<(), FATError> {
        if offset > self.len() {
            return Err(FATError::OutOfRange {
                offset,
                width: 0,
                len: self.len(),
            });
        }
        self.reader.seek(SeekFrom::Start(offset as u64))?;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, FATError> {
        self.check(1)?;
        Ok(self.reader.read_le()?)
    }

    pub fn read_u16_le(&mut self) -> Result<u16, FATError> {
        self.check(2)?;
        Ok(self.reader.read_le()?)
    }

    pub fn read_u32_le(&mut self) -> Result<u32, FATError> {
        self.check(4)?;
        Ok(self.reader.read_le()?)
    }

    /// Reads `n` raw bytes and maps each of them to a `char`.
    ///
    /// Padding is returned as is: the caller decides how to trim it.
    pub fn read_fixed_ascii(&mut self, n: usize) -> Result<String, FATError> {
        self.check(n)?;
        let mut raw = vec![0; n];
        self.reader.read_exact(&mut raw)?;
        Ok(raw.iter().map(|&b| b as char).collect())
    }

    /// Fails if reading `width` bytes from the current position would leave the window.
    fn check(&self, width: usize) -> Result<(), FATError> {
        if width > self.remaining() {
            return Err(FATError::OutOfRange {
                offset: self.position(),
                width,
                len: self.len(),
            });
        }
        Ok(())
    }
}
