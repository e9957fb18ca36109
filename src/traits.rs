//! Declaration of traits reused across the code.

use std::io::{Read, Seek};

use crate::filesystem::fat_error::FATError;
use crate::utils;

/// Implementation of the LayoutDisplay trait.
/// It is used to display the layout of a given structure such as a volume.
pub trait LayoutDisplay {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error>;
}

/// Positioned reads against the backing image of a volume.
///
/// Every read names its own offset, so no component depends on where a previous read left
/// the underlying handle.
pub trait BlockSource {
    /// Reads exactly `len` bytes starting at byte `offset`.
    ///
    /// # Errors
    /// - `FATError::ShortRead` if the source ends before `len` bytes are available
    /// - `FATError::IOError` for any other I/O failure
    fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, FATError>;
}

impl<T: Read + Seek> BlockSource for T {
    fn read_at(&mut self, offset: u64, len: usize) -> Result<Vec<u8>, FATError> {
        utils::read_at(self, offset, len)
    }
}
