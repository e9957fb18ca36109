//! FAT directory entry structure and parsing.
//!
//! This module implements the FAT short (8.3) directory entry, which carries the name,
//! attributes, first cluster and size of a file. Each entry is 32 bytes long. It also
//! implements the lookup of a single named entry inside a block of directory data.

use getset::Getters;
use log::trace;
use std::fmt;

use super::byte_cursor::ByteCursor;
use super::fat_error::FATError;

/// Size in bytes of one directory slot.
pub const DIR_ENTRY_SIZE: usize = 32;

/// First name byte of the slot that ends a directory.
const END_OF_DIR: u8 = 0x00;
/// First name byte of a deleted slot.
const DELETED: u8 = 0xE5;

pub const ATTR_VOLUME_ID: u8 = 0x08;
pub const ATTR_DIRECTORY: u8 = 0x10;
/// Attribute combination marking a long-name slot.
pub const ATTR_LONG_NAME: u8 = 0x0F;

/// Short directory entry.
///
/// # Notes
/// - `name` and `ext` are stored with their space padding removed
/// - The attribute byte is exposed as is, its interpretation is left to the caller
#[derive(Debug, Clone, Getters)]
pub struct DirectoryRecord {
    /// Base name, at most 8 characters
    #[get = "pub"]
    name: String,
    /// Extension, at most 3 characters
    #[get = "pub"]
    ext: String,
    /// File attributes byte
    #[get = "pub"]
    attr: u8,
    /// First cluster of the data, `(fst_clus_hi << 16) | fst_clus_lo`
    #[get = "pub"]
    start_cluster: u32,
    /// File size in bytes (0 for directories)
    #[get = "pub"]
    file_size: u32,
}

impl DirectoryRecord {
    /// Decodes a directory entry from the first 32 bytes of `buf`.
    ///
    /// # Errors
    /// - `FATError::OutOfRange`: If `buf` is shorter than a directory slot
    pub fn from_slice(buf: &[u8]) -> Result<Self, FATError> {
        let mut cursor = ByteCursor::window(buf, 0, DIR_ENTRY_SIZE)?;

        let name = cursor.read_fixed_ascii(8)?.trim_end_matches(' ').to_string();
        let ext = cursor.read_fixed_ascii(3)?.trim_end_matches(' ').to_string();
        let attr = cursor.read_u8()?;

        cursor.seek(0x14)?;
        let fst_clus_hi = cursor.read_u16_le()?;
        cursor.seek(0x1A)?;
        let fst_clus_lo = cursor.read_u16_le()?;
        let file_size = cursor.read_u32_le()?;

        Ok(Self {
            name,
            ext,
            attr,
            start_cluster: ((fst_clus_hi as u32) << 16) | fst_clus_lo as u32,
            file_size,
        })
    }

    /// Returns the composed `NAME.EXT` file name.
    ///
    /// Unlike the raw `name + "." + ext` composition, the dot is omitted when the entry has
    /// no extension, so a directory reads `DOCS` rather than `DOCS.`.
    pub fn file_name(&self) -> String {
        if self.ext.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.name, self.ext)
        }
    }

    /// Checks whether `name` designates this entry, ignoring ASCII case.
    pub fn same_short_name(&self, name: &str) -> bool {
        self.file_name().eq_ignore_ascii_case(name)
    }

    /// Checks if the directory attribute bit (0x10) is set.
    pub fn is_dir(&self) -> bool {
        self.attr & ATTR_DIRECTORY != 0
    }

    /// Checks if this slot holds the volume label rather than a file.
    pub fn is_volume_label(&self) -> bool {
        self.attr & ATTR_VOLUME_ID != 0
    }
}

/// Finds the entry named `name` in a block of directory data.
///
/// The block is scanned slot by slot until the end-of-directory marker. Deleted slots,
/// long-name slots and the volume label are skipped.
///
/// # Errors
/// - `FATError::FileNotFound`: If no live short entry carries that name
pub fn locate(dir_block: &[u8], name: &str) -> Result<DirectoryRecord, FATError> {
    for slot in dir_block.chunks_exact(DIR_ENTRY_SIZE) {
        match slot[0] {
            END_OF_DIR => break,
            DELETED => continue,
            _ => {}
        }
        if slot[0x0B] & ATTR_LONG_NAME == ATTR_LONG_NAME {
            continue;
        }

        let record = DirectoryRecord::from_slice(slot)?;
        if record.is_volume_label() {
            continue;
        }
        trace!("Directory slot: {record}");

        if record.same_short_name(name) {
            return Ok(record);
        }
    }

    Err(FATError::FileNotFound(name.to_string()))
}

impl fmt::Display for DirectoryRecord {
    /// Formats the directory entry as its name and size.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\" {}B", self.file_name(), self.file_size)
    }
}
