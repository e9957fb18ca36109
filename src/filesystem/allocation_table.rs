//! In-memory copy of the File Allocation Table.
//!
//! The FAT is decoded once from the volume into a vector of 32-bit entries and is
//! read-only afterwards, so it can be shared between concurrent extractions.

use log::debug;

use super::byte_cursor::ByteCursor;
use super::fat_error::FATError;

/// The upper 4 bits of a FAT32 entry are reserved.
pub const ENTRY_MASK: u32 = 0x0FFF_FFFF;
/// End-of-chain sentinel written by formatters.
pub const END_OF_CHAIN: u32 = 0x0FFF_FFFF;
/// Any masked entry at or above this value terminates a chain.
pub const END_OF_CHAIN_MIN: u32 = 0x0FFF_FFF8;
/// Bad cluster marker.
pub const BAD_CLUSTER: u32 = 0x0FFF_FFF7;
/// Free cluster marker.
pub const FREE_CLUSTER: u32 = 0;

/// Result of following one link of the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClusterRef {
    /// The chain continues with this cluster.
    Continuation(u32),
    /// The cluster is the last one of its chain.
    EndOfChain,
    /// The cluster is out of the table, or its entry cannot be followed.
    Invalid,
}

/// Decoded File Allocation Table, indexed by cluster number.
#[derive(Debug, Clone)]
pub struct AllocationTable {
    entries: Vec<u32>,
}

impl AllocationTable {
    /// Decodes a raw FAT region into its entries.
    ///
    /// # Errors
    /// - `FATError::TruncatedTable`: If the block length is not a multiple of 4
    pub fn from_bytes(block: &[u8]) -> Result<Self, FATError> {
        if block.len() % 4 != 0 {
            return Err(FATError::TruncatedTable(block.len()));
        }

        let mut cursor = ByteCursor::new(block);
        let entries = (0..block.len() / 4)
            .map(|_| cursor.read_u32_le())
            .collect::<Result<Vec<u32>, FATError>>()?;

        debug!("Allocation table: {} entries", entries.len());
        Ok(Self { entries })
    }

    /// Number of entries in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Raw entry stored for `cluster`, with the reserved bits left untouched.
    pub fn entry(&self, cluster: u32) -> Option<u32> {
        self.entries.get(cluster as usize).copied()
    }

    /// Follows the link stored for `cluster`.
    ///
    /// # Returns
    /// - `ClusterRef::Continuation(next)` if the entry points to another cluster of the table
    /// - `ClusterRef::EndOfChain` if the entry is an end-of-chain marker
    /// - `ClusterRef::Invalid` if `cluster` is reserved or out of the table, or if the entry is
    ///   a free/bad marker or points outside the table
    pub fn next(&self, cluster: u32) -> ClusterRef {
        if cluster < 2 {
            return ClusterRef::Invalid;
        }

        let value = match self.entry(cluster) {
            Some(raw) => raw & ENTRY_MASK,
            None => return ClusterRef::Invalid,
        };

        match value {
            v if v >= END_OF_CHAIN_MIN => ClusterRef::EndOfChain,
            FREE_CLUSTER | 1 | BAD_CLUSTER => ClusterRef::Invalid,
            v if v as usize >= self.entries.len() => ClusterRef::Invalid,
            v => ClusterRef::Continuation(v),
        }
    }
}
