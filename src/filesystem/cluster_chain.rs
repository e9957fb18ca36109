//! Cluster chain resolution.
//!
//! A file's clusters form a linked list threaded through the allocation table. The
//! resolver follows that list from the first cluster until an end-of-chain marker, and
//! refuses to trust a table that would make it loop forever.

use log::debug;
use std::collections::HashSet;

use super::allocation_table::{AllocationTable, ClusterRef};
use super::fat_error::FATError;

/// Follows cluster links through an [`AllocationTable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct ChainResolver {
    /// Upper bound on the chain length. Defaults to the table length.
    max_len: Option<usize>,
}

impl ChainResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bounds the number of clusters a chain may hold.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            max_len: Some(max_len),
        }
    }

    /// Returns the ordered clusters of the chain starting at `start`.
    ///
    /// The chain holds `start` followed by every continuation, without the end-of-chain
    /// marker itself.
    ///
    /// # Errors
    /// - `FATError::BrokenChain`: If a link is out of the table or holds a free/bad marker
    /// - `FATError::PossibleCycle`: If a cluster is reached twice
    /// - `FATError::ChainTooLong`: If the chain grows past the configured bound
    pub fn resolve(&self, start: u32, table: &AllocationTable) -> Result<Vec<u32>, FATError> {
        let limit = self.max_len.unwrap_or(table.len());
        let mut visited = HashSet::new();
        let mut chain = vec![];
        let mut current = start;

        loop {
            if current as usize >= table.len() {
                return Err(FATError::BrokenChain {
                    cluster: current,
                    reason: format!("outside of the {}-entry table", table.len()),
                });
            }
            if !visited.insert(current) {
                return Err(FATError::PossibleCycle {
                    start,
                    cluster: current,
                });
            }

            if chain.len() == limit {
                return Err(FATError::ChainTooLong { start, limit });
            }
            chain.push(current);

            match table.next(current) {
                ClusterRef::Continuation(next) => current = next,
                ClusterRef::EndOfChain => break,
                ClusterRef::Invalid => {
                    return Err(FATError::BrokenChain {
                        cluster: current,
                        reason: format!(
                            "entry 0x{:08X} cannot be followed",
                            table.entry(current).unwrap_or_default()
                        ),
                    });
                }
            }
        }

        debug!("Cluster chain from {start}: {} clusters", chain.len());
        Ok(chain)
    }
}

/// Resolves the chain starting at `start`, bounded by the table length.
pub fn resolve(start: u32, table: &AllocationTable) -> Result<Vec<u32>, FATError> {
    ChainResolver::new().resolve(start, table)
}
