//! Linearisation of a file's clusters into an output stream.

use log::{trace, warn};
use std::io::Write;

use super::dir_entry::DirectoryRecord;
use super::fat_error::FATError;
use super::volume_header::VolumeHeader;
use crate::traits::BlockSource;

/// Copies exactly `record.file_size()` bytes of the file into `sink`.
///
/// Clusters are read in chain order from `dataAreaOffset + (cluster - 2) * clusterSize`. The
/// last cluster is only partially copied when the size is not a multiple of the cluster size,
/// and clusters left over once the size is reached are ignored.
///
/// # Parameters
/// - `record`: The directory entry of the file
/// - `chain`: The resolved clusters of the file
/// - `header`: The volume geometry used for address translation
/// - `source`: The backing image
/// - `sink`: Where the content is written
///
/// # Returns
/// - `Ok(u64)`: The number of bytes written, always equal to the file size
///
/// # Errors
/// - `FATError::ShortChain`: If the chain cannot hold the file, checked before anything is written
/// - `FATError::BrokenChain`: If the chain names a reserved cluster
/// - `FATError::ShortRead`: If the image ends before a cluster could be read
/// - `FATError::IOError`: If writing to `sink` fails
pub fn extract<S: BlockSource, W: Write>(
    record: &DirectoryRecord,
    chain: &[u32],
    header: &VolumeHeader,
    source: &mut S,
    sink: &mut W,
) -> Result<u64, FATError> {
    let file_size = *record.file_size() as u64;
    let cluster_size = *header.cluster_size() as u64;

    let chain_bytes = chain.len() as u64 * cluster_size;
    if chain_bytes < file_size {
        return Err(FATError::ShortChain {
            file_size: *record.file_size(),
            chain_bytes,
        });
    }
    let needed = file_size.div_ceil(cluster_size) as usize;
    if chain.len() > needed {
        warn!(
            "{}: chain holds {} clusters, only {} are needed for {} bytes",
            record.file_name(),
            chain.len(),
            needed,
            file_size
        );
    }

    let mut remaining = file_size;
    for &cluster in chain.iter().take(needed) {
        let offset = header.cluster_offset(cluster)?;
        let len = remaining.min(cluster_size) as usize;
        trace!("Copying {len} bytes of cluster {cluster} at 0x{offset:X}");

        let data = source.read_at(offset, len)?;
        sink.write_all(&data)?;
        remaining -= len as u64;
    }

    Ok(file_size - remaining)
}
