//! Error types for FAT32 volume parsing and file extraction.
//!
//! Every layer reports the anomaly it can observe and hands it to its caller: the cursor
//! reports overruns, the header reports impossible geometry, the table and the chain
//! resolver report broken links, and the extractor reports reads the backing image
//! cannot satisfy.

use std::io;
use thiserror::Error;

/// Errors that can occur while decoding a FAT32 volume or extracting a file from it.
#[derive(Error, Debug)]
pub enum FATError {
    /// A cursor read would run past the end of the block it decodes.
    #[error("Read of {width} bytes at offset {offset} is out of range for a {len}-byte block")]
    OutOfRange {
        offset: usize,
        width: usize,
        len: usize,
    },

    /// The boot sector describes a geometry nothing else can be computed from.
    #[error("Malformed volume header: {0}")]
    MalformedHeader(String),

    /// Bytes per sector must be 512, 1024, 2048 or 4096 (strict validation only).
    #[error("Invalid count of bytes per sector: `{0}`. Legal values: 512, 1024, 2048 or 4096")]
    InvalidBytesPerSec(u16),

    /// Sectors per cluster must be a power of 2 (strict validation only).
    #[error(
        "Invalid number of sector per cluster: `{0}`. Legal values: 1, 2, 4, 8, 16, 32, 64, 128"
    )]
    InvalidSecPerClus(u8),

    /// Total cluster size (bytes per sector × sectors per cluster) must not exceed 32 KiB.
    #[error("Invalid cluster size: `{0}`. Any value greater than 32K is invalid.")]
    InvalidClusSz(u32),

    /// At least one File Allocation Table must be present.
    #[error("Invalid number of FATs on this volume: `{0}`.")]
    InvalidNumFat(u8),

    /// Clusters 0 and 1 are reserved, the root directory cannot start there.
    #[error(
        "Invalid cluster number of the first cluster of the root directory: `{0}`. This value should be at least 2."
    )]
    InvalidRootClus(u32),

    /// The boot sector signature must be 0x55AA.
    #[error("Invalid boot sector signature: `{0}`. Expected signature: 0x55AA")]
    InvalidSignature(String),

    /// The FAT region length is not a whole number of 32-bit entries.
    #[error("Truncated allocation table: {0} bytes is not a multiple of 4")]
    TruncatedTable(usize),

    /// A cluster reference is out of the table bounds or holds a marker that cannot be followed.
    #[error("Broken cluster chain at cluster {cluster}: {reason}")]
    BrokenChain { cluster: u32, reason: String },

    /// The chain visits the same cluster twice.
    #[error("Possible cycle in the cluster chain starting at {start}: cluster {cluster} is revisited")]
    PossibleCycle { start: u32, cluster: u32 },

    /// The chain is longer than the traversal bound.
    #[error("Cluster chain starting at {start} exceeds the limit of {limit} clusters")]
    ChainTooLong { start: u32, limit: usize },

    /// The chain does not hold enough clusters for the file size.
    #[error("Cluster chain holds {chain_bytes} bytes but the file is {file_size} bytes long")]
    ShortChain { file_size: u32, chain_bytes: u64 },

    /// The backing source ended before the requested bytes could be read.
    #[error("Short read at offset {offset}: requested {requested} bytes, got {available}")]
    ShortRead {
        offset: u64,
        requested: usize,
        available: usize,
    },

    /// The file was not found
    #[error("File not found: `{0}`")]
    FileNotFound(String),

    /// A path component names a regular file where a directory is expected.
    #[error("Not a directory: `{0}`")]
    NotADirectory(String),

    /// Underlying I/O errors that occur while reading the volume or writing the output.
    #[error("IO Error: `{0}`")]
    IOError(io::Error),

    /// Parsing error occured while decoding a field
    #[error("BinRead Error: `{0}`")]
    BinReadError(binread::Error),
}

/// Converts standard I/O errors into FATError.
impl From<io::Error> for FATError {
    fn from(err: io::Error) -> Self {
        FATError::IOError(err)
    }
}

/// Converts BinRead errors into FATError.
impl From<binread::Error> for FATError {
    fn from(err: binread::Error) -> Self {
        FATError::BinReadError(err)
    }
}
