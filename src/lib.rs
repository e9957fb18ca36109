//!
//! FATExtract: A library and CLI for pulling files out of FAT32 volume images.
//!
//! This crate provides tools for:
//! - Decoding the FAT32 boot sector and deriving the volume layout
//! - Decoding the File Allocation Table and following cluster chains safely
//! - Looking up short (8.3) directory entries by name
//! - Copying a file's clusters, byte-exact, into any writer
//!
//! The library is read-only: nothing here ever writes to the volume image.
//!
//! # Re-exports
//! - [`FATVol`]: FAT32 volume session
//! - [`FATError`]: Error type shared by every operation
//! - [`BlockSource`]: Positioned reads against a volume image

pub mod commands;
pub mod filesystem;
pub mod traits;
pub mod utils;

/// FAT32 volume session (see [`filesystem::fat::FATVol`]).
pub use crate::filesystem::fat::FATVol;
/// Error type (see [`filesystem::fat_error::FATError`]).
pub use crate::filesystem::fat_error::FATError;
/// Backing source abstraction (see [`traits::BlockSource`]).
pub use crate::traits::BlockSource;
