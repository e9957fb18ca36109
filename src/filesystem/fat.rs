//! FAT volume structure and operations.
//!
//! This module ties the decoders together into a read-only volume session:
//! - Reading and validating the boot sector
//! - Loading the first File Allocation Table
//! - Finding a file by its 8.3 path
//! - Extracting a file's content
//! - Displaying the volume layout
//!
//! The session never holds the backing image. Every operation that touches the disk takes
//! the source as a parameter, so one session can serve several independent readers.

use getset::Getters;
use log::debug;
use std::fmt::Write as FmtWrite;
use std::io;

use super::allocation_table::AllocationTable;
use super::cluster_chain::ChainResolver;
use super::dir_entry::{self, DirectoryRecord};
use super::extractor;
use super::fat_error::FATError;
use super::volume_header::{BOOT_SECTOR_SIZE, VolumeHeader};
use crate::traits::{BlockSource, LayoutDisplay};

/// Structure for a FAT32 volume.
///
/// Essentially, it is the decoded header together with the decoded allocation table.
#[derive(Getters)]
pub struct FATVol {
    #[get = "pub"]
    header: VolumeHeader,
    #[get = "pub"]
    table: AllocationTable,
    resolver: ChainResolver,
}

impl FATVol {
    /// Reads the boot sector and the first FAT of the volume.
    ///
    /// # Parameters
    /// - `source`: The backing image, the volume starting at byte 0
    /// - `validate`: Whether to perform the strict checks on the boot sector
    ///
    /// # Returns
    /// - `Ok(FATVol)`: The FAT volume
    /// - `Err(FATError)`: If reading fails or the metadata is malformed
    pub fn open<S: BlockSource>(source: &mut S, validate: bool) -> Result<FATVol, FATError> {
        let boot_sector = source.read_at(0, BOOT_SECTOR_SIZE)?;
        let header = VolumeHeader::from_block(&boot_sector, validate)?;

        let fat_len = usize::try_from(*header.fat_region_size()).map_err(|_| {
            FATError::MalformedHeader(format!(
                "FAT region of {} bytes does not fit in memory",
                header.fat_region_size()
            ))
        })?;
        let fat_block = source.read_at(*header.fat_offset(), fat_len)?;
        let table = AllocationTable::from_bytes(&fat_block)?;

        Ok(Self {
            header,
            table,
            resolver: ChainResolver::new(),
        })
    }

    /// Replaces the resolver used to follow cluster chains, e.g. to bound chain lengths.
    pub fn with_resolver(mut self, resolver: ChainResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Returns the clusters of the chain starting at `start`.
    pub fn clusters(&self, start: u32) -> Result<Vec<u32>, FATError> {
        self.resolver.resolve(start, &self.table)
    }

    /// Reads every cluster of a directory into one contiguous block.
    pub fn read_directory<S: BlockSource>(
        &self,
        source: &mut S,
        first_cluster: u32,
    ) -> Result<Vec<u8>, FATError> {
        let cluster_size = *self.header.cluster_size() as usize;
        let mut block = vec![];

        for cluster in self.clusters(first_cluster)? {
            let offset = self.header.cluster_offset(cluster)?;
            block.extend(source.read_at(offset, cluster_size)?);
        }

        Ok(block)
    }

    /// Finds a file in the FAT volume from its `/`-separated 8.3 path.
    ///
    /// Every component but the last must be a directory.
    ///
    /// # Errors
    /// - `FATError::FileNotFound`: If the path is empty or a component is missing
    /// - `FATError::NotADirectory`: If an intermediate component is a regular file
    pub fn find_file<S: BlockSource>(
        &self,
        source: &mut S,
        file_path: &str,
    ) -> Result<DirectoryRecord, FATError> {
        let mut parts = file_path.split('/').filter(|part| !part.is_empty()).peekable();
        let mut dir_cluster = *self.header.root_clus();

        while let Some(part) = parts.next() {
            let dir_block = self.read_directory(source, dir_cluster)?;
            let record = dir_entry::locate(&dir_block, part)?;
            debug!("Found {record} at cluster {}", record.start_cluster());

            if parts.peek().is_none() {
                return Ok(record);
            }
            if !record.is_dir() {
                return Err(FATError::NotADirectory(part.to_string()));
            }
            dir_cluster = *record.start_cluster();
        }

        Err(FATError::FileNotFound(file_path.to_string()))
    }

    /// Writes the content of the file described by `record` into `sink`.
    ///
    /// # Returns
    /// - `Ok(u64)`: The number of bytes written
    pub fn extract_record<S: BlockSource, W: io::Write>(
        &self,
        source: &mut S,
        record: &DirectoryRecord,
        sink: &mut W,
    ) -> Result<u64, FATError> {
        // Empty files may have no cluster allocated at all.
        if *record.file_size() == 0 {
            return Ok(0);
        }

        let chain = self.clusters(*record.start_cluster())?;
        extractor::extract(record, &chain, &self.header, source, sink)
    }

    /// Finds the file at `file_path` and writes its content into `sink`.
    pub fn extract_file<S: BlockSource, W: io::Write>(
        &self,
        source: &mut S,
        file_path: &str,
        sink: &mut W,
    ) -> Result<u64, FATError> {
        let record = self.find_file(source, file_path)?;
        self.extract_record(source, &record, sink)
    }
}

/// Implements the LayoutDisplay trait for FATVol
impl LayoutDisplay for FATVol {
    fn display_layout(&self, indent: u8) -> Result<String, std::fmt::Error> {
        let mut out = String::from("");
        let indent = " ".repeat(indent.into());

        let fat_start = *self.header.fat_offset();
        let fat_sz = *self.header.fat_region_size();
        let data_start = *self.header.data_area_offset();
        let data_end = data_start
            + self.table.len().saturating_sub(2) as u64 * *self.header.cluster_size() as u64;

        writeln!(out, "{}┌{:─^55}┐", indent, " FAT32 Volume Layout (bytes) ")?;
        writeln!(
            out,
            "{}├{:^12}┬{:^12}┬{:^12}┬{:^16}┤",
            indent, "Region", "Start", "End", "Description"
        )?;
        writeln!(
            out,
            "{}├{:─<12}┼{:─<12}┼{:─<12}┼{:─<16}┤",
            indent, "", "", "", ""
        )?;

        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent, "Reserved", 0, fat_start, "Boot + Reserved"
        )?;
        for i in 0..*self.header.num_fat() {
            let fat_i_start = fat_start + i as u64 * fat_sz;
            let fat_i_end = fat_i_start + fat_sz;
            writeln!(
                out,
                "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
                indent,
                format!("FAT #{}", i),
                fat_i_start,
                fat_i_end,
                "FAT Tables"
            )?;
        }
        writeln!(
            out,
            "{}│{:<12}│{:<12}│{:<12}│{:<16}│",
            indent, "Data", data_start, data_end, "Cluster Data"
        )?;

        writeln!(
            out,
            "{}└{:─<12}┴{:─<12}┴{:─<12}┴{:─<16}┘",
            indent, "", "", "", ""
        )?;

        Ok(out)
    }
}
