//! FAT32 boot sector decoding.
//!
//! This module implements:
//! - Decoding of the geometry fields of the BIOS Parameter Block
//! - Derivation of the byte offsets every later computation relies on
//! - Optional strict validation of the boot sector according to Microsoft's FAT specification

use getset::Getters;
use log::debug;
use std::fmt;

use super::byte_cursor::ByteCursor;
use super::fat_error::FATError;

/// Size of the boot sector that holds the BPB.
pub const BOOT_SECTOR_SIZE: usize = 512;
/// Smallest sector size a FAT volume can have.
pub const MIN_BYTES_PER_SEC: u16 = 512;

/// Geometry of a FAT32 volume, decoded from its first sector.
///
/// All derived values are computed once at construction and never change afterwards.
#[derive(Debug, Clone, Getters)]
pub struct VolumeHeader {
    /// Number of bytes per sector (offset 0x0B)
    #[get = "pub"]
    bytes_per_sec: u16,
    /// Number of sectors per cluster (offset 0x0D)
    #[get = "pub"]
    sec_per_clus: u8,
    /// Number of reserved sectors from start of volume (offset 0x0E)
    #[get = "pub"]
    rsvd_sec_cnt: u16,
    /// Number of FAT copies (offset 0x10)
    #[get = "pub"]
    num_fat: u8,
    /// Sector count of one FAT (offset 0x24)
    #[get = "pub"]
    fat_sz_32: u32,
    /// First cluster of the root directory (offset 0x2C)
    #[get = "pub"]
    root_clus: u32,
    /// Boot sector signature (offset 0x1FE)
    sig: [u8; 2],

    /// Size in bytes of one cluster
    #[get = "pub"]
    cluster_size: u32,
    /// Byte offset of the first FAT
    #[get = "pub"]
    fat_offset: u64,
    /// Byte length of one FAT
    #[get = "pub"]
    fat_region_size: u64,
    /// Byte offset of cluster #2
    #[get = "pub"]
    data_area_offset: u64,
}

impl VolumeHeader {
    /// Decodes the header from the first sector of a volume.
    ///
    /// # Parameters
    /// - `block`: At least 512 bytes read from the start of the volume
    /// - `validate`: Whether to run the strict boot sector checks on top of the geometry checks
    ///
    /// # Returns
    /// - `Ok(VolumeHeader)`: The decoded header with its derived offsets
    /// - `Err(FATError)`: If decoding or validation fails
    ///
    /// # Errors
    /// - `FATError::OutOfRange`: If the block is shorter than a boot sector
    /// - `FATError::MalformedHeader`: If bytes per sector is not a power of two of at least 512,
    ///   or if sectors per cluster is zero
    /// - Strict validation variants (`InvalidSignature`, ...) if `validate` is true
    pub fn from_block(block: &[u8], validate: bool) -> Result<Self, FATError> {
        if block.len() < BOOT_SECTOR_SIZE {
            return Err(FATError::OutOfRange {
                offset: 0,
                width: BOOT_SECTOR_SIZE,
                len: block.len(),
            });
        }

        let mut cursor = ByteCursor::new(block);
        cursor.seek(0x0B)?;
        let bytes_per_sec = cursor.read_u16_le()?;
        let sec_per_clus = cursor.read_u8()?;
        let rsvd_sec_cnt = cursor.read_u16_le()?;
        let num_fat = cursor.read_u8()?;

        cursor.seek(0x24)?;
        let fat_sz_32 = cursor.read_u32_le()?;
        cursor.seek(0x2C)?;
        let root_clus = cursor.read_u32_le()?;

        cursor.seek(0x1FE)?;
        let sig = [cursor.read_u8()?, cursor.read_u8()?];

        // Nothing below is meaningful with this geometry.
        if bytes_per_sec < MIN_BYTES_PER_SEC || !bytes_per_sec.is_power_of_two() {
            return Err(FATError::MalformedHeader(format!(
                "bytes per sector `{bytes_per_sec}` is not a power of two of at least \
                 {MIN_BYTES_PER_SEC}"
            )));
        }
        if sec_per_clus == 0 {
            return Err(FATError::MalformedHeader(String::from(
                "sectors per cluster is zero",
            )));
        }

        let cluster_size = bytes_per_sec as u32 * sec_per_clus as u32;
        let fat_offset = rsvd_sec_cnt as u64 * bytes_per_sec as u64;
        let fat_region_size = fat_sz_32 as u64 * bytes_per_sec as u64;
        let data_area_offset = fat_offset + num_fat as u64 * fat_region_size;

        let header = Self {
            bytes_per_sec,
            sec_per_clus,
            rsvd_sec_cnt,
            num_fat,
            fat_sz_32,
            root_clus,
            sig,
            cluster_size,
            fat_offset,
            fat_region_size,
            data_area_offset,
        };
        debug!(
            "Volume header: cluster size {}, FAT at 0x{:X} ({} bytes x {}), data area at 0x{:X}",
            header.cluster_size,
            header.fat_offset,
            header.fat_region_size,
            header.num_fat,
            header.data_area_offset
        );

        if validate { header.validate() } else { Ok(header) }
    }

    /// Byte offset of a data cluster, clusters being numbered from 2.
    ///
    /// # Errors
    /// - `FATError::BrokenChain`: If `cluster` is 0 or 1, which have no data
    pub fn cluster_offset(&self, cluster: u32) -> Result<u64, FATError> {
        if cluster < 2 {
            return Err(FATError::BrokenChain {
                cluster,
                reason: String::from("clusters 0 and 1 are reserved"),
            });
        }
        Ok(self.data_area_offset + (cluster as u64 - 2) * self.cluster_size as u64)
    }

    /// Validates the boot sector according to FAT32 specification requirements.
    ///
    /// # Errors
    /// - `FATError::InvalidBytesPerSec`: If bytes per sector is not a valid value
    /// - `FATError::InvalidSecPerClus`: If sectors per cluster is not a valid value
    /// - `FATError::InvalidClusSz`: If cluster size exceeds 32 KiB
    /// - `FATError::InvalidNumFat`: If number of FATs is 0
    /// - `FATError::InvalidRootClus`: If root directory cluster is less than 2
    /// - `FATError::InvalidSignature`: If boot sector signature is not 0x55AA
    fn validate(self) -> Result<Self, FATError> {
        const VALID_BYTES_PER_SEC: [u16; 4] = [512, 1024, 2048, 4096];
        if !VALID_BYTES_PER_SEC.contains(&self.bytes_per_sec) {
            return Err(FATError::InvalidBytesPerSec(self.bytes_per_sec));
        }

        if !self.sec_per_clus.is_power_of_two() {
            return Err(FATError::InvalidSecPerClus(self.sec_per_clus));
        }

        if self.cluster_size > 32 * 1024 {
            return Err(FATError::InvalidClusSz(self.cluster_size));
        }

        if self.num_fat == 0 {
            return Err(FATError::InvalidNumFat(self.num_fat));
        }

        if self.root_clus < 2 {
            return Err(FATError::InvalidRootClus(self.root_clus));
        }

        const SIG: [u8; 2] = [0x55, 0xAA];
        if !self.sig.eq(&SIG) {
            return Err(FATError::InvalidSignature(format!(
                "0x{:02X}{:02X}",
                self.sig[0], self.sig[1]
            )));
        }

        Ok(self)
    }
}

/// Implements the Display trait for VolumeHeader
impl fmt::Display for VolumeHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        macro_rules! field {
            ($name:expr, $offset:expr, $val:expr) => {{
                writeln!(f, "  {:<20} 0x{:>04X}: {}", $name, $offset, $val)?;
            }};
        }

        writeln!(f, "Volume header:")?;
        field!("bytes_per_sec", 0x0B, self.bytes_per_sec);
        field!("sec_per_clus", 0x0D, self.sec_per_clus);
        field!("rsvd_sec_cnt", 0x0E, self.rsvd_sec_cnt);
        field!("num_fat", 0x10, self.num_fat);
        field!("fat_sz_32", 0x24, self.fat_sz_32);
        field!("root_clus", 0x2C, self.root_clus);
        field!("signature", 0x1FE, format!("{:02X?}", self.sig));

        writeln!(f, "Derived:")?;
        writeln!(f, "  {:<20} {}", "cluster_size", self.cluster_size)?;
        writeln!(f, "  {:<20} 0x{:X}", "fat_offset", self.fat_offset)?;
        writeln!(f, "  {:<20} {}", "fat_region_size", self.fat_region_size)?;
        writeln!(f, "  {:<20} 0x{:X}", "data_area_offset", self.data_area_offset)?;

        Ok(())
    }
}
