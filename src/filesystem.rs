//! FAT32 volume decoding and file extraction.
//!
//! Data flows leaves first: raw bytes are decoded through [`byte_cursor`] into a
//! [`volume_header`], which locates the [`allocation_table`] and the data area. A
//! [`dir_entry`] names a file's first cluster, [`cluster_chain`] follows it through the
//! table and [`extractor`] copies the clusters out. [`fat`] bundles the whole pipeline.

pub mod allocation_table;
pub mod byte_cursor;
pub mod cluster_chain;
pub mod dir_entry;
pub mod extractor;
pub mod fat;
pub mod fat_error;
pub mod volume_header;
