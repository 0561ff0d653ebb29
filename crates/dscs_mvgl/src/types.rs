//! Base types for the structure of MDB1 archives.
//!
//! The two shipped archive generations share one layout — header, file
//! tree, file names, data records, payload blob — but differ in field
//! widths, name-record sizes and codec. Each generation is a zero-sized
//! variant type; the width-specific records widen into the common `u64`
//! carriers right after parsing.

use binrw::BinRead;
use std::io::{Read, Seek};

use crate::compression::{Codec, Doboz, Lz4};
use crate::error::Result;

/// Archive header, widened to the common carrier.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct ArchiveHeader {
    /// Number of file-tree entries
    pub file_entry_count: u64,
    /// Number of file-name entries; always equals the tree entry count
    pub file_name_count: u64,
    /// Number of data records
    pub data_entry_count: u64,
    /// Absolute offset of the payload blob
    pub data_start: u64,
    /// Total archive size recorded in the header
    pub total_size: u64,
}

/// One node of the name-lookup tree.
///
/// The tree is a radix-like structure the game uses for binary lookup;
/// extraction only needs the `data_id` leaves, which parallel the name
/// entries by index.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Bit index compared at this node
    pub compare_bit: u64,
    /// Payload record index; `None` marks a structural node
    pub data_id: Option<u64>,
    /// Index of the left child
    pub left: u64,
    /// Index of the right child
    pub right: u64,
}

/// Location of one payload inside the data blob.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DataEntry {
    /// Offset relative to the header's `data_start`
    pub offset: u64,
    /// Decompressed size
    pub full_size: u64,
    /// Stored size; equal to `full_size` for stored entries
    pub compressed_size: u64,
}

#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(magic = b"MDB1", little)]
struct Header32 {
    file_entry_count: u16,
    file_name_count: u16,
    data_entry_count: u32,
    data_start: u32,
    total_size: u32,
}

#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(magic = b"MDB1", little)]
struct Header64 {
    file_entry_count: u32,
    file_name_count: u32,
    data_entry_count: u32,
    data_start: u64,
    total_size: u64,
}

#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
struct Tree32 {
    compare_bit: u16,
    data_id: u16,
    left: u16,
    right: u16,
}

#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
struct Tree64 {
    compare_bit: u32,
    data_id: u32,
    left: u32,
    right: u32,
}

#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
struct Data32 {
    offset: u32,
    full_size: u32,
    compressed_size: u32,
}

#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
struct Data64 {
    offset: u64,
    full_size: u64,
    compressed_size: u64,
}

/// Name record: a fixed-width extension field followed by a fixed-width
/// name field, padded with NUL or space.
#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
struct Name32 {
    extension: [u8; 0x04],
    name: [u8; 0x3C],
}

#[derive(BinRead, Debug, Copy, Clone, PartialEq)]
#[br(little)]
struct Name64 {
    extension: [u8; 0x04],
    name: [u8; 0x7C],
}

/// Trim a padded name field at the first NUL or space and decode lossily.
fn trim(field: &[u8]) -> std::borrow::Cow<'_, str> {
    let end = field
        .iter()
        .position(|&b| b == 0 || b == b' ')
        .unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end])
}

fn assemble_path(name: &[u8], extension: &[u8]) -> String {
    format!("{}.{}", trim(name), trim(extension))
}

/// Capability set distinguishing the archive generations.
pub trait ArchiveVariant {
    /// Codec used for entry payloads.
    type Codec: Codec;

    /// Read and widen the archive header.
    fn read_header<R: Read + Seek>(reader: &mut R) -> Result<ArchiveHeader>;

    /// Read and widen one tree entry.
    fn read_tree_entry<R: Read + Seek>(reader: &mut R) -> Result<TreeEntry>;

    /// Read one name entry and assemble its `name.extension` path.
    fn read_name_entry<R: Read + Seek>(reader: &mut R) -> Result<String>;

    /// Read and widen one data record.
    fn read_data_entry<R: Read + Seek>(reader: &mut R) -> Result<DataEntry>;
}

/// The DSCS generation: 16-bit tree fields, 0x40 name records, 32-bit data
/// records, Doboz payloads.
pub struct Dscs;

impl ArchiveVariant for Dscs {
    type Codec = Doboz;

    fn read_header<R: Read + Seek>(reader: &mut R) -> Result<ArchiveHeader> {
        let header = Header32::read(reader)?;
        Ok(ArchiveHeader {
            file_entry_count: header.file_entry_count as u64,
            file_name_count: header.file_name_count as u64,
            data_entry_count: header.data_entry_count as u64,
            data_start: header.data_start as u64,
            total_size: header.total_size as u64,
        })
    }

    fn read_tree_entry<R: Read + Seek>(reader: &mut R) -> Result<TreeEntry> {
        let entry = Tree32::read(reader)?;
        Ok(TreeEntry {
            compare_bit: entry.compare_bit as u64,
            data_id: (entry.data_id != u16::MAX).then_some(entry.data_id as u64),
            left: entry.left as u64,
            right: entry.right as u64,
        })
    }

    fn read_name_entry<R: Read + Seek>(reader: &mut R) -> Result<String> {
        let entry = Name32::read(reader)?;
        Ok(assemble_path(&entry.name, &entry.extension))
    }

    fn read_data_entry<R: Read + Seek>(reader: &mut R) -> Result<DataEntry> {
        let entry = Data32::read(reader)?;
        Ok(DataEntry {
            offset: entry.offset as u64,
            full_size: entry.full_size as u64,
            compressed_size: entry.compressed_size as u64,
        })
    }
}

/// The HLTLDA generation: 32-bit tree fields, 0x80 name records, 64-bit
/// data records, LZ4 payloads.
pub struct Hltlda;

impl ArchiveVariant for Hltlda {
    type Codec = Lz4;

    fn read_header<R: Read + Seek>(reader: &mut R) -> Result<ArchiveHeader> {
        let header = Header64::read(reader)?;
        Ok(ArchiveHeader {
            file_entry_count: header.file_entry_count as u64,
            file_name_count: header.file_name_count as u64,
            data_entry_count: header.data_entry_count as u64,
            data_start: header.data_start,
            total_size: header.total_size,
        })
    }

    fn read_tree_entry<R: Read + Seek>(reader: &mut R) -> Result<TreeEntry> {
        let entry = Tree64::read(reader)?;
        Ok(TreeEntry {
            compare_bit: entry.compare_bit as u64,
            data_id: (entry.data_id != u32::MAX).then_some(entry.data_id as u64),
            left: entry.left as u64,
            right: entry.right as u64,
        })
    }

    fn read_name_entry<R: Read + Seek>(reader: &mut R) -> Result<String> {
        let entry = Name64::read(reader)?;
        Ok(assemble_path(&entry.name, &entry.extension))
    }

    fn read_data_entry<R: Read + Seek>(reader: &mut R) -> Result<DataEntry> {
        let entry = Data64::read(reader)?;
        Ok(DataEntry {
            offset: entry.offset,
            full_size: entry.full_size,
            compressed_size: entry.compressed_size,
        })
    }
}
