//! Base types for the structure of a WDB2 file.

use binrw::{BinRead, BinWrite};
use std::io::{Read, Seek};

use crate::error::{Error, Result};

/// Builds newer than this carry the extended header fields.
pub const LEGACY_BUILD_THRESHOLD: u32 = 12880;

/// WDB2 file header
///
/// Always starts with "WDB2". Which fields follow the common block depends on the
/// build that produced the file, see [`ExtendedHeader`].
/// All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[brw(magic = b"WDB2", little)]
pub struct Db2Header {
    /// The number of records stored in the file
    pub record_count: u32,

    /// The number of fields in every record
    pub field_count: u32,

    /// The size in bytes of a single record
    pub record_size: u32,

    /// The size in bytes of the string pool following the records
    pub string_size: u32,

    /// Hash identifying the table
    pub table_hash: u32,

    /// Client build the file was produced for
    pub build: u32,

    /// Purpose unknown
    pub unknown: u32,

    /// Fields only written by builds after [`LEGACY_BUILD_THRESHOLD`]
    #[br(if(build > LEGACY_BUILD_THRESHOLD))]
    pub extended: Option<ExtendedHeader>,
}

/// Header fields present in files from newer builds
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[brw(little)]
pub struct ExtendedHeader {
    /// Lowest record index in the table
    pub min_index: u32,

    /// Highest record index in the table
    pub max_index: u32,

    /// Bitmask of locales the file was built for
    pub locale: u32,

    /// Purpose unknown
    pub unknown: u32,
}

/// Header revision a file was written with
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HeaderRevision {
    /// Eight field header
    Legacy,
    /// Twelve field header
    Extended,
}

impl Db2Header {
    /// Read the header from the start of a file, leaving `reader` positioned after it.
    pub fn from_reader<R: Read + Seek>(reader: &mut R) -> Result<Db2Header> {
        Ok(Db2Header::read(reader)?)
    }

    /// Size of the header on disk, excluding the legacy index block.
    pub fn size(&self) -> usize {
        match self.revision() {
            HeaderRevision::Legacy => 32,
            HeaderRevision::Extended => 48,
        }
    }

    /// Which header layout the file uses.
    pub fn revision(&self) -> HeaderRevision {
        match self.extended {
            Some(_) => HeaderRevision::Extended,
            None => HeaderRevision::Legacy,
        }
    }

    /// Lowest record index, zero for legacy headers.
    pub fn min_index(&self) -> u32 {
        self.extended.map(|e| e.min_index).unwrap_or_default()
    }

    /// Highest record index, zero for legacy headers.
    pub fn max_index(&self) -> u32 {
        self.extended.map(|e| e.max_index).unwrap_or_default()
    }

    /// Locale bitmask, zero for legacy headers.
    pub fn locale(&self) -> u32 {
        self.extended.map(|e| e.locale).unwrap_or_default()
    }

    /// Size of the block of row indices and allocation banks following the header.
    ///
    /// Each index between `min_index` and `max_index` holds a 4 byte row index and a 2
    /// byte allocation bank.
    pub fn legacy_block_size(&self) -> Result<usize> {
        let (min_index, max_index) = (self.min_index(), self.max_index());
        if max_index == 0 {
            return Ok(0);
        }
        if max_index < min_index {
            return Err(Error::InvalidIndexRange {
                min_index,
                max_index,
            });
        }

        let diff = (max_index - min_index) as usize + 1;
        Ok(diff * 4 + diff * 2)
    }

    /// Size of the record block.
    pub fn records_size(&self) -> usize {
        self.record_size as usize * self.record_count as usize
    }

    /// Size of the record block and string pool that follow the header.
    pub fn payload_size(&self) -> usize {
        self.records_size() + self.string_size as usize
    }
}
