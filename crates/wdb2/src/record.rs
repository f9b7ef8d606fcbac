//! Zero copy access to raw file records.

use byteorder::{ByteOrder, LittleEndian};
use std::ffi::CStr;

use crate::error::{OutOfBoundsError, Result};
use crate::format::FieldOffsets;
use crate::strings::read_cstr;

/// A single fixed stride record borrowed from a loaded file
///
/// Every read is checked against the record stride and the string pool, so a format
/// that does not fit the file fails instead of reading a neighbouring record.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    data: &'a [u8],
    offsets: &'a FieldOffsets,
    strings: &'a [u8],
}

impl<'a> Record<'a> {
    pub(crate) fn new(data: &'a [u8], offsets: &'a FieldOffsets, strings: &'a [u8]) -> Self {
        Record {
            data,
            offsets,
            strings,
        }
    }

    /// The raw bytes of this record.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Number of fields addressable through this record.
    pub fn field_count(&self) -> usize {
        self.offsets.len()
    }

    fn field(&self, index: usize, len: usize) -> Result<&'a [u8]> {
        let offset = self.offsets.get(index).ok_or(OutOfBoundsError::Field {
            index,
            count: self.offsets.len(),
        })?;

        Ok(self
            .data
            .get(offset..offset + len)
            .ok_or(OutOfBoundsError::Offset {
                offset,
                len,
                size: self.data.len(),
            })?)
    }

    /// Read a field as an unsigned 32 bit integer.
    pub fn get_u32(&self, index: usize) -> Result<u32> {
        Ok(LittleEndian::read_u32(self.field(index, 4)?))
    }

    /// Read a field as a 32 bit float.
    pub fn get_f32(&self, index: usize) -> Result<f32> {
        Ok(LittleEndian::read_f32(self.field(index, 4)?))
    }

    /// Read a field as a single byte.
    pub fn get_u8(&self, index: usize) -> Result<u8> {
        Ok(self.field(index, 1)?[0])
    }

    /// Read a string field's offset into the string pool.
    pub fn get_string_offset(&self, index: usize) -> Result<u32> {
        let offset = self.get_u32(index)?;
        if offset as usize >= self.strings.len() {
            return Err(OutOfBoundsError::StringOffset {
                offset,
                size: self.strings.len(),
            }
            .into());
        }
        Ok(offset)
    }

    /// Read a string field, resolving it through the string pool.
    pub fn get_cstr(&self, index: usize) -> Result<&'a CStr> {
        read_cstr(self.strings, self.get_u32(index)?)
    }

    /// Read a string field as UTF-8.
    pub fn get_str(&self, index: usize) -> Result<&'a str> {
        Ok(self.get_cstr(index)?.to_str()?)
    }
}
