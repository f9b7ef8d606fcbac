//! Table schema descriptors.
//!
//! A WDB2 file does not describe its own columns. Each consumer supplies a format string
//! with one character per field; the tag decides how many bytes the field occupies in
//! the raw record and how many it occupies once materialized.

use derive_more::derive::Display;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::strings::LOCALIZED_STRING_SIZE;

/// Type of a single field in a format string
#[derive(Debug, Display, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldType {
    /// `x`: 4 unused bytes
    #[display("x")]
    NotAvailable,

    /// `X`: 1 unused byte
    #[display("X")]
    NotAvailableByte,

    /// `s`: 4 byte offset into the string pool
    #[display("s")]
    String,

    /// `f`: 4 byte IEEE754 float
    #[display("f")]
    Float,

    /// `i`: 4 byte unsigned integer
    #[display("i")]
    Int,

    /// `b`: single byte
    #[display("b")]
    Byte,

    /// `d`: index field that is kept out of the materialized row
    #[display("d")]
    Sort,

    /// `n`: index field that is kept in the materialized row
    #[display("n")]
    Index,
}

impl FieldType {
    /// Bytes this field occupies inside a raw file record.
    pub const fn raw_size(self) -> usize {
        match self {
            FieldType::Byte | FieldType::NotAvailableByte => 1,
            _ => 4,
        }
    }

    /// Bytes this field occupies inside a materialized row.
    pub const fn output_size(self) -> usize {
        match self {
            FieldType::Float | FieldType::Int | FieldType::Index => 4,
            FieldType::String => LOCALIZED_STRING_SIZE,
            FieldType::Byte => 1,
            FieldType::Sort | FieldType::NotAvailable | FieldType::NotAvailableByte => 0,
        }
    }

    /// Whether the field marks the key used for indexed materialization.
    pub const fn is_index(self) -> bool {
        matches!(self, FieldType::Sort | FieldType::Index)
    }

    pub(crate) const fn name(self) -> &'static str {
        match self {
            FieldType::NotAvailable | FieldType::NotAvailableByte => "unused",
            FieldType::String => "string",
            FieldType::Float => "float",
            FieldType::Int | FieldType::Index => "u32",
            FieldType::Byte => "u8",
            FieldType::Sort => "sort key",
        }
    }
}

impl TryFrom<char> for FieldType {
    type Error = char;

    fn try_from(value: char) -> core::result::Result<Self, Self::Error> {
        match value {
            'x' => Ok(FieldType::NotAvailable),
            'X' => Ok(FieldType::NotAvailableByte),
            's' => Ok(FieldType::String),
            'f' => Ok(FieldType::Float),
            'i' => Ok(FieldType::Int),
            'b' => Ok(FieldType::Byte),
            'd' => Ok(FieldType::Sort),
            'n' => Ok(FieldType::Index),
            other => Err(other),
        }
    }
}

/// A parsed format string
///
/// ```
/// use wdb2::format::{Format, FieldType};
///
/// let format: Format = "nsfib".parse().unwrap();
/// assert_eq!(format.len(), 5);
/// assert_eq!(format.index_field(), Some(0));
/// assert_eq!(format.record_size(), (4 + 36 + 4 + 4 + 1, Some(0)));
/// assert_eq!(format.field(1), Some(FieldType::String));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Format {
    fields: Vec<FieldType>,
    index: Option<usize>,
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let fields = s
            .chars()
            .enumerate()
            .map(|(position, c)| {
                FieldType::try_from(c).map_err(|tag| Error::InvalidFormatTag { tag, position })
            })
            .collect::<Result<Vec<_>>>()?;

        Format::new(fields)
    }
}

impl Format {
    /// Build a format from already classified fields.
    pub fn new(fields: Vec<FieldType>) -> Result<Self> {
        let mut index = None;
        for (position, field) in fields.iter().enumerate() {
            if !field.is_index() {
                continue;
            }
            if let Some(first) = index {
                return Err(Error::DuplicateIndexField {
                    first,
                    second: position,
                });
            }
            index = Some(position);
        }

        Ok(Format { fields, index })
    }

    /// Number of fields described.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the format describes no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Type of the field at `position`.
    pub fn field(&self, position: usize) -> Option<FieldType> {
        self.fields.get(position).copied()
    }

    /// Iterate over the field types in order.
    pub fn fields(&self) -> impl Iterator<Item = FieldType> + '_ {
        self.fields.iter().copied()
    }

    /// Position of the `d` or `n` field, if any.
    pub fn index_field(&self) -> Option<usize> {
        self.index
    }

    /// Size of a materialized row along with the index field position.
    pub fn record_size(&self) -> (usize, Option<usize>) {
        (self.fields().map(FieldType::output_size).sum(), self.index)
    }

    /// Number of string fields.
    pub fn string_field_count(&self) -> usize {
        self.fields().filter(|f| *f == FieldType::String).count()
    }

    /// Byte offsets of every field inside a raw file record.
    pub fn field_offsets(&self) -> FieldOffsets {
        let mut offsets = Vec::with_capacity(self.fields.len());
        let mut offset = 0;
        for field in self.fields() {
            offsets.push(offset);
            offset += field.raw_size();
        }
        FieldOffsets { offsets, end: offset }
    }

    /// Byte offsets of every stored field inside a materialized row.
    ///
    /// Fields without output bytes map to `None`.
    pub fn output_offsets(&self) -> Vec<Option<usize>> {
        let mut offset = 0;
        self.fields()
            .map(|field| {
                let size = field.output_size();
                let current = (size > 0).then_some(offset);
                offset += size;
                current
            })
            .collect()
    }

    /// Fail unless the format has exactly `field_count` tags.
    pub fn expect_fields(&self, field_count: u32) -> Result<()> {
        if self.len() != field_count as usize {
            return Err(Error::FormatMismatch {
                expected: field_count,
                actual: self.len(),
            });
        }
        Ok(())
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.fields().try_for_each(|field| write!(f, "{field}"))
    }
}

/// Byte offsets of each field within a raw record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldOffsets {
    offsets: Vec<usize>,
    end: usize,
}

impl FieldOffsets {
    /// Offset of the field at `index`.
    pub fn get(&self, index: usize) -> Option<usize> {
        self.offsets.get(index).copied()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether there are no fields
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Offset one past the last field.
    pub fn end(&self) -> usize {
        self.end
    }

    /// All offsets in field order.
    pub fn as_slice(&self) -> &[usize] {
        &self.offsets
    }
}
