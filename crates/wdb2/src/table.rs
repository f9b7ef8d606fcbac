//! Materialized tables and their index.
//!
//! Materialization copies every record of a loaded file into a densely packed row
//! layout described by the consumer's format. Rows keep file order; the [`IndexTable`]
//! maps either the row number or the value of the index field to a row.

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::{debug, instrument, trace};

use crate::{
    error::{Error, OutOfBoundsError, Result},
    format::{FieldType, Format},
    read::Db2File,
    strings::{LocalizedString, Locale, StringPool, LOCALIZED_STRING_SIZE},
};

/// Maps keys to row numbers of a [`MaterializedTable`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexTable {
    slots: Vec<Option<u32>>,
    keyed: bool,
}

impl IndexTable {
    /// Number of slots, including empty ones.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the index has no slots
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Whether slots are keyed by an index field rather than by file order.
    pub fn is_keyed(&self) -> bool {
        self.keyed
    }

    /// Row stored under `key`.
    pub fn get(&self, key: usize) -> Option<usize> {
        self.slots.get(key).copied().flatten().map(|row| row as usize)
    }

    /// Every slot in key order.
    pub fn slots(&self) -> &[Option<u32>] {
        &self.slots
    }

    /// Occupied slots as `(key, row)` pairs in key order.
    pub fn entries(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(key, row)| row.map(|row| (key, row as usize)))
    }
}

/// A converted value read from a materialized row
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum FieldValue<'a> {
    /// Float field
    Float(f32),
    /// Integer or index field
    UInt(u32),
    /// Byte field
    Byte(u8),
    /// String field, `None` when unresolved for the pool's locale
    String(Option<&'a str>),
}

/// Fixed layout table produced by [`Db2File::materialize`]
///
/// Owns its rows outright; string slots hold offsets into the [`StringPool`]s produced by
/// [`Db2File::resolve_strings`].
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedTable {
    format: Format,
    offsets: Vec<Option<usize>>,
    row_size: usize,
    rows: usize,
    data: Vec<u8>,
}

impl MaterializedTable {
    /// The format the rows were laid out with.
    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Size of a single row in bytes.
    pub fn row_size(&self) -> usize {
        self.row_size
    }

    /// The packed rows.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Get a row by its position, which matches the record's position in the file.
    pub fn row(&self, index: usize) -> Result<Row<'_>> {
        if index >= self.rows {
            return Err(OutOfBoundsError::Row {
                index,
                count: self.rows,
            }
            .into());
        }

        let start = index * self.row_size;
        Ok(Row {
            table: self,
            index,
            data: &self.data[start..start + self.row_size],
        })
    }

    /// Look a row up through an index produced alongside this table.
    pub fn lookup(&self, index: &IndexTable, key: usize) -> Option<Row<'_>> {
        index.get(key).and_then(|row| self.row(row).ok())
    }

    /// Iterate over every row in file order.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = Row<'_>> + '_ {
        (0..self.rows).map(move |index| {
            let start = index * self.row_size;
            Row {
                table: self,
                index,
                data: &self.data[start..start + self.row_size],
            }
        })
    }

    fn field(&self, field: usize, requested: &'static str) -> Result<(FieldType, usize)> {
        let field_type = self.format.field(field).ok_or(OutOfBoundsError::Field {
            index: field,
            count: self.format.len(),
        })?;
        let offset = self.offsets[field].ok_or(OutOfBoundsError::FieldType {
            index: field,
            actual: field_type.name(),
            requested,
        })?;
        Ok((field_type, offset))
    }

    pub(crate) fn set_string_offset(
        &mut self,
        row: usize,
        field: usize,
        locale: Locale,
        offset: u32,
    ) -> Result<()> {
        let (_, start) = self.field(field, "string")?;
        let slot = row * self.row_size + start + locale.slot() * 4;
        LittleEndian::write_u32(&mut self.data[slot..slot + 4], offset);
        Ok(())
    }
}

/// A single row of a [`MaterializedTable`]
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a MaterializedTable,
    index: usize,
    data: &'a [u8],
}

impl<'a> Row<'a> {
    /// Position of the row in the table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The packed bytes of this row.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    fn typed(&self, field: usize, expected: &[FieldType], requested: &'static str) -> Result<usize> {
        let (field_type, offset) = self.table.field(field, requested)?;
        if !expected.contains(&field_type) {
            return Err(OutOfBoundsError::FieldType {
                index: field,
                actual: field_type.name(),
                requested,
            }
            .into());
        }
        Ok(offset)
    }

    /// Read an integer or index field.
    pub fn get_u32(&self, field: usize) -> Result<u32> {
        let offset = self.typed(field, &[FieldType::Int, FieldType::Index], "u32")?;
        Ok(LittleEndian::read_u32(&self.data[offset..offset + 4]))
    }

    /// Read a float field.
    pub fn get_f32(&self, field: usize) -> Result<f32> {
        let offset = self.typed(field, &[FieldType::Float], "float")?;
        Ok(LittleEndian::read_f32(&self.data[offset..offset + 4]))
    }

    /// Read a byte field.
    pub fn get_u8(&self, field: usize) -> Result<u8> {
        let offset = self.typed(field, &[FieldType::Byte], "u8")?;
        Ok(self.data[offset])
    }

    /// Read the localized slot of a string field.
    pub fn get_string(&self, field: usize) -> Result<LocalizedString<'a>> {
        let offset = self.typed(field, &[FieldType::String], "string")?;
        Ok(LocalizedString::new(
            &self.data[offset..offset + LOCALIZED_STRING_SIZE],
        ))
    }

    /// Read a string field through `pool`.
    pub fn get_str(&self, field: usize, pool: &'a StringPool) -> Result<Option<&'a str>> {
        self.get_string(field)?.get(pool)
    }

    /// Every stored field as `(field, value)`, with strings resolved through `pool`.
    pub fn values(&self, pool: Option<&'a StringPool>) -> Result<Vec<(usize, FieldValue<'a>)>> {
        self.table
            .format
            .fields()
            .enumerate()
            .filter(|(_, field_type)| field_type.output_size() > 0)
            .map(|(field, field_type)| -> Result<(usize, FieldValue<'a>)> {
                let value = match field_type {
                    FieldType::Float => FieldValue::Float(self.get_f32(field)?),
                    FieldType::Byte => FieldValue::Byte(self.get_u8(field)?),
                    FieldType::String => match pool {
                        Some(pool) => FieldValue::String(self.get_str(field, pool)?),
                        None => FieldValue::String(None),
                    },
                    _ => FieldValue::UInt(self.get_u32(field)?),
                };
                Ok((field, value))
            })
            .collect()
    }
}

impl Db2File {
    /// Convert every record into a row laid out by `format`.
    ///
    /// When `format` has an index field the index is keyed by that field's value and has
    /// `max + 1` slots; duplicate keys point at the last record in file order. Otherwise
    /// the index holds one slot per record in file order. An index larger than
    /// [`LoadOptions::max_index_slots`](crate::LoadOptions) fails with `IndexTooLarge`.
    #[instrument(skip(self, format), fields(format = %format), err)]
    pub fn materialize(&self, format: &Format) -> Result<(MaterializedTable, IndexTable)> {
        format.expect_fields(self.header().field_count)?;

        let (row_size, index_field) = format.record_size();

        let limit = self.options().max_index_slots;
        let mut index = match index_field {
            Some(field) => {
                let mut max = 0;
                for record in self.records() {
                    max = max.max(record.get_u32(field)?);
                }
                debug!(field, max, "building keyed index");
                IndexTable {
                    slots: empty_slots(max as usize + 1, limit)?,
                    keyed: true,
                }
            }
            None => IndexTable {
                slots: empty_slots(self.len(), limit)?,
                keyed: false,
            },
        };

        let size = row_size.saturating_mul(self.len());
        let mut data = Vec::new();
        data.try_reserve_exact(size)
            .map_err(|source| Error::Allocation {
                what: "row bytes",
                count: size,
                source,
            })?;
        for (row, record) in self.records().enumerate() {
            let key = match index_field {
                Some(field) => record.get_u32(field)? as usize,
                None => row,
            };
            // Row numbers are bounded by the header's u32 record count.
            if let Some(previous) = index.slots[key].replace(row as u32) {
                trace!(key, previous, row, "duplicate key replaced");
            }

            for (field, field_type) in format.fields().enumerate() {
                match field_type {
                    FieldType::Float => data.write_f32::<LittleEndian>(record.get_f32(field)?)?,
                    FieldType::Int | FieldType::Index => {
                        data.write_u32::<LittleEndian>(record.get_u32(field)?)?
                    }
                    FieldType::Byte => data.write_u8(record.get_u8(field)?)?,
                    FieldType::String => data.extend_from_slice(&[0xFF; LOCALIZED_STRING_SIZE]),
                    FieldType::Sort | FieldType::NotAvailable | FieldType::NotAvailableByte => {}
                }
            }
        }

        debug!(rows = self.len(), row_size, "materialized table");

        Ok((
            MaterializedTable {
                offsets: format.output_offsets(),
                format: format.clone(),
                row_size,
                rows: self.len(),
                data,
            },
            index,
        ))
    }
}

/// Allocate `len` empty index slots, failing instead of aborting on huge requests.
fn empty_slots(len: usize, limit: Option<usize>) -> Result<Vec<Option<u32>>> {
    if let Some(limit) = limit {
        if len > limit {
            return Err(Error::IndexTooLarge { slots: len, limit });
        }
    }

    let mut slots = Vec::new();
    slots
        .try_reserve_exact(len)
        .map_err(|source| Error::Allocation {
            what: "index slots",
            count: len,
            source,
        })?;
    slots.resize(len, None);
    Ok(slots)
}
