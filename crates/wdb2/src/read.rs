//! Types for loading WDB2 files
//!

use bon::Builder;
use std::{
    fmt::{self, Debug},
    io::{Cursor, Read},
    path::Path,
};
use tracing::{debug, instrument, warn};

use crate::{
    error::{Error, OutOfBoundsError, Result},
    format::{FieldOffsets, Format},
    header::Db2Header,
    record::Record,
};

/// Options for how a WDB2 file should be loaded
#[derive(Debug, Clone, Copy, Default, Builder)]
pub struct LoadOptions {
    /// Ignore bytes after the string pool instead of failing the load
    #[builder(default)]
    pub allow_trailing_data: bool,

    /// Refuse to materialize an index needing more slots than this
    pub max_index_slots: Option<usize>,
}

/// A loaded WDB2 file
///
/// Holds the header and the raw record block plus string pool. Loading always produces
/// a fresh value; materialized tables and string pools borrow nothing from it.
///
/// ```no_run
/// fn list_names(path: &str) -> wdb2::error::Result<()> {
///     let file = wdb2::Db2File::open(path, "nsi")?;
///
///     for record in file.records() {
///         println!("{}: {}", record.get_u32(0)?, record.get_str(1)?);
///     }
///
///     Ok(())
/// }
/// ```
pub struct Db2File {
    header: Db2Header,
    format: Format,
    offsets: FieldOffsets,
    options: LoadOptions,
    data: Vec<u8>,
}

impl Debug for Db2File {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Db2File")
            .field("header", &self.header)
            .field("format", &self.format.to_string())
            .finish_non_exhaustive()
    }
}

impl Db2File {
    /// Read the file at `path` using `format` to locate fields.
    pub fn open(path: impl AsRef<Path>, format: &str) -> Result<Db2File> {
        Self::open_with_options(path, format, LoadOptions::default())
    }

    /// Read the file at `path` with explicit options.
    #[instrument(skip_all, fields(path = %path.as_ref().display()), err)]
    pub fn open_with_options(
        path: impl AsRef<Path>,
        format: &str,
        options: LoadOptions,
    ) -> Result<Db2File> {
        let data = std::fs::read(path)?;
        Self::from_bytes_with_options(data, format, options)
    }

    /// Read a whole WDB2 file from `reader`.
    pub fn new<R: Read>(mut reader: R, format: &str) -> Result<Db2File> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes(data, format)
    }

    /// Parse a WDB2 file already held in memory.
    pub fn from_bytes(data: Vec<u8>, format: &str) -> Result<Db2File> {
        Self::from_bytes_with_options(data, format, LoadOptions::default())
    }

    /// Parse a WDB2 file already held in memory with explicit options.
    #[instrument(skip(data), fields(len = data.len()), err)]
    pub fn from_bytes_with_options(
        mut data: Vec<u8>,
        format: &str,
        options: LoadOptions,
    ) -> Result<Db2File> {
        let format: Format = format.parse()?;

        let mut cursor = Cursor::new(data.as_slice());
        let header = Db2Header::from_reader(&mut cursor)?;
        debug!(
            revision = ?header.revision(),
            records = header.record_count,
            fields = header.field_count,
            record_size = header.record_size,
            string_size = header.string_size,
            build = header.build,
            "read header"
        );

        format.expect_fields(header.field_count)?;

        let legacy = header.legacy_block_size()?;
        if legacy > 0 {
            debug!(bytes = legacy, "skipping legacy index block");
        }

        let start = cursor.position() as usize + legacy;
        if start > data.len() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!(
                    "expected {legacy} bytes of legacy index block, file ends at {}",
                    data.len()
                ),
            )
            .into());
        }

        let payload = header.payload_size();
        let available = data.len() - start;
        if available < payload {
            return Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("expected {payload} bytes of records and strings, found {available}"),
            )
            .into());
        }
        if available > payload {
            let extra = available - payload;
            if !options.allow_trailing_data {
                return Err(Error::TrailingData { extra });
            }
            warn!(extra, "ignoring data after the string pool");
        }

        let offsets = format.field_offsets();
        if offsets.end() > header.record_size as usize {
            warn!(
                format = offsets.end(),
                file = header.record_size,
                "format describes more bytes than a record holds"
            );
        }

        data.truncate(start + payload);
        data.drain(..start);

        Ok(Db2File {
            header,
            format,
            offsets,
            options,
            data,
        })
    }

    /// The parsed file header.
    pub fn header(&self) -> &Db2Header {
        &self.header
    }

    /// The format the file was loaded with.
    pub fn format(&self) -> &Format {
        &self.format
    }

    /// Options the file was loaded with.
    pub fn options(&self) -> &LoadOptions {
        &self.options
    }

    /// Offsets of each field inside a raw record.
    pub fn field_offsets(&self) -> &FieldOffsets {
        &self.offsets
    }

    /// Number of records in the file.
    pub fn len(&self) -> usize {
        self.header.record_count as usize
    }

    /// Whether the file contains no records
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of fields in each record.
    pub fn field_count(&self) -> usize {
        self.header.field_count as usize
    }

    /// The raw string pool following the records.
    pub fn string_pool(&self) -> &[u8] {
        &self.data[self.header.records_size()..]
    }

    /// Get a record by its position in the file.
    pub fn record(&self, index: usize) -> Result<Record<'_>> {
        if index >= self.len() {
            return Err(OutOfBoundsError::Record {
                index,
                count: self.len(),
            }
            .into());
        }

        let stride = self.header.record_size as usize;
        let start = index * stride;
        Ok(Record::new(
            &self.data[start..start + stride],
            &self.offsets,
            self.string_pool(),
        ))
    }

    /// Iterate over every record in file order.
    pub fn records(&self) -> impl ExactSizeIterator<Item = Record<'_>> + '_ {
        let stride = self.header.record_size as usize;
        let strings = self.string_pool();
        (0..self.len()).map(move |index| {
            let start = index * stride;
            Record::new(&self.data[start..start + stride], &self.offsets, strings)
        })
    }
}
