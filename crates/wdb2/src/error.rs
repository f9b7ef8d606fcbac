//! Error types that can be emitted from this library
//!
//! Errors fall into two groups: a *bad file* (I/O failures, short reads, a wrong
//! signature, an impossible header) and a *bad schema* (a format string that does not
//! describe the file it is applied to). Out of bounds reads are reported separately so
//! callers can tell a corrupt string offset from a malformed header.

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),

    /// Transparent wrapper for [`std::str::Utf8Error`]
    #[error(transparent)]
    Utf8Error(#[from] std::str::Utf8Error),

    /// file does not start with the WDB2 signature
    #[error("file is not a WDB2 table (found signature {found})")]
    #[diagnostic(help("WDB2 files start with the four bytes \"WDB2\""))]
    BadMagic {
        /// Debug rendering of the bytes found where the signature was expected
        found: String,
    },

    /// header declares a legacy index block with an impossible range
    #[error("invalid legacy index range {min_index}..={max_index}")]
    InvalidIndexRange {
        /// Lowest index declared by the header
        min_index: u32,
        /// Highest index declared by the header
        max_index: u32,
    },

    /// file carries bytes after the string pool
    #[error("{extra} unexpected bytes after the string pool")]
    TrailingData {
        /// Number of bytes past the declared payload
        extra: usize,
    },

    /// format string does not describe as many fields as the file
    #[error("format describes {actual} fields but the file has {expected}")]
    #[diagnostic(help("the table schema does not match this file's build"))]
    FormatMismatch {
        /// Field count declared by the file header
        expected: u32,
        /// Number of tags in the format string
        actual: usize,
    },

    /// format string contains a character outside the known tag set
    #[error("invalid format tag {tag:?} at position {position}")]
    #[diagnostic(help("valid tags are x, X, s, f, i, b, d and n"))]
    InvalidFormatTag {
        /// The offending character
        tag: char,
        /// Position of the character in the format string
        position: usize,
    },

    /// format string marks more than one field as the index
    #[error("format marks both field {first} and field {second} as the index")]
    DuplicateIndexField {
        /// Position of the first index marker
        first: usize,
        /// Position of the second index marker
        second: usize,
    },

    /// materialized table was not produced from a file of this shape
    #[error("table has {actual} rows but the file has {expected} records")]
    TableMismatch {
        /// Record count of the file being resolved
        expected: usize,
        /// Row count of the table
        actual: usize,
    },

    /// materialized table was laid out with another format
    #[error("table was materialized with format {table:?}, not {requested:?}")]
    TableFormatMismatch {
        /// Format of the table
        table: String,
        /// Format passed for resolution
        requested: String,
    },

    /// index would need more slots than the load options allow
    #[error("index needs {slots} slots, more than the limit of {limit}")]
    #[diagnostic(help("the file holds a key or record count far larger than its data"))]
    IndexTooLarge {
        /// Slots the index would need
        slots: usize,
        /// Limit from the load options
        limit: usize,
    },

    /// memory for a materialized table could not be reserved
    #[error("could not allocate {count} {what}")]
    Allocation {
        /// What was being allocated
        what: &'static str,
        /// Number of elements requested
        count: usize,
        /// Error reported by the allocator
        #[source]
        source: std::collections::TryReserveError,
    },

    /// a read fell outside the buffer it addresses
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBoundsError),
}

/// Error type to provide further information when a read would leave its buffer
#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum OutOfBoundsError {
    /// record {index} of {count}
    #[error("record {index} is out of range ({count} records)")]
    Record {
        /// Requested record
        index: usize,
        /// Number of records
        count: usize,
    },

    /// row {index} of {count}
    #[error("row {index} is out of range ({count} rows)")]
    Row {
        /// Requested row
        index: usize,
        /// Number of rows
        count: usize,
    },

    /// field {index} of {count}
    #[error("field {index} is out of range ({count} fields)")]
    Field {
        /// Requested field
        index: usize,
        /// Number of fields
        count: usize,
    },

    /// {len} bytes at {offset} past a {size} byte buffer
    #[error("read of {len} bytes at offset {offset} exceeds {size} byte record")]
    Offset {
        /// Start of the read
        offset: usize,
        /// Length of the read
        len: usize,
        /// Size of the addressed buffer
        size: usize,
    },

    /// string offset {offset} past a {size} byte pool
    #[error("string offset {offset} exceeds {size} byte string pool")]
    StringOffset {
        /// Offset read from the record
        offset: u32,
        /// Size of the string pool
        size: usize,
    },

    /// string at {offset} runs off the end of the pool
    #[error("string at offset {offset} is not null terminated")]
    UnterminatedString {
        /// Offset read from the record
        offset: u32,
    },

    /// unknown locale {0}
    #[error("locale {0} is not supported")]
    Locale(u32),

    /// field {index} does not hold the requested type
    #[error("field {index} is {actual}, not {requested}")]
    FieldType {
        /// Requested field
        index: usize,
        /// Name of the type stored at the field
        actual: &'static str,
        /// Name of the type the caller asked for
        requested: &'static str,
    },
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        match value.root_cause() {
            binrw::Error::BadMagic { found, .. } => Error::BadMagic {
                found: format!("{found:?}"),
            },
            binrw::Error::Io(e) => Error::IOError(std::io::Error::new(e.kind(), e.to_string())),
            _ => Error::BinRWError(value),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
