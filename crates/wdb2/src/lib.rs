//! This library handles loading **WDB2** client data tables into fixed layout in-memory tables.
//!
//! # WDB2 Format Documentation
//!
//! WDB2 files (usually named `*.db2`) ship structured client side game data such as items or
//! spells as a flat array of fixed size records followed by a pool of null terminated
//! strings. The file does not describe its columns; every consumer supplies a format string
//! with one character per field.
//!
//! ## File Structure
//!
//! A WDB2 file consists of a header, an optional legacy index block, the records, and the
//! string pool.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "WDB2"                                            |
//! | 0x0004         | Record Count           | 4 bytes: Number of records in the file                     |
//! | 0x0008         | Field Count            | 4 bytes: Number of fields in each record                   |
//! | 0x000C         | Record Size            | 4 bytes: Size in bytes of a single record                  |
//! | 0x0010         | String Size            | 4 bytes: Size in bytes of the string pool                  |
//! | 0x0014         | Table Hash             | 4 bytes: Hash identifying the table                        |
//! | 0x0018         | Build                  | 4 bytes: Client build that produced the file               |
//! | 0x001C         | Unknown                | 4 bytes                                                    |
//! | 0x0020         | Min Index              | 4 bytes: Only when build > 12880                           |
//! | 0x0024         | Max Index              | 4 bytes: Only when build > 12880                           |
//! | 0x0028         | Locale                 | 4 bytes: Only when build > 12880                           |
//! | 0x002C         | Unknown                | 4 bytes: Only when build > 12880                           |
//!
//! ### Legacy Index Block
//!
//! When the max index is non zero, `(max - min + 1) * 6` bytes follow the header: a 4 byte
//! row index and a 2 byte allocation bank for every index in the range. The block is
//! skipped.
//!
//! ### Records
//!
//! `Record Count` records of `Record Size` bytes each. Fields are packed in format order; a
//! field takes a single byte for the `b` and `X` tags and 4 bytes for every other tag.
//! String fields hold a 4 byte offset into the string pool.
//!
//! ### String Pool
//!
//! `String Size` bytes of null terminated strings.
//!
//! ## Format Strings
//!
//! | Tag | Meaning                      | Raw bytes | Materialized bytes |
//! |-----|------------------------------|-----------|--------------------|
//! | `x` | unused                       | 4         | 0                  |
//! | `X` | unused byte                  | 1         | 0                  |
//! | `s` | string                       | 4         | one slot per locale|
//! | `f` | float                        | 4         | 4                  |
//! | `i` | unsigned integer             | 4         | 4                  |
//! | `b` | byte                         | 1         | 1                  |
//! | `d` | index, dropped from the row  | 4         | 0                  |
//! | `n` | index, kept in the row       | 4         | 4                  |
//!
//! ## Additional Information
//!
//! - **File Extension**: `.db2`
//! - **Endianness**: Little-endian for all multi-byte integers
//!
//! ```no_run
//! use wdb2::{Db2File, Locale};
//!
//! fn load_items() -> wdb2::error::Result<()> {
//!     let format = "niiis".parse()?;
//!     let file = Db2File::open("Item-sparse.db2", "niiis")?;
//!
//!     let (mut table, index) = file.materialize(&format)?;
//!     let pool = file.resolve_strings(&format, &mut table, Locale::enUS)?;
//!
//!     if let Some(item) = table.lookup(&index, 25) {
//!         println!("{:?}", item.get_str(4, &pool)?);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod format;
pub mod header;
pub mod read;
pub mod record;
mod relocate;
pub mod strings;
pub mod table;

pub use format::{FieldType, Format};
pub use header::Db2Header;
pub use read::{Db2File, LoadOptions};
pub use record::Record;
pub use strings::{Locale, StringPool};
pub use table::{FieldValue, IndexTable, MaterializedTable, Row};
