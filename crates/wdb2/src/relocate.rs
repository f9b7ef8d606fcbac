//! Relocation of string references into an owned pool.

use tracing::{debug, instrument};

use crate::{
    error::{Error, Result},
    format::{FieldType, Format},
    read::Db2File,
    strings::{Locale, StringPool},
    table::MaterializedTable,
};

impl Db2File {
    /// Copy this file's string pool and point `locale`'s slot of every string field in
    /// `table` into the copy.
    ///
    /// `table` may come from another file with the same layout, typically the same table
    /// shipped for another locale. Slots of other locales are left untouched. On error no
    /// slot is written.
    #[instrument(skip(self, format, table), fields(format = %format), err)]
    pub fn resolve_strings(
        &self,
        format: &Format,
        table: &mut MaterializedTable,
        locale: Locale,
    ) -> Result<StringPool> {
        format.expect_fields(self.header().field_count)?;

        if table.format() != format {
            return Err(Error::TableFormatMismatch {
                table: table.format().to_string(),
                requested: format.to_string(),
            });
        }
        if table.len() != self.len() {
            return Err(Error::TableMismatch {
                expected: self.len(),
                actual: table.len(),
            });
        }

        let string_fields = format
            .fields()
            .enumerate()
            .filter(|(_, field_type)| *field_type == FieldType::String)
            .map(|(field, _)| field)
            .collect::<Vec<_>>();

        let mut resolved = Vec::with_capacity(self.len() * string_fields.len());
        for (row, record) in self.records().enumerate() {
            for &field in &string_fields {
                resolved.push((row, field, record.get_string_offset(field)?));
            }
        }

        for (row, field, offset) in resolved {
            table.set_string_offset(row, field, locale, offset)?;
        }

        debug!(
            fields = string_fields.len(),
            pool = self.string_pool().len(),
            "resolved strings"
        );

        Ok(StringPool::new(self.string_pool().to_vec(), locale))
    }
}
