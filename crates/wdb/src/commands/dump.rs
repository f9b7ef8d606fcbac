use clap::Args;
use itertools::Itertools;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::info;
use wdb2::{Db2File, FieldValue, Format, LoadOptions, Locale};

#[derive(Args)]
pub struct DumpArgs {
    /// An input WDB2 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Format string describing the file's fields, one character per field
    #[arg(short = 'F', long, value_name = "FORMAT")]
    format: String,

    /// Format string used to materialize rows, defaults to the file's format
    #[arg(long, value_name = "FORMAT")]
    layout: Option<String>,

    /// Locale slot the file's strings are resolved into
    #[arg(short, long, default_value = "enUS")]
    locale: Locale,

    /// Largest index to build before giving up on the file
    #[arg(long, value_name = "SLOTS", default_value_t = 1 << 24)]
    max_index_slots: usize,

    /// Tolerate bytes after the string pool
    #[arg(long, default_value_t = false)]
    allow_trailing_data: bool,

    /// Print one JSON object per row
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl DumpArgs {
    pub fn handle(&self) -> Result<()> {
        let options = LoadOptions::builder()
            .allow_trailing_data(self.allow_trailing_data)
            .max_index_slots(self.max_index_slots)
            .build();
        let file = Db2File::open_with_options(&self.file, &self.format, options)?;

        let layout: Format = self.layout.as_deref().unwrap_or(&self.format).parse()?;
        let (mut table, index) = file.materialize(&layout)?;
        let pool = file.resolve_strings(&layout, &mut table, self.locale)?;

        info!(
            rows = table.len(),
            keyed = index.is_keyed(),
            "dumping {}",
            self.file.display()
        );

        for (key, row) in index.entries() {
            let values = table.row(row)?.values(Some(&pool))?;
            if self.json {
                let object = values
                    .into_iter()
                    .map(|(field, value)| (field.to_string(), value))
                    .collect::<std::collections::BTreeMap<_, _>>();
                println!("{}", serde_json::to_string(&object).into_diagnostic()?);
            } else {
                println!("{key}: {}", values.iter().map(|(_, v)| display(v)).join(" | "));
            }
        }

        Ok(())
    }
}

fn display(value: &FieldValue) -> String {
    match value {
        FieldValue::Float(v) => v.to_string(),
        FieldValue::UInt(v) => v.to_string(),
        FieldValue::Byte(v) => v.to_string(),
        FieldValue::String(Some(v)) => format!("{v:?}"),
        FieldValue::String(None) => "-".into(),
    }
}
