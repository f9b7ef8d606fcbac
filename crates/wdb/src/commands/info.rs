use clap::Args;
use itertools::Itertools;
use miette::{Context, IntoDiagnostic, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use std::{fs::File, io::BufReader, path::PathBuf};
use wdb2::header::{Db2Header, HeaderRevision};
use wdb2::Locale;

#[derive(Args)]
pub struct InfoArgs {
    /// An input WDB2 file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// Print the header as JSON
    #[arg(long, default_value_t = false)]
    json: bool,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", &self.file.display()))?;
        let header = Db2Header::from_reader(&mut BufReader::new(f))?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&header).into_diagnostic()?);
            return Ok(());
        }

        print_header(&header);
        Ok(())
    }
}

fn print_header(header: &Db2Header) {
    let row = |name: &str, value: String| {
        println!(
            "{:>14}  {}",
            name.if_supports_color(Stdout, |t| t.bold()),
            value
        );
    };

    row("revision", format!("{:?}", header.revision()));
    row("build", header.build.to_string());
    row("table hash", format!("{:#010x}", header.table_hash));
    row("records", header.record_count.to_string());
    row("fields", header.field_count.to_string());
    row("record size", header.record_size.to_string());
    row("string size", header.string_size.to_string());

    if header.revision() == HeaderRevision::Extended {
        row(
            "index range",
            format!("{}..={}", header.min_index(), header.max_index()),
        );
        let locales = Locale::ALL
            .iter()
            .filter(|l| header.locale() & (1 << l.slot()) != 0)
            .map(|l| format!("{l:?}"))
            .join(", ");
        row("locales", locales);
    }
}
