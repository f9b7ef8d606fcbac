pub mod dump;
pub mod info;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print the header of a WDB2 file
    Info(info::InfoArgs),
    /// Materialize a WDB2 file and print its rows
    Dump(dump::DumpArgs),
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Info(info) => info.handle(),
            Commands::Dump(dump) => dump.handle(),
        }
    }
}
