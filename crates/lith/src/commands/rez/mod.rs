pub mod extract;
pub mod list;

#[derive(clap::Subcommand)]
pub enum RezCommands {
    /// Extract REZ files into a directory
    Extract(extract::ExtractArgs),
    /// Show the header and contents of a REZ file
    List(list::ListArgs),
}

impl RezCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            RezCommands::Extract(extract) => extract.handle(),
            RezCommands::List(list) => list.handle(),
        }
    }
}
