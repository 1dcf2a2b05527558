pub mod rez;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle REZ files
    Rez {
        #[command(subcommand)]
        command: rez::RezCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Rez { command } => command.handle(),
        }
    }
}
