pub mod mbe;
pub mod mvgl;

#[derive(clap::Subcommand)]
pub enum Commands {
    /// Handle MBE table files
    Mbe {
        #[command(subcommand)]
        command: mbe::MbeCommands,
    },
    /// Handle MVGL archives
    Mvgl {
        #[command(subcommand)]
        command: mvgl::MvglCommands,
    },
}

impl Commands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            Commands::Mbe { command } => command.handle(),
            Commands::Mvgl { command } => command.handle(),
        }
    }
}
