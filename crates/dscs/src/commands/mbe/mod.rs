pub mod extract;
pub mod pack;

/// Which EXPA container variant a file uses.
#[derive(clap::ValueEnum, Debug, Copy, Clone, Default)]
pub enum ExpaFormat {
    /// EXPA32: no embedded schema, used by DSCS-era files
    #[default]
    Expa32,
    /// EXPA64: embedded column types, used by later games
    Expa64,
}

#[derive(clap::Subcommand)]
pub enum MbeCommands {
    /// Extract an MBE file into a directory of CSV files
    Extract(extract::ExtractArgs),
    /// Pack a directory of CSV files into an MBE file
    Pack(pack::PackArgs),
}

impl MbeCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            MbeCommands::Extract(extract) => extract.handle(),
            MbeCommands::Pack(pack) => pack.handle(),
        }
    }
}
