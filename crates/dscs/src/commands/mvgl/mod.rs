pub mod extract;
pub mod list;

/// Which MDB1 archive generation a file belongs to.
#[derive(clap::ValueEnum, Debug, Copy, Clone, Default)]
pub enum ArchiveKind {
    /// Doboz-compressed archives with 32-bit records
    #[default]
    Dscs,
    /// LZ4-compressed archives with 64-bit records
    Hltlda,
}

#[derive(clap::Subcommand)]
pub enum MvglCommands {
    /// Extract an MVGL archive into a directory
    Extract(extract::ExtractArgs),
    /// List the entries of an MVGL archive
    List(list::ListArgs),
}

impl MvglCommands {
    pub fn handle(&self) -> miette::Result<()> {
        match self {
            MvglCommands::Extract(extract) => extract.handle(),
            MvglCommands::List(list) => list.handle(),
        }
    }
}
