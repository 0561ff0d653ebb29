use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;

use dscs_mvgl::{ArchiveVariant, Dscs, Hltlda, MvglArchive};

use super::ArchiveKind;

#[derive(Args)]
pub struct ListArgs {
    /// An input MVGL archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The archive generation
    #[arg(long, value_enum, default_value_t)]
    variant: ArchiveKind,
}

impl ListArgs {
    pub fn handle(&self) -> Result<()> {
        match self.variant {
            ArchiveKind::Dscs => self.list::<Dscs>(),
            ArchiveKind::Hltlda => self.list::<Hltlda>(),
        }
    }

    fn list<V: ArchiveVariant>(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", self.file.display()))?;
        let archive = MvglArchive::<V, _>::new(f)?;

        for name in archive.file_names() {
            println!("{name}");
        }

        Ok(())
    }
}
