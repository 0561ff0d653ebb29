use clap::Args;
use miette::{Context, IntoDiagnostic, Result};
use std::fs::File;
use std::path::PathBuf;

use dscs_mvgl::{ArchiveVariant, Dscs, ExtractOptions, Hltlda, MvglArchive};

use super::ArchiveKind;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input MVGL archive
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// The archive generation
    #[arg(long, value_enum, default_value_t)]
    variant: ArchiveKind,

    /// Allow overwriting files in the target
    #[arg(long, default_value_t = false)]
    overwrite: bool,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        match self.variant {
            ArchiveKind::Dscs => self.extract::<Dscs>(),
            ArchiveKind::Hltlda => self.extract::<Hltlda>(),
        }
    }

    fn extract<V: ArchiveVariant>(&self) -> Result<()> {
        let f = File::open(&self.file)
            .into_diagnostic()
            .context(format!("path: {}", self.file.display()))?;
        let mut archive = MvglArchive::<V, _>::new(f)?;

        archive
            .extract_with(
                &self.directory,
                ExtractOptions::builder().overwrite(self.overwrite).build(),
            )
            .context(format!("extracting to {}", self.directory.display()))?;

        Ok(())
    }
}
