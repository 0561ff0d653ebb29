use clap::Args;
use miette::{Context, Result};
use std::path::PathBuf;

use dscs_mbe::{export_csv, read_expa_with, Expa32, Expa64, SchemaOverlay};

use super::ExpaFormat;

#[derive(Args)]
pub struct ExtractArgs {
    /// An input MBE file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// A target directory for the CSV files
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// The EXPA container variant of the file
    #[arg(long, value_enum, default_value_t)]
    format: ExpaFormat,

    /// Root directory of the schema overlay files
    #[arg(long, value_name = "DIR", default_value = "structures")]
    structures: PathBuf,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        let overlay = SchemaOverlay::new(&self.structures);
        let tables = match self.format {
            ExpaFormat::Expa32 => read_expa_with::<Expa32>(&self.file, &overlay),
            ExpaFormat::Expa64 => read_expa_with::<Expa64>(&self.file, &overlay),
        }
        .context(format!("reading {}", self.file.display()))?;

        export_csv(&tables, &self.directory)
            .context(format!("exporting to {}", self.directory.display()))?;

        Ok(())
    }
}
