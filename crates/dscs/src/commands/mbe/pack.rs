use clap::Args;
use miette::{Context, Result};
use std::path::PathBuf;

use dscs_mbe::{import_csv_with, write_expa, Expa32, Expa64, SchemaOverlay};

use super::ExpaFormat;

#[derive(Args)]
pub struct PackArgs {
    /// An input directory of CSV files
    #[arg(short, long, value_name = "DIR")]
    directory: PathBuf,

    /// A target MBE file
    #[arg(short, long, value_name = "FILE")]
    file: PathBuf,

    /// The EXPA container variant to write
    #[arg(long, value_enum, default_value_t)]
    format: ExpaFormat,

    /// Root directory of the schema overlay files
    #[arg(long, value_name = "DIR", default_value = "structures")]
    structures: PathBuf,
}

impl PackArgs {
    pub fn handle(&self) -> Result<()> {
        let overlay = SchemaOverlay::new(&self.structures);
        let tables = import_csv_with(&self.directory, &overlay)
            .context(format!("importing {}", self.directory.display()))?;

        match self.format {
            ExpaFormat::Expa32 => write_expa::<Expa32>(&tables, &self.file),
            ExpaFormat::Expa64 => write_expa::<Expa64>(&tables, &self.file),
        }
        .context(format!("writing {}", self.file.display()))?;

        Ok(())
    }
}
