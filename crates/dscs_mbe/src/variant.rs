//! The two EXPA container variants.
//!
//! EXPA32 and EXPA64 share the row layout engine; they differ in section
//! alignment and in whether each table header embeds its column-type
//! sequence. The variants are dispatched at compile time through a
//! capability trait.

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::io::{Read, Seek};
use std::path::Path;

use crate::error::Result;
use crate::schema::SchemaOverlay;
use crate::types::{EntryType, Structure, StructureEntry};

/// Capability set distinguishing the EXPA container variants.
pub trait ExpaVariant {
    /// Alignment step between file sections.
    const ALIGN_STEP: u64;

    /// Whether table headers embed a column-type sequence.
    const HAS_SCHEMA_SECTION: bool;

    /// Resolve the structure of the table named `table_name`.
    ///
    /// Called with the reader positioned right after the table name, i.e. on
    /// the embedded schema section when the variant has one. `file_path` is
    /// the path of the table file, used to select a schema overlay.
    fn read_schema<R: Read + Seek>(
        reader: &mut R,
        file_path: &Path,
        table_name: &str,
        overlay: &SchemaOverlay,
    ) -> Result<Structure>;
}

/// The 32-bit variant: 4-byte section alignment, no embedded schema. The
/// overlay is the only schema source.
pub struct Expa32;

impl ExpaVariant for Expa32 {
    const ALIGN_STEP: u64 = 4;
    const HAS_SCHEMA_SECTION: bool = false;

    fn read_schema<R: Read + Seek>(
        _reader: &mut R,
        file_path: &Path,
        table_name: &str,
        overlay: &SchemaOverlay,
    ) -> Result<Structure> {
        Ok(Structure::new(overlay.resolve(file_path, table_name)?))
    }
}

/// The 64-bit variant: 8-byte section alignment plus an embedded column-type
/// sequence per table.
pub struct Expa64;

impl ExpaVariant for Expa64 {
    const ALIGN_STEP: u64 = 8;
    const HAS_SCHEMA_SECTION: bool = true;

    /// The embedded types are authoritative; the overlay only contributes
    /// column names, and only when its column count and types agree with the
    /// embedded sequence.
    fn read_schema<R: Read + Seek>(
        reader: &mut R,
        file_path: &Path,
        table_name: &str,
        overlay: &SchemaOverlay,
    ) -> Result<Structure> {
        let column_count = reader.read_u32::<LittleEndian>()?;
        let mut embedded = Vec::with_capacity(column_count as usize);
        for index in 0..column_count {
            let ty = EntryType::read_le(reader)?;
            embedded.push(StructureEntry::new(format!("{} {}", ty.name(), index), ty));
        }

        let from_file = overlay.resolve(file_path, table_name)?;
        if from_file.len() != embedded.len()
            || embedded.iter().zip(&from_file).any(|(a, b)| a.ty != b.ty)
        {
            return Ok(Structure::new(embedded));
        }

        Ok(Structure::new(from_file))
    }
}
