//! Writing EXPA table files.

use binrw::BinWrite;
use byteorder::{LittleEndian, WriteBytesExt};
use std::fs::File;
use std::io::{Cursor, Seek, Write};
use std::path::Path;
use tracing::instrument;

use crate::error::Result;
use crate::io::{ceil_to, pad_writer};
use crate::types::{ChnkEntry, ChnkHeader, ExpaHeader, TableFile};
use crate::variant::ExpaVariant;

/// Write an EXPA file to disk, replacing any existing file.
///
/// The image is assembled in memory first, so a failed row never leaves a
/// half-written file behind.
pub fn write_expa<V: ExpaVariant>(file: &TableFile, path: impl AsRef<Path>) -> Result<()> {
    let image = encode::<V>(file)?;
    File::create(path)?.write_all(&image)?;
    Ok(())
}

/// Encode a [`TableFile`] into an EXPA byte image.
///
/// CHNK records accumulate as a side effect of row encoding and are emitted
/// in production order: row-major, column-major within each table. Alignment
/// gaps and unused row bytes are `0xCC` filled.
#[instrument(skip(file), fields(tables = file.tables.len()), err)]
pub fn encode<V: ExpaVariant>(file: &TableFile) -> Result<Vec<u8>> {
    let mut out = Cursor::new(Vec::new());
    ExpaHeader {
        table_count: file.tables.len() as u32,
    }
    .write(&mut out)?;

    let mut chunks: Vec<ChnkEntry> = Vec::new();
    for table in &file.tables {
        pad_writer(&mut out, V::ALIGN_STEP)?;

        let name_size = ceil_to(table.name.len() as u32 + 1, 4);
        out.write_u32::<LittleEndian>(name_size)?;
        out.write_all(table.name.as_bytes())?;
        out.write_all(&vec![0u8; name_size as usize - table.name.len()])?;

        if V::HAS_SCHEMA_SECTION {
            out.write_u32::<LittleEndian>(table.structure.len() as u32)?;
            for entry in table.structure.entries() {
                entry.ty.write_le(&mut out)?;
            }
        }

        out.write_u32::<LittleEndian>(table.structure.row_size())?;
        out.write_u32::<LittleEndian>(table.rows.len() as u32)?;

        pad_writer(&mut out, 8)?;

        for row in &table.rows {
            let base = out.stream_position()? as u32;
            let (data, row_chunks) = table.structure.write_row(base, row)?;
            out.write_all(&data)?;
            chunks.extend(row_chunks);
        }
    }

    pad_writer(&mut out, V::ALIGN_STEP)?;
    ChnkHeader {
        entry_count: chunks.len() as u32,
    }
    .write(&mut out)?;
    for chunk in &chunks {
        out.write_u32::<LittleEndian>(chunk.offset)?;
        out.write_u32::<LittleEndian>(chunk.value.len() as u32)?;
        out.write_all(&chunk.value)?;
    }

    Ok(out.into_inner())
}
