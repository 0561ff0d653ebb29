//! Reading EXPA table files.

use binrw::BinRead;
use byteorder::{LittleEndian, ReadBytesExt};
use std::fs;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::io::{align_reader, ceil_to, name_from_bytes};
use crate::schema::SchemaOverlay;
use crate::types::{ChnkHeader, ChunkMap, ExpaHeader, Structure, Table, TableFile};
use crate::variant::ExpaVariant;

/// Read an EXPA file from disk, resolving schemas against the legacy
/// `structures/` directory in the working directory.
///
/// ```no_run
/// use dscs_mbe::{read_expa, Expa64};
///
/// fn list_tables() -> dscs_mbe::error::Result<()> {
///     let file = read_expa::<Expa64>("data/digimon_common_para.mbe")?;
///
///     for table in &file.tables {
///         println!("{}: {} rows", table.name, table.rows.len());
///     }
///
///     Ok(())
/// }
/// ```
pub fn read_expa<V: ExpaVariant>(path: impl AsRef<Path>) -> Result<TableFile> {
    read_expa_with::<V>(path, &SchemaOverlay::default())
}

/// Read an EXPA file from disk with an explicit schema overlay root.
pub fn read_expa_with<V: ExpaVariant>(
    path: impl AsRef<Path>,
    overlay: &SchemaOverlay,
) -> Result<TableFile> {
    let path = path.as_ref();
    let content = fs::read(path)?;
    decode::<V>(&content, path, overlay)
}

/// Metadata of one table section, collected before any row is decoded.
#[derive(Debug)]
struct TableSlot {
    name: String,
    structure: Structure,
    entry_size: u32,
    entry_count: u32,
    data_offset: u64,
}

/// Decode an EXPA file from an in-memory buffer.
///
/// The whole file must be resident: the CHNK section at the tail patches
/// pointer slots back inside the row areas, so rows can only be decoded once
/// every section has been walked. `file_path` is the name the schema
/// overlay's path patterns are matched against.
#[instrument(skip(source, overlay), err)]
pub fn decode<V: ExpaVariant>(
    source: &[u8],
    file_path: &Path,
    overlay: &SchemaOverlay,
) -> Result<TableFile> {
    let mut reader = Cursor::new(source);
    let header = ExpaHeader::read(&mut reader).map_err(|_| Error::MissingExpaHeader)?;

    let mut slots = Vec::with_capacity(header.table_count as usize);
    for _ in 0..header.table_count {
        align_reader(&mut reader, V::ALIGN_STEP)?;

        let name_length = reader.read_u32::<LittleEndian>()?;
        let mut raw_name = vec![0u8; name_length as usize];
        reader.read_exact(&mut raw_name)?;
        let name = name_from_bytes(&raw_name);

        let structure = V::read_schema(&mut reader, file_path, &name, overlay)?;
        let entry_size = reader.read_u32::<LittleEndian>()?;
        let entry_count = reader.read_u32::<LittleEndian>()?;

        align_reader(&mut reader, 8)?;
        let data_offset = reader.stream_position()?;

        let rows_end = data_offset + ceil_to(entry_size, 8) as u64 * entry_count as u64;
        if rows_end > source.len() as u64 {
            return Err(Error::TruncatedRows { table: name });
        }
        reader.seek(SeekFrom::Start(rows_end))?;

        let found = structure.row_size();
        if found != entry_size {
            return Err(Error::EntrySizeMismatch {
                table: name,
                expected: entry_size,
                found,
            });
        }

        debug!(table = %name, entry_count, entry_size, "table section");
        slots.push(TableSlot {
            name,
            structure,
            entry_size,
            entry_count,
            data_offset,
        });
    }

    align_reader(&mut reader, V::ALIGN_STEP)?;
    let chunk_header = ChnkHeader::read(&mut reader).map_err(|_| Error::MissingChnkHeader)?;

    // slot offsets are unique across the file, so the order the chunks are
    // recorded in is immaterial
    let mut chunks = ChunkMap::with_capacity(chunk_header.entry_count as usize);
    for _ in 0..chunk_header.entry_count {
        let slot_offset = reader.read_u32::<LittleEndian>()?;
        let size = reader.read_u32::<LittleEndian>()?;
        let start = reader.stream_position()? as usize;
        let end = start + size as usize;
        if end > source.len() {
            return Err(Error::TruncatedChunk {
                offset: slot_offset,
            });
        }
        chunks.insert(slot_offset, start..end);
        reader.seek(SeekFrom::Start(end as u64))?;
    }

    let mut tables = Vec::with_capacity(slots.len());
    for slot in slots {
        let stride = ceil_to(slot.entry_size, 8) as usize;
        let mut rows = Vec::with_capacity(slot.entry_count as usize);
        for index in 0..slot.entry_count as usize {
            let base = slot.data_offset as usize + index * stride;
            rows.push(slot.structure.read_row(source, base, &chunks)?);
        }
        tables.push(Table::new(slot.name, slot.structure, rows));
    }

    Ok(TableFile::new(tables))
}
