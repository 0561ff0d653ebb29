//! The textual mirror of an EXPA file.
//!
//! Each table becomes one CSV file named `NNN_<table>.csv`, where `NNN` is
//! the zero-padded table index (duplicate table names stay distinguishable
//! that way). Quoting follows RFC 4180: `"` both quotes and escapes, fields
//! may contain commas, quotes and newlines.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::schema::SchemaOverlay;
use crate::types::{EntryType, EntryValue, Structure, StructureEntry, Table, TableFile};

/// Render one cell per its column type.
fn render_field(entry: &StructureEntry, value: &EntryValue) -> Result<String> {
    let rendered = match (entry.ty, value) {
        (EntryType::Int8, EntryValue::Int8(v)) => v.to_string(),
        (EntryType::Int16, EntryValue::Int16(v)) => v.to_string(),
        (EntryType::Int32, EntryValue::Int32(v)) => v.to_string(),
        (EntryType::Float, EntryValue::Float(v)) => v.to_string(),
        (EntryType::Bool, EntryValue::Bool(v)) => v.to_string(),
        (
            EntryType::String | EntryType::String2 | EntryType::String3,
            EntryValue::String(s),
        ) => format!("\"{}\"", s.replace('"', "\"\"")),
        (EntryType::IntArray, EntryValue::IntArray(values)) => values
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(" "),
        (EntryType::Unk0 | EntryType::Unk1 | EntryType::Empty, EntryValue::Absent) => {
            String::new()
        }
        _ => {
            return Err(Error::ValueType {
                column: entry.name.clone(),
                expected: entry.ty.name(),
            })
        }
    };
    Ok(rendered)
}

/// Coerce one cell per its column type.
fn parse_field(ty: EntryType, value: &str) -> Result<EntryValue> {
    let parsed = match ty {
        EntryType::Unk0 | EntryType::Unk1 | EntryType::Empty => EntryValue::Absent,
        EntryType::Int8 => EntryValue::Int8(value.parse().map_err(|_| parse_error(value, ty))?),
        EntryType::Int16 => EntryValue::Int16(value.parse().map_err(|_| parse_error(value, ty))?),
        EntryType::Int32 => EntryValue::Int32(value.parse().map_err(|_| parse_error(value, ty))?),
        EntryType::Float => EntryValue::Float(value.parse().map_err(|_| parse_error(value, ty))?),
        EntryType::Bool => EntryValue::Bool(value == "true"),
        EntryType::String | EntryType::String2 | EntryType::String3 => {
            EntryValue::String(value.to_owned())
        }
        EntryType::IntArray => {
            if value.is_empty() {
                EntryValue::IntArray(Vec::new())
            } else {
                EntryValue::IntArray(
                    value
                        .split(' ')
                        .map(|element| element.parse().map_err(|_| parse_error(value, ty)))
                        .collect::<Result<_>>()?,
                )
            }
        }
    };
    Ok(parsed)
}

fn parse_error(value: &str, ty: EntryType) -> Error {
    Error::ParseValue {
        value: value.to_owned(),
        expected: ty.name(),
    }
}

/// Parse CSV text into records of raw fields, RFC-4180 style.
fn parse_records(input: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;

    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => record.push(std::mem::take(&mut field)),
                '\r' => {}
                '\n' => {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                }
                _ => field.push(c),
            }
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }

    records
}

/// Export every table of `file` as a CSV file under `target`.
///
/// The first row of each file is the comma-joined column names; every row,
/// header included, is newline-terminated.
pub fn export_csv(file: &TableFile, target: impl AsRef<Path>) -> Result<()> {
    let target = target.as_ref();
    if target.exists() && !target.is_dir() {
        return Err(Error::NotADirectory(target.to_path_buf()));
    }
    fs::create_dir_all(target)?;

    for (index, table) in file.tables.iter().enumerate() {
        let path = target.join(format!("{index:03}_{}.csv", table.name));

        let mut content = String::new();
        let names: Vec<&str> = table
            .structure
            .entries()
            .iter()
            .map(|e| e.name.as_str())
            .collect();
        let _ = writeln!(content, "{}", names.join(","));

        for row in &table.rows {
            if row.len() != table.structure.len() {
                return Err(Error::RowWidth {
                    expected: table.structure.len(),
                    found: row.len(),
                });
            }
            let fields = table
                .structure
                .entries()
                .iter()
                .zip(row)
                .map(|(entry, value)| render_field(entry, value))
                .collect::<Result<Vec<_>>>()?;
            let _ = writeln!(content, "{}", fields.join(","));
        }

        fs::write(path, content)?;
    }

    Ok(())
}

/// Build a structure from a CSV header row.
///
/// Each header cell names the column; the column type is taken from the
/// substring after the last space (which may well resolve to `empty` for
/// hand-written names — the overlay exists to fix that up).
fn header_structure(header: &[String]) -> Structure {
    Structure::new(
        header
            .iter()
            .map(|cell| {
                let type_name = match cell.rfind(' ') {
                    Some(at) => &cell[at + 1..],
                    None => cell.as_str(),
                };
                StructureEntry::new(cell.clone(), EntryType::from_name(type_name))
            })
            .collect(),
    )
}

/// Import a directory of CSV files as a [`TableFile`], resolving schemas
/// against the legacy `structures/` directory in the working directory.
pub fn import_csv(source: impl AsRef<Path>) -> Result<TableFile> {
    import_csv_with(source, &SchemaOverlay::default())
}

/// Import a directory of CSV files with an explicit schema overlay root.
///
/// Files are processed in lexicographic order; the table name is the file
/// stem with the `NNN_` prefix removed. An overlay definition replaces the
/// header-derived structure when its column count matches.
pub fn import_csv_with(source: impl AsRef<Path>, overlay: &SchemaOverlay) -> Result<TableFile> {
    let source = source.as_ref();
    if !source.is_dir() {
        return Err(Error::NotADirectory(source.to_path_buf()));
    }

    let mut files: Vec<_> = fs::read_dir(source)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    files.sort();

    let mut tables = Vec::with_capacity(files.len());
    for path in files {
        let stem = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let name = stem
            .get(4..)
            .ok_or_else(|| Error::BadCsvFileName(stem.clone()))?
            .to_owned();

        let records = parse_records(&fs::read_to_string(&path)?);
        let Some((header, rows)) = records.split_first() else {
            tables.push(Table::new(name, Structure::default(), Vec::new()));
            continue;
        };

        let mut structure = header_structure(header);
        let from_file = overlay.resolve(source, &name)?;
        // file definition has priority over the header, which may resolve
        // columns to empty
        if !from_file.is_empty() && from_file.len() == structure.len() {
            structure = Structure::new(from_file);
        }

        let mut entries = Vec::with_capacity(rows.len());
        for row in rows {
            if row.len() != structure.len() {
                return Err(Error::RowWidth {
                    expected: structure.len(),
                    found: row.len(),
                });
            }
            entries.push(
                structure
                    .entries()
                    .iter()
                    .zip(row)
                    .map(|(entry, field)| parse_field(entry.ty, field))
                    .collect::<Result<Vec<_>>>()?,
            );
        }

        tables.push(Table::new(name, structure, entries));
    }

    Ok(TableFile::new(tables))
}
