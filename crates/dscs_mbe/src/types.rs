//! Base types for the structure of EXPA table files.

use binrw::{BinRead, BinWrite};
use byteorder::{ByteOrder, LittleEndian};
use derive_more::derive::Constructor;
use indexmap::IndexMap;
use std::ops::Range;

use crate::error::{Error, Result};
use crate::io::{ceil_to, FILL};

/// Map from an 8-byte pointer-slot offset to the byte range of its CHNK
/// payload inside the file buffer.
///
/// The game engine overwrites each slot with a raw in-process pointer when
/// it loads the file; the row decoder consults this map instead, which keeps
/// the semantics without the pointer reinterpretation.
pub type ChunkMap = IndexMap<u32, Range<usize>>;

/// EXPA file header
///
/// All data in the file is stored in little endian format.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"EXPA", little)]
pub struct ExpaHeader {
    /// The number of tables stored in the file
    pub table_count: u32,
}

/// CHNK section header, following the table sections
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq)]
#[brw(magic = b"CHNK", little)]
pub struct ChnkHeader {
    /// The number of chunk records in the section
    pub entry_count: u32,
}

/// Column type tag, with the integer codes used on disk by the EXPA64
/// structure section.
#[derive(BinRead, BinWrite, Debug, Copy, Clone, PartialEq, Eq)]
#[brw(repr = u32)]
pub enum EntryType {
    /// Placeholder type observed only in EXPA64 schemas, carries no data
    Unk0 = 0,
    /// Placeholder type, carries no data
    Unk1 = 1,
    /// Signed 32-bit integer
    Int32 = 2,
    /// Signed 16-bit integer
    Int16 = 3,
    /// Signed 8-bit integer
    Int8 = 4,
    /// IEEE-754 binary32
    Float = 5,
    /// 64-bit pointer slot, payload out of line in the CHNK section
    String3 = 6,
    /// 64-bit pointer slot, payload out of line in the CHNK section
    String = 7,
    /// 64-bit pointer slot, payload out of line in the CHNK section
    String2 = 8,
    /// One bit inside a packed 32-bit word shared by consecutive bools
    Bool = 9,
    /// Carries no data, decodes to an absent value
    Empty = 10,
    /// `{u32 count, u32 pad, u64 pointer}`, elements out of line
    IntArray = 100,
}

impl EntryType {
    /// On-disk size in bytes; bools are packed and accounted separately.
    pub const fn size(self) -> u32 {
        match self {
            EntryType::Unk0 | EntryType::Unk1 | EntryType::Empty => 0,
            EntryType::Int8 => 1,
            EntryType::Int16 => 2,
            EntryType::Int32 | EntryType::Float | EntryType::Bool => 4,
            EntryType::String3 | EntryType::String | EntryType::String2 => 8,
            EntryType::IntArray => 16,
        }
    }

    /// Alignment of the column inside a row.
    pub const fn alignment(self) -> u32 {
        match self {
            EntryType::Unk0 | EntryType::Unk1 | EntryType::Empty => 0,
            EntryType::Int8 => 1,
            EntryType::Int16 => 2,
            EntryType::Int32 | EntryType::Float | EntryType::Bool => 4,
            EntryType::String3 | EntryType::String | EntryType::String2 | EntryType::IntArray => 8,
        }
    }

    /// Canonical type name, as used by schema files and generated column
    /// names.
    pub const fn name(self) -> &'static str {
        match self {
            EntryType::Unk0 => "unk0",
            EntryType::Unk1 => "unk1",
            EntryType::Int32 => "int32",
            EntryType::Int16 => "int16",
            EntryType::Int8 => "int8",
            EntryType::Float => "float",
            EntryType::String3 => "string3",
            EntryType::String => "string",
            EntryType::String2 => "string2",
            EntryType::Bool => "bool",
            EntryType::Empty => "empty",
            EntryType::IntArray => "int array",
        }
    }

    /// Parse a type name as found in schema files.
    ///
    /// Accepts the legacy synonyms `byte`, `short`, `int` and `int array`;
    /// anything unknown resolves to [`EntryType::Empty`].
    pub fn from_name(name: &str) -> EntryType {
        match name {
            "byte" | "int8" => EntryType::Int8,
            "short" | "int16" => EntryType::Int16,
            "int" | "int32" => EntryType::Int32,
            "float" => EntryType::Float,
            "bool" => EntryType::Bool,
            "string" => EntryType::String,
            "string2" => EntryType::String2,
            "string3" => EntryType::String3,
            "int array" => EntryType::IntArray,
            _ => EntryType::Empty,
        }
    }
}

/// A single decoded cell.
///
/// The variant must match the column's [`EntryType`] when a row is encoded;
/// a disagreeing tag is reported as an error rather than coerced.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryValue {
    /// Cell of an `empty`/`unk` column
    Absent,
    /// Cell of a `bool` column
    Bool(bool),
    /// Cell of an `int8` column
    Int8(i8),
    /// Cell of an `int16` column
    Int16(i16),
    /// Cell of an `int32` column
    Int32(i32),
    /// Cell of a `float` column
    Float(f32),
    /// Cell of a `string`/`string2`/`string3` column
    String(String),
    /// Cell of an `int array` column
    IntArray(Vec<i32>),
}

/// A named, typed column.
#[derive(Constructor, Debug, Clone, PartialEq, Eq)]
pub struct StructureEntry {
    /// Column name; does not influence the row layout
    pub name: String,
    /// Column type; determines size, alignment and packing
    pub ty: EntryType,
}

/// An out-of-line payload plus the offset of the 8-byte slot that is patched
/// to point at it when the file is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChnkEntry {
    /// Absolute file offset of the pointer slot to patch
    pub offset: u32,
    /// Payload bytes as stored in the CHNK section
    pub value: Vec<u8>,
}

impl ChnkEntry {
    /// String payload: NUL-terminated, padded with NULs to a 4-byte
    /// multiple, reserving at least one byte of slack past the terminator.
    pub fn from_str(offset: u32, data: &str) -> ChnkEntry {
        let mut value = vec![0u8; ceil_to(data.len() as u32 + 2, 4) as usize];
        value[..data.len()].copy_from_slice(data.as_bytes());
        ChnkEntry { offset, value }
    }

    /// Int-array payload: the raw little-endian element sequence.
    pub fn from_ints(offset: u32, data: &[i32]) -> ChnkEntry {
        let mut value = vec![0u8; data.len() * 4];
        LittleEndian::write_i32_into(data, &mut value);
        ChnkEntry { offset, value }
    }
}

/// Resolved position of one column inside the packed row image.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Slot {
    Skip,
    Bool { offset: u32, bit: u32 },
    Int8 { offset: u32 },
    Int16 { offset: u32 },
    Int32 { offset: u32 },
    Float { offset: u32 },
    Str { offset: u32 },
    IntArray { offset: u32 },
}

/// An ordered column schema; immutable after construction.
///
/// The structure owns the row layout: the same walk drives
/// [`Structure::row_size`], [`Structure::read_row`] and
/// [`Structure::write_row`], so the three stay bit-exact with each other.
#[derive(Constructor, Debug, Clone, PartialEq, Eq, Default)]
pub struct Structure {
    entries: Vec<StructureEntry>,
}

impl Structure {
    /// The columns, in layout order.
    pub fn entries(&self) -> &[StructureEntry] {
        &self.entries
    }

    /// Number of columns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the structure has no columns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Two structures are layout-equivalent iff their type sequences match
    /// element-wise; names play no part.
    pub fn layout_matches(&self, other: &Structure) -> bool {
        self.entries.len() == other.entries.len()
            && self
                .entries
                .iter()
                .zip(&other.entries)
                .all(|(a, b)| a.ty == b.ty)
    }

    /// Walk the columns once, assigning each its slot.
    ///
    /// A run of consecutive bools shares one 32-bit word placed at the next
    /// 4-aligned offset when the run starts; the word is accounted when the
    /// run ends (a non-bool column, the 33rd bool, or the end of the row).
    /// Returns the slots and the raw end offset of the walk.
    fn layout(&self) -> (Vec<Slot>, u32) {
        let mut slots = Vec::with_capacity(self.entries.len());
        let mut offset = 0u32;
        let mut bit = 0u32;

        for entry in &self.entries {
            if entry.ty != EntryType::Bool || bit == 0 || bit == 32 {
                if bit > 0 {
                    offset += 4;
                    bit = 0;
                }
                offset = ceil_to(offset, entry.ty.alignment());
            }

            match entry.ty {
                EntryType::Unk0 | EntryType::Unk1 | EntryType::Empty => slots.push(Slot::Skip),
                EntryType::Bool => {
                    slots.push(Slot::Bool { offset, bit });
                    bit += 1;
                }
                EntryType::Int8 => {
                    slots.push(Slot::Int8 { offset });
                    offset += 1;
                }
                EntryType::Int16 => {
                    slots.push(Slot::Int16 { offset });
                    offset += 2;
                }
                EntryType::Int32 => {
                    slots.push(Slot::Int32 { offset });
                    offset += 4;
                }
                EntryType::Float => {
                    slots.push(Slot::Float { offset });
                    offset += 4;
                }
                EntryType::String3 | EntryType::String | EntryType::String2 => {
                    slots.push(Slot::Str { offset });
                    offset += 8;
                }
                EntryType::IntArray => {
                    slots.push(Slot::IntArray { offset });
                    offset += 16;
                }
            }
        }

        if bit > 0 {
            offset += 4;
        }

        (slots, offset)
    }

    /// Per-row byte size as recorded in the file's `entrySize` field: the
    /// walked layout size rounded up to a multiple of 8. Empty structures
    /// size to zero.
    pub fn row_size(&self) -> u32 {
        if self.entries.is_empty() {
            return 0;
        }
        ceil_to(self.layout().1, 8)
    }

    /// Encode one row into a packed byte image.
    ///
    /// `base_offset` is the absolute file position the image will land at;
    /// it anchors the slot offsets of the emitted [`ChnkEntry`]s. Unused
    /// bytes are `0xCC` filled. Out-of-line payloads are only emitted for
    /// non-empty strings and non-empty arrays.
    pub fn write_row(
        &self,
        base_offset: u32,
        row: &[EntryValue],
    ) -> Result<(Vec<u8>, Vec<ChnkEntry>)> {
        if row.len() != self.entries.len() {
            return Err(Error::RowWidth {
                expected: self.entries.len(),
                found: row.len(),
            });
        }

        let (slots, _) = self.layout();
        let mut data = vec![FILL; ceil_to(self.row_size(), 8) as usize];
        let mut chunks = Vec::new();

        for ((entry, slot), value) in self.entries.iter().zip(slots).zip(row) {
            match slot {
                Slot::Skip => {
                    if !matches!(value, EntryValue::Absent) {
                        return Err(type_mismatch(entry));
                    }
                }
                Slot::Bool { offset, bit } => {
                    let EntryValue::Bool(set) = value else {
                        return Err(type_mismatch(entry));
                    };
                    let o = offset as usize;
                    if bit == 0 {
                        data[o..o + 4].fill(0);
                    }
                    if *set {
                        data[o + (bit / 8) as usize] |= 1 << (bit % 8);
                    }
                }
                Slot::Int8 { offset } => {
                    let EntryValue::Int8(v) = value else {
                        return Err(type_mismatch(entry));
                    };
                    data[offset as usize] = *v as u8;
                }
                Slot::Int16 { offset } => {
                    let EntryValue::Int16(v) = value else {
                        return Err(type_mismatch(entry));
                    };
                    let o = offset as usize;
                    LittleEndian::write_i16(&mut data[o..o + 2], *v);
                }
                Slot::Int32 { offset } => {
                    let EntryValue::Int32(v) = value else {
                        return Err(type_mismatch(entry));
                    };
                    let o = offset as usize;
                    LittleEndian::write_i32(&mut data[o..o + 4], *v);
                }
                Slot::Float { offset } => {
                    let EntryValue::Float(v) = value else {
                        return Err(type_mismatch(entry));
                    };
                    let o = offset as usize;
                    LittleEndian::write_f32(&mut data[o..o + 4], *v);
                }
                Slot::Str { offset } => {
                    let EntryValue::String(s) = value else {
                        return Err(type_mismatch(entry));
                    };
                    let o = offset as usize;
                    data[o..o + 8].fill(0);
                    if !s.is_empty() {
                        chunks.push(ChnkEntry::from_str(base_offset + offset, s));
                    }
                }
                Slot::IntArray { offset } => {
                    let EntryValue::IntArray(values) = value else {
                        return Err(type_mismatch(entry));
                    };
                    let o = offset as usize;
                    LittleEndian::write_u32(&mut data[o..o + 4], values.len() as u32);
                    data[o + 4..o + 16].fill(0);
                    if !values.is_empty() {
                        chunks.push(ChnkEntry::from_ints(base_offset + offset + 8, values));
                    }
                }
            }
        }

        Ok((data, chunks))
    }

    /// Decode one row starting at `base` inside the file buffer.
    ///
    /// Pointer slots are resolved through `chunks`; a slot absent from the
    /// map decodes to the empty string. The caller guarantees that
    /// `base..base + stride` lies inside `file`.
    pub fn read_row(&self, file: &[u8], base: usize, chunks: &ChunkMap) -> Result<Vec<EntryValue>> {
        if self.entries.is_empty() {
            return Ok(Vec::new());
        }

        let (slots, _) = self.layout();
        let mut values = Vec::with_capacity(self.entries.len());

        for slot in slots {
            values.push(match slot {
                Slot::Skip => EntryValue::Absent,
                Slot::Bool { offset, bit } => {
                    let o = base + offset as usize;
                    let word = LittleEndian::read_u32(&file[o..o + 4]);
                    EntryValue::Bool((word >> bit) & 1 == 1)
                }
                Slot::Int8 { offset } => EntryValue::Int8(file[base + offset as usize] as i8),
                Slot::Int16 { offset } => {
                    let o = base + offset as usize;
                    EntryValue::Int16(LittleEndian::read_i16(&file[o..o + 2]))
                }
                Slot::Int32 { offset } => {
                    let o = base + offset as usize;
                    EntryValue::Int32(LittleEndian::read_i32(&file[o..o + 4]))
                }
                Slot::Float { offset } => {
                    let o = base + offset as usize;
                    EntryValue::Float(LittleEndian::read_f32(&file[o..o + 4]))
                }
                Slot::Str { offset } => {
                    let slot_offset = base as u32 + offset;
                    match chunks.get(&slot_offset) {
                        Some(range) => {
                            let payload = &file[range.clone()];
                            let end = payload.iter().position(|&b| b == 0).unwrap_or(payload.len());
                            EntryValue::String(String::from_utf8_lossy(&payload[..end]).into_owned())
                        }
                        None => EntryValue::String(String::new()),
                    }
                }
                Slot::IntArray { offset } => {
                    let o = base + offset as usize;
                    let count = LittleEndian::read_u32(&file[o..o + 4]);
                    if count == 0 {
                        EntryValue::IntArray(Vec::new())
                    } else {
                        let slot_offset = base as u32 + offset + 8;
                        let range = chunks
                            .get(&slot_offset)
                            .ok_or(Error::MissingPayload { offset: slot_offset })?;
                        if (count as usize) * 4 > range.len() {
                            return Err(Error::ShortPayload {
                                offset: slot_offset,
                                count,
                            });
                        }
                        let mut elements = vec![0i32; count as usize];
                        let payload = &file[range.start..range.start + count as usize * 4];
                        LittleEndian::read_i32_into(payload, &mut elements);
                        EntryValue::IntArray(elements)
                    }
                }
            });
        }

        Ok(values)
    }
}

fn type_mismatch(entry: &StructureEntry) -> Error {
    Error::ValueType {
        column: entry.name.clone(),
        expected: entry.ty.name(),
    }
}

/// A named table: a schema plus its decoded rows.
#[derive(Constructor, Debug, Clone, PartialEq)]
pub struct Table {
    /// Table name as stored in the file
    pub name: String,
    /// Column schema governing the row layout
    pub structure: Structure,
    /// Decoded rows, one cell per column
    pub rows: Vec<Vec<EntryValue>>,
}

/// An ordered sequence of tables; order is significant and survives a
/// write/read round trip. Duplicate table names are permitted.
#[derive(Constructor, Debug, Clone, PartialEq, Default)]
pub struct TableFile {
    /// The tables, in file order
    pub tables: Vec<Table>,
}
