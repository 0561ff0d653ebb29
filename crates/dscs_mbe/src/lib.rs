//! This library handles reading and writing **EXPA** table files (`.mbe`) used by the *Digimon Story* games.
//!
//! # EXPA Format Documentation
//!
//! An EXPA file is a container for named, schema-bearing tables of
//! fixed-layout rows. Variable-length payloads (strings and int arrays) live
//! out of line in an auxiliary **CHNK** section at the end of the file; each
//! CHNK record names the 8-byte row slot that the game engine patches with a
//! pointer to the payload once the file is loaded. Two container variants
//! exist: **EXPA32** (4-byte section alignment, no embedded schema) and
//! **EXPA64** (8-byte section alignment, a column-type sequence per table).
//!
//! ## File Structure
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x41505845 ("EXPA")                               |
//! | 0x0004         | Table Count            | 4 bytes: Number of table sections                          |
//! | —              | Table sections         | One per table, aligned to the variant's step               |
//! | —              | Magic number           | 4 bytes: 0x4B4E4843 ("CHNK")                               |
//! | —              | Chunk Count            | 4 bytes: Number of chunk records                           |
//! | —              | Chunk records          | `{u32 slotOffset, u32 size, bytes[size]}` each             |
//!
//! ### Table Section
//!
//! - **Name Length**: A 4-byte unsigned integer, the padded length of the
//!   table name (a multiple of 4).
//! - **Name**: NUL-terminated name bytes, padded with NULs to the length
//!   above.
//! - **Column Types** *(EXPA64 only)*: a 4-byte column count followed by one
//!   4-byte type code per column.
//! - **Entry Size**: A 4-byte unsigned integer that must equal the row size
//!   computed from the table's structure.
//! - **Entry Count**: A 4-byte unsigned integer, the number of rows.
//! - **Rows**: aligned to 8 bytes; `entryCount` rows of
//!   `ceil(entrySize, 8)` bytes each.
//!
//! ### Row Layout
//!
//! Columns are packed in declaration order with per-type alignment. Runs of
//! consecutive `bool` columns share 32-bit words (one bit per column) placed
//! at the next 4-aligned offset. String and int-array columns occupy 8-byte
//! pointer slots (int arrays an extra leading element count) whose payloads
//! are delivered through the CHNK section. Unused bytes are `0xCC` filled.
//!
//! ## Schema Sources
//!
//! Row layouts come from up to three places, reconciled per table:
//!
//! 1. The EXPA64 embedded column-type sequence (types, generated names).
//! 2. A JSON overlay under `structures/` (types *and* meaningful names),
//!    selected by regular expressions; see [`schema::SchemaOverlay`].
//! 3. On CSV import, the CSV header row.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.mbe`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod csv;
pub mod error;
pub mod io;
pub mod read;
pub mod schema;
pub mod types;
pub mod variant;
pub mod write;

pub use csv::{export_csv, import_csv, import_csv_with};
pub use read::{decode, read_expa, read_expa_with};
pub use schema::SchemaOverlay;
pub use types::{EntryType, EntryValue, Structure, StructureEntry, Table, TableFile};
pub use variant::{Expa32, Expa64, ExpaVariant};
pub use write::{encode, write_expa};
