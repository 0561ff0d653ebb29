//! This library handles reading **MDB1** bundle archives (`.mvgl`, decrypted `.bin`) used by the *Digimon Story* games.
//!
//! # MDB1 Format Documentation
//!
//! An MDB1 archive is a read-only bundle: entries are located through a
//! small radix-like tree, named by fixed-width name records, and stored as
//! individually compressed payloads in a data blob at the tail of the file.
//! Two generations exist, identical in layout but different in widths and
//! codec:
//!
//! | Variant | Header | Tree entry | Name entry | Data entry | Codec |
//! |---------|--------|------------|------------|------------|-------|
//! | DSCS    | 0x14   | 0x08       | 0x40       | 0x0C       | Doboz |
//! | HLTLDA  | 0x20   | 0x10       | 0x80       | 0x18       | LZ4   |
//!
//! ## File Structure
//!
//! | Section       | Description                                                    |
//! |---------------|----------------------------------------------------------------|
//! | Header        | Magic "MDB1", entry/name/data counts, data offset, total size  |
//! | File tree     | `{compareBit, dataId, left, right}` per entry                  |
//! | File names    | `{extension, name}` fixed-width fields, NUL or space padded    |
//! | Data records  | `{offset, fullSize, compressedSize}` per payload               |
//! | Data blob     | Compressed payloads, offsets relative to the header's start    |
//!
//! Tree and name records are parallel arrays: the name at index `i` belongs
//! to the tree entry at index `i`. A tree entry whose `dataId` is the
//! all-ones value is structural and has no payload. Entry paths are
//! assembled as `name.extension`; payloads whose compressed size equals
//! their full size are stored verbatim.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.mvgl` (also seen as decrypted `.bin`)
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod compression;
pub mod doboz;
pub mod error;
pub mod read;
pub mod types;

pub use compression::Codec;
pub use read::{ExtractOptions, MvglArchive};
pub use types::{ArchiveVariant, Dscs, Hltlda};
