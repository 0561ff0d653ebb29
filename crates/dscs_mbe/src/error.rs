//! Error types that can be emitted from this library

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent wrapper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent wrapper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Schema overlay file contains malformed JSON
    #[error("schema overlay is not valid JSON")]
    SchemaJson(#[from] serde_json::Error),

    /// Schema overlay key is not a valid regular expression
    #[error("schema overlay key is not a valid pattern")]
    SchemaPattern(#[from] regex::Error),

    /// file lacks an EXPA header
    #[error("file lacks an EXPA header")]
    MissingExpaHeader,

    /// file lacks a CHNK header
    #[error("file lacks a CHNK header")]
    MissingChnkHeader,

    /// CHNK payload runs past the end of the file
    #[error("CHNK payload at offset {offset} runs past the end of the file")]
    TruncatedChunk {
        /// slot offset of the offending chunk record
        offset: u32,
    },

    /// row data runs past the end of the file
    #[error("row data of table `{table}` runs past the end of the file")]
    TruncatedRows {
        /// name of the offending table
        table: String,
    },

    /// structure size doesn't match the entry size stored in the file
    #[error("structure size of table `{table}` doesn't match entry size (file says {expected}, structure says {found})")]
    EntrySizeMismatch {
        /// name of the offending table
        table: String,
        /// entry size recorded in the file
        expected: u32,
        /// size computed from the resolved structure
        found: u32,
    },

    /// an int-array cell references a payload the CHNK section never delivered
    #[error("int array slot at offset {offset} has no CHNK payload")]
    MissingPayload {
        /// absolute file offset of the pointer slot
        offset: u32,
    },

    /// an int-array payload is shorter than its declared element count
    #[error("int array slot at offset {offset} declares {count} elements but its payload is shorter")]
    ShortPayload {
        /// absolute file offset of the pointer slot
        offset: u32,
        /// element count stored in the row
        count: u32,
    },

    /// a value's tag doesn't match its column type
    #[error("column `{column}` expects a {expected} value")]
    ValueType {
        /// name of the offending column
        column: String,
        /// type name the column demands
        expected: &'static str,
    },

    /// a row is wider or narrower than its table's structure
    #[error("row has {found} cells but the structure has {expected} columns")]
    RowWidth {
        /// number of columns in the structure
        expected: usize,
        /// number of cells in the row
        found: usize,
    },

    /// a CSV cell failed to parse per its declared column type
    #[error("cannot parse `{value}` as {expected}")]
    ParseValue {
        /// the raw cell content
        value: String,
        /// type name the column demands
        expected: &'static str,
    },

    /// a CSV file name lacks the NNN_ index prefix
    #[error("csv file name `{0}` lacks the NNN_ index prefix")]
    BadCsvFileName(String),

    /// the given path exists but is not a directory
    #[error("path `{0}` exists and is not a directory")]
    NotADirectory(PathBuf),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
