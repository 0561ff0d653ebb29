//! Error types that can be emitted from this library

use miette::Diagnostic;
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

    /// file is an invalid MDB1 archive
    #[error("file is an invalid MDB1 archive")]
    InvalidArchive,

    /// the header's file-entry and file-name counts disagree
    #[error("archive header is inconsistent: {file_entries} tree entries but {file_names} name entries")]
    CountMismatch {
        /// number of tree entries announced by the header
        file_entries: u64,
        /// number of name entries announced by the header
        file_names: u64,
    },

    /// a tree entry points at a data record that doesn't exist
    #[error("tree entry references data record {data_id} of {available}")]
    DataIndex {
        /// the out-of-range data record index
        data_id: u64,
        /// number of data records in the archive
        available: u64,
    },

    /// unable to find requested file
    #[error("no archive entry named `{0}`")]
    FileNotFound(String),

    /// a payload failed to decompress
    #[error("decompression failed: {0}")]
    Decompress(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
