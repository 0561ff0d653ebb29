//! Schema overlay resolution.
//!
//! EXPA32 files carry no schema at all and EXPA64 files only carry column
//! types, so both lean on JSON files shipped next to the tool:
//!
//! - `<root>/structure.json` maps a *regex over the table file path* to the
//!   name of a format file.
//! - `<root>/<formatFile>` maps a *table name* (exact, or a regex matched
//!   against the whole name) to an ordered `column name -> type name`
//!   object.
//!
//! Key order inside the JSON objects is load-bearing: the first matching
//! regex wins and columns are laid out in declaration order.

use regex::Regex;
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::types::{EntryType, StructureEntry};

const STRUCTURE_INDEX: &str = "structure.json";

/// Locator for the JSON schema files describing table layouts.
#[derive(Debug, Clone)]
pub struct SchemaOverlay {
    root: PathBuf,
}

impl Default for SchemaOverlay {
    /// The legacy behavior: a `structures/` directory resolved against the
    /// process working directory.
    fn default() -> Self {
        SchemaOverlay::new("structures")
    }
}

impl SchemaOverlay {
    /// An overlay rooted at an explicit directory.
    pub fn new(root: impl Into<PathBuf>) -> SchemaOverlay {
        SchemaOverlay { root: root.into() }
    }

    /// Resolve the column list for `table_name` inside the file at
    /// `file_path`.
    ///
    /// Returns an empty list when the overlay directory, the index file, or
    /// a matching definition doesn't exist; malformed JSON and invalid
    /// patterns are reported as errors.
    pub fn resolve(&self, file_path: &Path, table_name: &str) -> Result<Vec<StructureEntry>> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let index_path = self.root.join(STRUCTURE_INDEX);
        if !index_path.exists() {
            return Ok(Vec::new());
        }

        let index: Map<String, Value> = serde_json::from_str(&fs::read_to_string(&index_path)?)?;

        let haystack = file_path.to_string_lossy();
        let mut format_file = None;
        for (pattern, value) in &index {
            if Regex::new(pattern)?.is_match(&haystack) {
                format_file = value.as_str();
                break;
            }
        }
        let Some(format_file) = format_file else {
            return Ok(Vec::new());
        };

        let format: Map<String, Value> =
            serde_json::from_str(&fs::read_to_string(self.root.join(format_file))?)?;

        let mut definition = format.get(table_name);
        if definition.is_none() {
            // Scan all table definitions for a matching regex, wrapped so a
            // bare name only matches the whole table name.
            for (pattern, value) in &format {
                if Regex::new(&format!("^(?:{pattern})$"))?.is_match(table_name) {
                    definition = Some(value);
                    break;
                }
            }
        }
        let Some(Value::Object(columns)) = definition else {
            return Ok(Vec::new());
        };

        Ok(columns
            .iter()
            .map(|(name, ty)| {
                StructureEntry::new(name.clone(), EntryType::from_name(ty.as_str().unwrap_or("")))
            })
            .collect())
    }
}
