//! Types for reading MDB1 archives.

use bon::Builder;
use indexmap::IndexMap;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::path::Path;
use tracing::{info, instrument, warn};

use crate::compression::Codec;
use crate::error::{Error, Result};
use crate::types::{ArchiveHeader, ArchiveVariant, DataEntry};

/// Options for how an archive is extracted.
#[derive(Debug, Clone, Copy, Builder)]
pub struct ExtractOptions {
    /// Replace files that already exist in the target directory
    #[builder(default)]
    pub overwrite: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        ExtractOptions::builder().build()
    }
}

#[derive(Debug)]
struct Shared {
    header: ArchiveHeader,
    entries: IndexMap<Box<str>, DataEntry>,
}

/// MDB1 archive reader
///
/// ```no_run
/// use std::fs::File;
/// use dscs_mvgl::{Dscs, MvglArchive};
///
/// fn list_archive_contents(path: &str) -> dscs_mvgl::error::Result<()> {
///     let mut archive = MvglArchive::<Dscs, File>::new(File::open(path)?)?;
///
///     for name in archive.file_names() {
///         println!("{name}");
///     }
///
///     Ok(())
/// }
/// ```
pub struct MvglArchive<V, R> {
    reader: R,
    shared: Shared,
    _variant: PhantomData<V>,
}

impl<V: ArchiveVariant, R: Read + Seek> MvglArchive<V, R> {
    /// Read an MDB1 archive, collecting the files it contains.
    pub fn new(mut reader: R) -> Result<MvglArchive<V, R>> {
        match Self::get_metadata(&mut reader) {
            Ok(shared) => Ok(MvglArchive {
                reader,
                shared,
                _variant: PhantomData,
            }),
            // a file that cannot even be walked is not an archive; the
            // structural violations keep their specific reports
            Err(Error::IOError(_) | Error::BinRWError(_)) => Err(Error::InvalidArchive),
            Err(err) => Err(err),
        }
    }

    fn get_metadata(reader: &mut R) -> Result<Shared> {
        let header = V::read_header(reader)?;
        if header.file_entry_count != header.file_name_count {
            return Err(Error::CountMismatch {
                file_entries: header.file_entry_count,
                file_names: header.file_name_count,
            });
        }

        let tree: Vec<_> = (0..header.file_entry_count)
            .map(|_| V::read_tree_entry(reader))
            .collect::<Result<_>>()?;
        let names: Vec<_> = (0..header.file_name_count)
            .map(|_| V::read_name_entry(reader))
            .collect::<Result<_>>()?;
        let data: Vec<_> = (0..header.data_entry_count)
            .map(|_| V::read_data_entry(reader))
            .collect::<Result<_>>()?;

        // tree and name entries are parallel arrays; only leaves carry a
        // payload
        let mut entries = IndexMap::new();
        for (node, name) in tree.iter().zip(names) {
            let Some(data_id) = node.data_id else {
                continue;
            };
            let entry = data
                .get(data_id as usize)
                .ok_or(Error::DataIndex {
                    data_id,
                    available: data.len() as u64,
                })?;
            entries.insert(name.into_boxed_str(), *entry);
        }

        Ok(Shared { header, entries })
    }

    /// The widened archive header.
    pub fn header(&self) -> &ArchiveHeader {
        &self.shared.header
    }

    /// Number of payload-bearing entries contained in this archive.
    pub fn len(&self) -> usize {
        self.shared.entries.len()
    }

    /// Whether this archive contains no payload-bearing entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns an iterator over all entry paths in this archive.
    ///
    /// # Warnings
    ///
    /// It is dangerous to use these paths directly when extracting an
    /// archive. A stored name may be absolute (`/etc/shadow`) or break out
    /// of the current directory (`../runtime`); carelessly writing to such
    /// paths lets a crafted archive overwrite critical files.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.shared.entries.keys().map(|s| s.as_ref())
    }

    /// Read and decompress one entry by its stored path.
    pub fn read_by_name(&mut self, name: &str) -> Result<Vec<u8>> {
        let entry = *self
            .shared
            .entries
            .get(name)
            .ok_or_else(|| Error::FileNotFound(name.to_owned()))?;
        self.read_entry(&entry)
    }

    fn read_entry(&mut self, entry: &DataEntry) -> Result<Vec<u8>> {
        let mut compressed = vec![0u8; entry.compressed_size as usize];
        self.reader
            .seek(SeekFrom::Start(self.shared.header.data_start + entry.offset))?;
        self.reader.read_exact(&mut compressed)?;

        V::Codec::decompress(&compressed, entry.full_size as usize)
    }

    /// Extract every entry below `target` with default options.
    pub fn extract(&mut self, target: impl AsRef<Path>) -> Result<()> {
        self.extract_with(target, ExtractOptions::default())
    }

    /// Extract every entry below `target`.
    ///
    /// Entries that fail to decompress or to land on disk are logged and
    /// skipped; the batch continues. Backslashes in stored names are
    /// converted to `/` before joining.
    #[instrument(skip(self, target), fields(target = %target.as_ref().display()), err)]
    pub fn extract_with(
        &mut self,
        target: impl AsRef<Path>,
        options: ExtractOptions,
    ) -> Result<()> {
        let target = target.as_ref();
        std::fs::create_dir_all(target)?;

        let entries: Vec<(String, DataEntry)> = self
            .shared
            .entries
            .iter()
            .map(|(name, entry)| (name.to_string(), *entry))
            .collect();

        for (name, entry) in entries {
            if let Err(err) = self.extract_entry(target, &name, &entry, options) {
                warn!("skipping {name}: {err}");
            }
        }

        Ok(())
    }

    fn extract_entry(
        &mut self,
        target: &Path,
        name: &str,
        entry: &DataEntry,
        options: ExtractOptions,
    ) -> Result<()> {
        let decompressed = self.read_entry(entry)?;

        let path = target.join(name.replace('\\', "/"));
        info!("writing {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = if options.overwrite {
            File::create(&path)?
        } else {
            File::create_new(&path)?
        };
        out.write_all(&decompressed)?;

        Ok(())
    }

    /// Unwrap and return the inner reader object.
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.reader
    }
}
