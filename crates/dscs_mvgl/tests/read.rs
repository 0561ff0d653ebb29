use std::io::Cursor;
use std::path::PathBuf;

use dscs_mvgl::error::{Error, Result};
use dscs_mvgl::{Dscs, ExtractOptions, Hltlda, MvglArchive};
use pretty_assertions::assert_eq;
use tracing_test::traced_test;

const DOBOZ_DECOMPRESSED: &[u8] = b"xyxyx12345678";

/// A 26-byte doboz block decompressing to [`DOBOZ_DECOMPRESSED`]: a run of
/// two literals, one match mid-control-word, eight tail literals.
fn doboz_payload() -> Vec<u8> {
    #[rustfmt::skip]
    let block = vec![
        0x00, 13, 26,
        0x0C, 0x00, 0x00, 0x00,
        b'x', b'y',
        0x08,
        0x00, 0x01, 0x00, 0x00,
        b'1', b'2', b'3', b'4', b'5', b'6', b'7', b'8',
        0x00, 0x00, 0x00, 0x00,
    ];
    block
}

fn name_record_32(extension: &[u8; 4], name: &[u8], pad: u8) -> Vec<u8> {
    let mut record = vec![pad; 0x40];
    record[..4].copy_from_slice(extension);
    record[4..4 + name.len()].copy_from_slice(name);
    record
}

/// Build a DSCS archive in memory: one structural tree node plus two files,
/// one doboz compressed and one stored.
fn dscs_archive(first_payload: &[u8], first_full_size: u32) -> Vec<u8> {
    let second_payload = b"hello world";
    let data_start: u32 = 0x14 + 3 * 0x08 + 3 * 0x40 + 2 * 0x0C;

    let mut image = Vec::new();
    image.extend_from_slice(b"MDB1");
    image.extend_from_slice(&3u16.to_le_bytes());
    image.extend_from_slice(&3u16.to_le_bytes());
    image.extend_from_slice(&2u32.to_le_bytes());
    image.extend_from_slice(&data_start.to_le_bytes());
    let total = data_start + (first_payload.len() + second_payload.len()) as u32;
    image.extend_from_slice(&total.to_le_bytes());

    // tree: structural root, then the two leaves
    #[rustfmt::skip]
    image.extend_from_slice(&[
        0x00, 0x00, 0xFF, 0xFF, 0x01, 0x00, 0x02, 0x00,
        0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
        0x05, 0x00, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00,
    ]);

    // names parallel the tree; the structural node's record is blank
    image.extend_from_slice(&name_record_32(b"\0\0\0\0", b"", 0));
    image.extend_from_slice(&name_record_32(b"txt\0", b"foo\\bar", 0));
    image.extend_from_slice(&name_record_32(b"txt ", b"readme", b' '));

    // data records
    image.extend_from_slice(&0u32.to_le_bytes());
    image.extend_from_slice(&first_full_size.to_le_bytes());
    image.extend_from_slice(&(first_payload.len() as u32).to_le_bytes());
    image.extend_from_slice(&(first_payload.len() as u32).to_le_bytes());
    image.extend_from_slice(&(second_payload.len() as u32).to_le_bytes());
    image.extend_from_slice(&(second_payload.len() as u32).to_le_bytes());

    image.extend_from_slice(first_payload);
    image.extend_from_slice(second_payload);
    image
}

#[test]
fn entry_paths_come_from_the_name_records() -> Result<()> {
    let archive = MvglArchive::<Dscs, _>::new(Cursor::new(dscs_archive(&doboz_payload(), 13)))?;

    // exactly the tree entries with a payload, structural nodes skipped
    assert_eq!(archive.len(), 2);
    assert_eq!(
        archive.file_names().collect::<Vec<_>>(),
        vec!["foo\\bar.txt", "readme.txt"]
    );
    Ok(())
}

#[test]
fn compressed_entries_decompress_on_read() -> Result<()> {
    let mut archive =
        MvglArchive::<Dscs, _>::new(Cursor::new(dscs_archive(&doboz_payload(), 13)))?;
    assert_eq!(archive.read_by_name("foo\\bar.txt")?, DOBOZ_DECOMPRESSED);
    Ok(())
}

#[test]
fn stored_entries_are_read_verbatim() -> Result<()> {
    let mut archive =
        MvglArchive::<Dscs, _>::new(Cursor::new(dscs_archive(&doboz_payload(), 13)))?;
    assert_eq!(archive.read_by_name("readme.txt")?, b"hello world");
    Ok(())
}

#[test]
fn unknown_names_are_reported() -> Result<()> {
    let mut archive =
        MvglArchive::<Dscs, _>::new(Cursor::new(dscs_archive(&doboz_payload(), 13)))?;
    assert!(matches!(
        archive.read_by_name("no/such.file"),
        Err(Error::FileNotFound(_))
    ));
    Ok(())
}

#[test]
fn wrong_magic_is_an_invalid_archive() {
    let mut image = dscs_archive(&doboz_payload(), 13);
    image[..4].copy_from_slice(b"EXPA");
    let result = MvglArchive::<Dscs, _>::new(Cursor::new(image));
    assert!(matches!(result, Err(Error::InvalidArchive)));
}

#[test]
fn header_counts_must_agree() {
    let mut image = dscs_archive(&doboz_payload(), 13);
    // lower the name count to 2
    image[6] = 2;
    let result = MvglArchive::<Dscs, _>::new(Cursor::new(image));
    assert!(matches!(result, Err(Error::CountMismatch { .. })));
}

#[test]
fn data_ids_must_be_in_range() {
    let mut image = dscs_archive(&doboz_payload(), 13);
    // rewrite the second leaf's dataId from 1 to 9
    let tree_start = 0x14;
    image[tree_start + 2 * 8 + 2] = 9;
    let result = MvglArchive::<Dscs, _>::new(Cursor::new(image));
    assert!(matches!(result, Err(Error::DataIndex { data_id: 9, .. })));
}

#[test]
fn extraction_writes_the_decompressed_tree() -> Result<()> {
    let mut archive =
        MvglArchive::<Dscs, _>::new(Cursor::new(dscs_archive(&doboz_payload(), 13)))?;

    let target: PathBuf =
        std::env::temp_dir().join(format!("dscs_mvgl_extract_{}", std::process::id()));
    let result = archive.extract(&target);

    let compressed = std::fs::read(target.join("foo/bar.txt"));
    let stored = std::fs::read(target.join("readme.txt"));
    let _ = std::fs::remove_dir_all(&target);

    result?;
    // backslashes in stored names become path separators
    assert_eq!(compressed?, DOBOZ_DECOMPRESSED);
    assert_eq!(stored?, b"hello world");
    Ok(())
}

#[traced_test]
#[test]
fn extraction_skips_undecompressable_entries() -> Result<()> {
    // five bytes of garbage against a full size of 20: not stored, not doboz
    let mut archive =
        MvglArchive::<Dscs, _>::new(Cursor::new(dscs_archive(b"\xDE\xAD\xBE\xEF\x00", 20)))?;

    let target: PathBuf =
        std::env::temp_dir().join(format!("dscs_mvgl_skip_{}", std::process::id()));
    let result = archive.extract_with(&target, ExtractOptions::builder().overwrite(true).build());

    let compressed = std::fs::read(target.join("foo/bar.txt"));
    let stored = std::fs::read(target.join("readme.txt"));
    let _ = std::fs::remove_dir_all(&target);

    result?;
    assert!(compressed.is_err());
    assert_eq!(stored?, b"hello world");
    Ok(())
}

#[test]
fn hltlda_archives_use_lz4() -> Result<()> {
    let content = b"mon mon mon mon mon mon mon mon mon mon!".to_vec();
    let payload = lz4_flex::block::compress(&content);

    let data_start: u64 = 0x20 + 0x10 + 0x80 + 0x18;
    let mut image = Vec::new();
    image.extend_from_slice(b"MDB1");
    image.extend_from_slice(&1u32.to_le_bytes());
    image.extend_from_slice(&1u32.to_le_bytes());
    image.extend_from_slice(&1u32.to_le_bytes());
    image.extend_from_slice(&data_start.to_le_bytes());
    image.extend_from_slice(&(data_start + payload.len() as u64).to_le_bytes());

    // a single leaf
    #[rustfmt::skip]
    image.extend_from_slice(&[
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
        0x00, 0x00, 0x00, 0x00,
    ]);

    let mut name = vec![0u8; 0x80];
    name[..4].copy_from_slice(b"bin\0");
    name[4..4 + 9].copy_from_slice(b"data\\blob");
    image.extend_from_slice(&name);

    image.extend_from_slice(&0u64.to_le_bytes());
    image.extend_from_slice(&(content.len() as u64).to_le_bytes());
    image.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    image.extend_from_slice(&payload);

    let mut archive = MvglArchive::<Hltlda, _>::new(Cursor::new(image))?;
    assert_eq!(
        archive.file_names().collect::<Vec<_>>(),
        vec!["data\\blob.bin"]
    );
    assert_eq!(archive.read_by_name("data\\blob.bin")?, content);
    Ok(())
}
