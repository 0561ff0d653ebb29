//! Per-entry decompression back-ends.
//!
//! Archive entries whose compressed size equals their full size are stored
//! verbatim; everything else goes through the variant's codec.

use crate::doboz;
use crate::error::{Error, Result};

/// A byte-to-byte decompression back-end.
pub trait Codec {
    /// Decompress `input` into exactly `expected_size` bytes, or return the
    /// input verbatim when it already has that size (stored entry).
    fn decompress(input: &[u8], expected_size: usize) -> Result<Vec<u8>>;
}

/// The Doboz codec used by DSCS-era archives.
pub struct Doboz;

impl Codec for Doboz {
    fn decompress(input: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        if input.len() == expected_size {
            return Ok(input.to_vec());
        }

        let info = doboz::compression_info(input)?;
        if info.compressed_size != input.len() as u64
            || info.version != doboz::VERSION
            || info.uncompressed_size != expected_size as u64
        {
            return Err(Error::Decompress("input is not doboz compressed".into()));
        }

        doboz::decompress(input, expected_size)
    }
}

/// The LZ4 block codec used by HLTLDA-era archives.
pub struct Lz4;

impl Codec for Lz4 {
    fn decompress(input: &[u8], expected_size: usize) -> Result<Vec<u8>> {
        if input.len() == expected_size {
            return Ok(input.to_vec());
        }

        let output = lz4_flex::block::decompress(input, expected_size)
            .map_err(|e| Error::Decompress(e.to_string()))?;
        if output.len() != expected_size {
            return Err(Error::Decompress(format!(
                "lz4 block decompressed to {} bytes, expected {expected_size}",
                output.len()
            )));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn equal_sizes_mean_stored() -> Result<()> {
        let data = b"not compressed at all".to_vec();
        assert_eq!(Doboz::decompress(&data, data.len())?, data);
        assert_eq!(Lz4::decompress(&data, data.len())?, data);
        Ok(())
    }

    #[test]
    fn doboz_header_must_agree_with_the_entry() {
        // valid stored doboz block, but the data entry claims a different
        // full size (4) than the embedded header (5)
        let input = [0x80, 0x05, 0x08, b'h', b'e', b'l', b'l', b'o'];
        assert!(matches!(
            Doboz::decompress(&input, 4),
            Err(Error::Decompress(_))
        ));
    }

    #[test]
    fn doboz_stored_block_round_trips() -> Result<()> {
        let input = [0x80, 0x05, 0x08, b'h', b'e', b'l', b'l', b'o'];
        assert_eq!(Doboz::decompress(&input, 5)?, b"hello");
        Ok(())
    }

    #[test]
    fn lz4_block_round_trips() -> Result<()> {
        let data = b"aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa digimon".to_vec();
        let compressed = lz4_flex::block::compress(&data);
        assert_eq!(Lz4::decompress(&compressed, data.len())?, data);
        Ok(())
    }

    #[test]
    fn lz4_garbage_is_rejected() {
        let garbage = [0xF0, 0x12, 0x34];
        assert!(Lz4::decompress(&garbage, 64).is_err());
    }
}
