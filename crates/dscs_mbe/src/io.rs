//! Cursor arithmetic shared by the readers and writers.

use std::io::{Seek, SeekFrom, Write};

use crate::error::Result;

/// Fill byte for alignment padding and unused row bytes.
pub const FILL: u8 = 0xCC;

/// Smallest multiple of `step` that is not less than `value`.
///
/// A `step` of zero leaves the value untouched, matching the zero
/// "alignment" of the zero-size column types.
pub const fn ceil_to(value: u32, step: u32) -> u32 {
    if step == 0 {
        value
    } else {
        value.div_ceil(step) * step
    }
}

/// Advance a read cursor to the next multiple of `step`.
pub fn align_reader<R: Seek>(reader: &mut R, step: u64) -> Result<u64> {
    let pos = reader.stream_position()?;
    let rem = pos % step;
    if rem != 0 {
        reader.seek(SeekFrom::Current((step - rem) as i64))?;
    }
    Ok(reader.stream_position()?)
}

/// Pad a write cursor to the next multiple of `step` with [`FILL`] bytes.
pub fn pad_writer<W: Write + Seek>(writer: &mut W, step: u64) -> Result<u64> {
    let pos = writer.stream_position()?;
    let rem = pos % step;
    if rem != 0 {
        let padding = vec![FILL; (step - rem) as usize];
        writer.write_all(&padding)?;
    }
    Ok(writer.stream_position()?)
}

/// Decode a fixed-width name field: bytes up to the first NUL, lossily.
pub fn name_from_bytes(raw: &[u8]) -> String {
    let end = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..end]).into_owned()
}
