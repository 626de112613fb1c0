use flate2::read::DeflateDecoder;
use std::io::Read;

use crate::error::{Error, Result};

use super::parser::ZipParser;
use super::structures::{ArchiveEntry, CompressionMethod, DirectoryIndex};

/// Parse the central directory of an in-memory archive.
pub fn read_directory(data: &[u8]) -> Result<DirectoryIndex> {
    ZipParser::new(data).read_directory()
}

/// Extract one entry's data to memory.
///
/// Stored entries are returned as-is, deflate entries are inflated as raw
/// deflate. Either way the result is exactly `uncompressed_size` bytes.
pub fn extract_entry(data: &[u8], entry: &ArchiveEntry) -> Result<Vec<u8>> {
    let parser = ZipParser::new(data);

    match entry.method {
        CompressionMethod::Stored => {
            let payload = parser.payload(entry)?;
            if payload.len() as u64 != entry.uncompressed_size {
                return Err(Error::unavailable(
                    entry.display_name(),
                    "stored size does not match the directory",
                ));
            }
            Ok(payload.to_vec())
        }
        CompressionMethod::Deflate => inflate(parser.payload(entry)?, entry),
        CompressionMethod::Unknown(method) => Err(Error::DecompressionUnsupported {
            name: entry.display_name().into_owned(),
            method,
        }),
    }
}

fn inflate(payload: &[u8], entry: &ArchiveEntry) -> Result<Vec<u8>> {
    let expected = entry.uncompressed_size;
    let mut out = Vec::with_capacity(expected.min(payload.len() as u64 * 4) as usize);

    // One byte over the declared size is enough to detect a mismatch
    DeflateDecoder::new(payload)
        .take(expected + 1)
        .read_to_end(&mut out)
        .map_err(|_| Error::unavailable(entry.display_name(), "deflate stream is corrupt"))?;

    if out.len() as u64 != expected {
        return Err(Error::unavailable(
            entry.display_name(),
            "inflated size does not match the directory",
        ));
    }

    Ok(out)
}
