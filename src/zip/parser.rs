//! Low-level ZIP archive parser.
//!
//! This module handles the binary parsing of ZIP file structures out of an
//! in-memory archive.
//!
//! ## Parsing Strategy
//!
//! ZIP files are designed to be read from the end:
//! 1. Find the End of Central Directory (EOCD) at the buffer's end
//! 2. Walk the Central Directory to get metadata for every entry
//! 3. For extraction, read the entry's Local File Header to find its data
//!
//! Every offset and length taken from the archive is checked against the
//! buffer before it is used. A damaged directory yields a partial index
//! rather than an error.

use byteorder::{ByteOrder, LittleEndian};
use std::ops::Range;

use crate::error::{Error, Result};

use super::structures::*;

/// Maximum ZIP comment size allowed by the format (65535 bytes).
///
/// This limits the search area when looking for EOCD with a comment.
const MAX_COMMENT_SIZE: usize = 65535;

/// Outcome of reading one central directory record.
enum Record {
    Entry { entry: ArchiveEntry, next: usize },
    Skipped { next: usize },
    End,
}

/// Low-level ZIP parser over a borrowed archive buffer.
///
/// Typically used through [`read_directory`](super::read_directory) and
/// [`extract_entry`](super::extract_entry) rather than directly.
///
/// ## Example
///
/// ```ignore
/// let parser = ZipParser::new(&bytes);
/// let index = parser.read_directory()?;
/// for entry in &index {
///     let payload = parser.payload(entry)?;
///     // Decompress payload...
/// }
/// ```
pub struct ZipParser<'a> {
    /// The complete archive
    data: &'a [u8],
}

impl<'a> ZipParser<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Find and parse the End of Central Directory record.
    ///
    /// Tries the common no-comment layout first, then searches backwards
    /// through the last `65535 + 22` bytes for the signature. The match
    /// closest to the end wins.
    ///
    /// # Returns
    ///
    /// A tuple of (EOCD record, offset of EOCD in the buffer).
    ///
    /// # Errors
    ///
    /// [`Error::ArchiveMalformed`] when the buffer is shorter than a trailer
    /// or no signature is found inside the search window.
    pub fn find_eocd(&self) -> Result<(EndOfCentralDirectory, usize)> {
        let size = self.data.len();
        if size < EndOfCentralDirectory::SIZE {
            return Err(Error::ArchiveMalformed("archive too short"));
        }

        // Common case: no archive comment, trailer sits at the very end
        let last = size - EndOfCentralDirectory::SIZE;
        let tail = &self.data[last..];
        if &tail[0..4] == EndOfCentralDirectory::SIGNATURE && tail[20..22] == [0, 0] {
            return Ok((EndOfCentralDirectory::from_bytes(tail)?, last));
        }

        let search_start = size.saturating_sub(MAX_COMMENT_SIZE + EndOfCentralDirectory::SIZE);
        for i in (search_start..=last).rev() {
            if &self.data[i..i + 4] == EndOfCentralDirectory::SIGNATURE {
                let eocd = EndOfCentralDirectory::from_bytes(&self.data[i..])?;
                return Ok((eocd, i));
            }
        }

        Err(Error::ArchiveMalformed("end of central directory not found"))
    }

    /// Parse the Central Directory into a [`DirectoryIndex`].
    ///
    /// The walk stops quietly at the first record without a valid signature,
    /// at the end of the declared directory size, or at the end of the
    /// buffer, whichever comes first.
    pub fn read_directory(&self) -> Result<DirectoryIndex> {
        let (eocd, eocd_offset) = self.find_eocd()?;

        let cd_offset = eocd.cd_offset as usize;
        let cd_end = cd_offset
            .saturating_add(eocd.cd_size as usize)
            .min(self.data.len());

        tracing::debug!(
            eocd_offset,
            cd_offset,
            cd_size = eocd.cd_size,
            declared_entries = eocd.total_entries,
            "located central directory"
        );

        let mut index = DirectoryIndex::new();
        let mut offset = cd_offset;

        while offset < cd_end {
            match self.parse_cdfh(offset) {
                Record::Entry { entry, next } => {
                    let name = entry.display_name().into_owned();
                    if !index.insert(entry) {
                        tracing::debug!(%name, "duplicate entry name, keeping the first record");
                    }
                    offset = next;
                }
                Record::Skipped { next } => offset = next,
                Record::End => break,
            }
        }

        Ok(index)
    }

    /// Parse the Central Directory File Header starting at `offset`.
    fn parse_cdfh(&self, offset: usize) -> Record {
        let Some(header) = self.slice(offset, CDFH_MIN_SIZE) else {
            return Record::End;
        };
        if &header[0..4] != CDFH_SIGNATURE {
            return Record::End;
        }

        let compression_method = LittleEndian::read_u16(&header[10..12]);
        let compressed_size = LittleEndian::read_u32(&header[20..24]) as u64;
        let uncompressed_size = LittleEndian::read_u32(&header[24..28]) as u64;
        let file_name_length = LittleEndian::read_u16(&header[28..30]) as usize;
        let extra_field_length = LittleEndian::read_u16(&header[30..32]) as usize;
        let file_comment_length = LittleEndian::read_u16(&header[32..34]) as usize;
        let lfh_offset = LittleEndian::read_u32(&header[42..46]) as u64;

        let next = offset + CDFH_MIN_SIZE + file_name_length + extra_field_length + file_comment_length;

        let Some(name) = self.slice(offset + CDFH_MIN_SIZE, file_name_length) else {
            tracing::warn!(offset, "central directory record name runs past the archive");
            return Record::Skipped { next };
        };

        let size = self.data.len() as u64;
        if lfh_offset >= size || compressed_size > size {
            tracing::warn!(
                name = %String::from_utf8_lossy(name),
                lfh_offset,
                compressed_size,
                "central directory record points outside the archive"
            );
            return Record::Skipped { next };
        }

        Record::Entry {
            entry: ArchiveEntry {
                name: name.to_vec(),
                method: CompressionMethod::from_u16(compression_method),
                compressed_size,
                uncompressed_size,
                lfh_offset,
            },
            next,
        }
    }

    /// Locate the compressed bytes of an entry.
    ///
    /// The Local File Header has variable-length fields (file name, extra
    /// field) that may differ from the Central Directory record, so the
    /// data offset is computed from the local header itself.
    ///
    /// # Errors
    ///
    /// [`Error::EntryUnavailable`] when the local header is out of bounds,
    /// carries the wrong signature, or the payload runs past the buffer.
    pub fn payload(&self, entry: &ArchiveEntry) -> Result<&'a [u8]> {
        let range = self.payload_range(entry)?;
        Ok(&self.data[range])
    }

    fn payload_range(&self, entry: &ArchiveEntry) -> Result<Range<usize>> {
        let fail = |reason| Error::unavailable(entry.display_name(), reason);

        let lfh_offset =
            usize::try_from(entry.lfh_offset).map_err(|_| fail("local header offset out of range"))?;
        let lfh = self
            .slice(lfh_offset, LFH_SIZE)
            .ok_or_else(|| fail("local header out of bounds"))?;

        if &lfh[0..4] != LFH_SIGNATURE {
            return Err(fail("local header signature mismatch"));
        }

        let file_name_length = LittleEndian::read_u16(&lfh[26..28]) as usize;
        let extra_field_length = LittleEndian::read_u16(&lfh[28..30]) as usize;

        // Data starts after: LFH (30 bytes) + filename + extra field
        let start = lfh_offset + LFH_SIZE + file_name_length + extra_field_length;
        let length =
            usize::try_from(entry.compressed_size).map_err(|_| fail("compressed size out of range"))?;

        match start.checked_add(length) {
            Some(end) if end <= self.data.len() => Ok(start..end),
            _ => Err(fail("payload runs past the archive")),
        }
    }

    /// Bounds-checked view of `len` bytes at `offset`.
    fn slice(&self, offset: usize, len: usize) -> Option<&'a [u8]> {
        let end = offset.checked_add(len)?;
        self.data.get(offset..end)
    }
}
