use byteorder::{LittleEndian, ReadBytesExt};
use std::borrow::Cow;
use std::collections::HashMap;
use std::io::Cursor;

use crate::error::{Error, Result};

/// ZIP compression methods
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompressionMethod {
    Stored,
    Deflate,
    Unknown(u16),
}

impl CompressionMethod {
    pub fn from_u16(value: u16) -> Self {
        match value {
            0 => CompressionMethod::Stored,
            8 => CompressionMethod::Deflate,
            _ => CompressionMethod::Unknown(value),
        }
    }

    pub fn as_u16(&self) -> u16 {
        match self {
            CompressionMethod::Stored => 0,
            CompressionMethod::Deflate => 8,
            CompressionMethod::Unknown(v) => *v,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CompressionMethod::Stored => "Stored",
            CompressionMethod::Deflate => "Defl:N",
            CompressionMethod::Unknown(_) => "Unk",
        }
    }
}

/// End of Central Directory (EOCD) - 22 bytes minimum
pub struct EndOfCentralDirectory {
    pub disk_number: u16,
    pub disk_with_cd: u16,
    pub disk_entries: u16,
    pub total_entries: u16,
    pub cd_size: u32,
    pub cd_offset: u32,
    pub comment_len: u16,
}

impl EndOfCentralDirectory {
    pub const SIGNATURE: &'static [u8] = b"PK\x05\x06";
    pub const SIZE: usize = 22;

    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        if data.len() < Self::SIZE || &data[0..4] != Self::SIGNATURE {
            return Err(Error::ArchiveMalformed("invalid end of central directory"));
        }

        let truncated = |_: std::io::Error| Error::ArchiveMalformed("truncated end of central directory");
        let mut cursor = Cursor::new(&data[4..Self::SIZE]);

        Ok(Self {
            disk_number: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            disk_with_cd: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            disk_entries: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            total_entries: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
            cd_size: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            cd_offset: cursor.read_u32::<LittleEndian>().map_err(truncated)?,
            comment_len: cursor.read_u16::<LittleEndian>().map_err(truncated)?,
        })
    }
}

/// Central Directory File Header (CDFH) - 46 bytes minimum
pub const CDFH_SIGNATURE: &[u8] = b"PK\x01\x02";
pub const CDFH_MIN_SIZE: usize = 46;

/// Local File Header (LFH) - 30 bytes
pub const LFH_SIGNATURE: &[u8] = b"PK\x03\x04";
pub const LFH_SIZE: usize = 30;

/// One central directory record.
///
/// The name is kept as raw bytes: archives produced by shell tooling do not
/// always carry clean UTF-8 names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: Vec<u8>,
    pub method: CompressionMethod,
    pub compressed_size: u64,
    pub uncompressed_size: u64,
    pub lfh_offset: u64,
}

impl ArchiveEntry {
    /// Lossy rendering of the raw name for messages and listings
    pub fn display_name(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.name)
    }

    pub fn is_directory(&self) -> bool {
        self.name.ends_with(b"/")
    }
}

/// Entries of one archive keyed by raw name, in central directory order.
///
/// When a name occurs more than once the first record wins; later duplicates
/// are dropped at insertion time.
#[derive(Debug, Default, Clone)]
pub struct DirectoryIndex {
    entries: Vec<ArchiveEntry>,
    positions: HashMap<Vec<u8>, usize>,
}

impl DirectoryIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry unless its name is already present.
    ///
    /// Returns `false` when the entry was a duplicate and was dropped.
    pub fn insert(&mut self, entry: ArchiveEntry) -> bool {
        if self.positions.contains_key(&entry.name) {
            return false;
        }
        self.positions.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    pub fn get(&self, name: impl AsRef<[u8]>) -> Option<&ArchiveEntry> {
        self.positions
            .get(name.as_ref())
            .map(|&index| &self.entries[index])
    }

    pub fn contains(&self, name: impl AsRef<[u8]>) -> bool {
        self.positions.contains_key(name.as_ref())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ArchiveEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a DirectoryIndex {
    type Item = &'a ArchiveEntry;
    type IntoIter = std::slice::Iter<'a, ArchiveEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, offset: u64) -> ArchiveEntry {
        ArchiveEntry {
            name: name.as_bytes().to_vec(),
            method: CompressionMethod::Stored,
            compressed_size: 0,
            uncompressed_size: 0,
            lfh_offset: offset,
        }
    }

    #[test]
    fn test_method_roundtrip() {
        assert_eq!(CompressionMethod::from_u16(0), CompressionMethod::Stored);
        assert_eq!(CompressionMethod::from_u16(8), CompressionMethod::Deflate);
        assert_eq!(CompressionMethod::from_u16(12), CompressionMethod::Unknown(12));
        assert_eq!(CompressionMethod::Unknown(14).as_u16(), 14);
    }

    #[test]
    fn test_eocd_from_bytes() {
        let mut data = Vec::new();
        data.extend_from_slice(EndOfCentralDirectory::SIGNATURE);
        data.extend_from_slice(&[0, 0, 0, 0, 2, 0, 2, 0]);
        data.extend_from_slice(&92u32.to_le_bytes());
        data.extend_from_slice(&100u32.to_le_bytes());
        data.extend_from_slice(&0u16.to_le_bytes());

        let eocd = EndOfCentralDirectory::from_bytes(&data).unwrap();
        assert_eq!(eocd.total_entries, 2);
        assert_eq!(eocd.cd_size, 92);
        assert_eq!(eocd.cd_offset, 100);
        assert_eq!(eocd.comment_len, 0);
    }

    #[test]
    fn test_eocd_rejects_bad_signature() {
        let data = [0u8; EndOfCentralDirectory::SIZE];
        assert!(matches!(
            EndOfCentralDirectory::from_bytes(&data),
            Err(Error::ArchiveMalformed(_))
        ));
    }

    #[test]
    fn test_index_first_seen_wins() {
        let mut index = DirectoryIndex::new();
        assert!(index.insert(entry("a.log", 0)));
        assert!(index.insert(entry("b.log", 10)));
        assert!(!index.insert(entry("a.log", 20)));

        assert_eq!(index.len(), 2);
        assert_eq!(index.get("a.log").unwrap().lfh_offset, 0);
        let names: Vec<_> = index.iter().map(|e| e.display_name().into_owned()).collect();
        assert_eq!(names, ["a.log", "b.log"]);
    }

    #[test]
    fn test_directory_flag() {
        assert!(entry("logs/", 0).is_directory());
        assert!(!entry("logs/a.log", 0).is_directory());
    }
}
