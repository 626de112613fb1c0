//! In-memory ZIP writer for tests.
#![allow(dead_code)]

use byteorder::{LittleEndian, WriteBytesExt};
use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

pub const STORED: u16 = 0;
pub const DEFLATE: u16 = 8;

/// Raw deflate, no zlib or gzip framing
pub fn deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[derive(Default)]
pub struct ZipBuilder {
    data: Vec<u8>,
    central: Vec<u8>,
    count: u16,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(self, name: impl AsRef<[u8]>, content: &[u8]) -> Self {
        let size = content.len() as u32;
        self.entry(name, STORED, content, size, size)
    }

    pub fn deflated(self, name: impl AsRef<[u8]>, content: &[u8]) -> Self {
        let payload = deflate(content);
        let compressed = payload.len() as u32;
        self.entry(name, DEFLATE, &payload, compressed, content.len() as u32)
    }

    /// Append an entry with explicit directory values, consistent or not.
    pub fn entry(
        mut self,
        name: impl AsRef<[u8]>,
        method: u16,
        payload: &[u8],
        compressed_size: u32,
        uncompressed_size: u32,
    ) -> Self {
        let name = name.as_ref();
        let offset = self.data.len() as u32;

        let lfh = &mut self.data;
        lfh.extend_from_slice(b"PK\x03\x04");
        lfh.write_u16::<LittleEndian>(20).unwrap(); // version needed
        lfh.write_u16::<LittleEndian>(0).unwrap(); // flags
        lfh.write_u16::<LittleEndian>(method).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap(); // time
        lfh.write_u16::<LittleEndian>(0x21).unwrap(); // date
        lfh.write_u32::<LittleEndian>(0).unwrap(); // crc32
        lfh.write_u32::<LittleEndian>(compressed_size).unwrap();
        lfh.write_u32::<LittleEndian>(uncompressed_size).unwrap();
        lfh.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        lfh.write_u16::<LittleEndian>(0).unwrap(); // extra
        lfh.extend_from_slice(name);
        lfh.extend_from_slice(payload);

        let cd = &mut self.central;
        cd.extend_from_slice(b"PK\x01\x02");
        cd.write_u16::<LittleEndian>(20).unwrap(); // version made by
        cd.write_u16::<LittleEndian>(20).unwrap(); // version needed
        cd.write_u16::<LittleEndian>(0).unwrap(); // flags
        cd.write_u16::<LittleEndian>(method).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap(); // time
        cd.write_u16::<LittleEndian>(0x21).unwrap(); // date
        cd.write_u32::<LittleEndian>(0).unwrap(); // crc32
        cd.write_u32::<LittleEndian>(compressed_size).unwrap();
        cd.write_u32::<LittleEndian>(uncompressed_size).unwrap();
        cd.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        cd.write_u16::<LittleEndian>(0).unwrap(); // extra
        cd.write_u16::<LittleEndian>(0).unwrap(); // comment
        cd.write_u16::<LittleEndian>(0).unwrap(); // disk number
        cd.write_u16::<LittleEndian>(0).unwrap(); // internal attrs
        cd.write_u32::<LittleEndian>(0).unwrap(); // external attrs
        cd.write_u32::<LittleEndian>(offset).unwrap();
        cd.extend_from_slice(name);

        self.count += 1;
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.finish_with_comment(b"")
    }

    pub fn finish_with_comment(self, comment: &[u8]) -> Vec<u8> {
        let mut out = self.data;
        let cd_offset = out.len() as u32;
        let cd_size = self.central.len() as u32;
        out.extend_from_slice(&self.central);

        out.extend_from_slice(b"PK\x05\x06");
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(self.count).unwrap();
        out.write_u16::<LittleEndian>(self.count).unwrap();
        out.write_u32::<LittleEndian>(cd_size).unwrap();
        out.write_u32::<LittleEndian>(cd_offset).unwrap();
        out.write_u16::<LittleEndian>(comment.len() as u16).unwrap();
        out.extend_from_slice(comment);
        out
    }
}
