//! ZIP archive parsing and extraction.
//!
//! This module reads report archives that are already held in memory. It
//! only understands as much of the format as the report needs.
//!
//! ## Architecture
//!
//! - [`structures`]: Data structures representing ZIP format elements (EOCD, entries, the index)
//! - [`parser`]: Bounds-checked parsing of ZIP structures from raw bytes
//! - [`extractor`]: Entry extraction and decompression
//!
//! ## ZIP Format Overview
//!
//! A ZIP file consists of:
//! 1. Local file headers and compressed data for each file
//! 2. Central Directory with metadata for all files
//! 3. End of Central Directory (EOCD) record at the end
//!
//! The EOCD is read first (from the end of the buffer), then the Central
//! Directory, then only the local headers of the entries actually requested.
//!
//! ## Supported Features
//!
//! - Standard ZIP format (PKZIP APPNOTE 6.3.x compatible)
//! - STORED (no compression) method
//! - DEFLATE compression method
//!
//! ## Limitations
//!
//! - No ZIP64 support
//! - No encryption support
//! - No multi-disk archive support
//! - No BZIP2, LZMA, or other compression methods

mod extractor;
mod parser;
mod structures;

pub use extractor::{extract_entry, read_directory};
pub use parser::ZipParser;
pub use structures::*;
