//! # termreport
//!
//! Render terminal-session transcripts bundled in a ZIP archive into styled
//! HTML fragments and plain-text copies.
//!
//! A report archive carries one log file per section (basic system info, IP
//! quality, network quality, route trace). This library reads the archive
//! straight from memory, extracts only the requested files, cleans up the
//! captured terminal output and converts its color codes to inline-styled
//! HTML.
//!
//! ## Features
//!
//! - Minimal ZIP reader: central directory lookup, STORED and DEFLATE entries
//! - Bounds-checked parsing: damaged archives degrade to fewer sections
//! - Normalization of redraw noise and escape sequences that lost their introducer
//! - SGR color/style rendering to HTML plus an escape-free copy
//! - Extraction of embedded report image links
//!
//! ## Example
//!
//! ```no_run
//! use termreport::{SectionTable, build_report};
//!
//! let data = std::fs::read("result.zip").unwrap();
//! let report = build_report(&data, &SectionTable::default());
//! for section in &report.sections {
//!     println!("{}: {} links", section.label, section.links.len());
//! }
//! ```

pub mod cli;
pub mod error;
pub mod io;
pub mod report;
pub mod text;
pub mod zip;

pub use cli::Cli;
pub use error::{Error, Result};
pub use io::{ArchiveSource, HttpArchive, LocalArchive};
pub use report::{DecodedSection, Report, SectionKey, SectionSpec, SectionTable, build_report};
pub use text::{Rendered, StyleState, escape_html, extract_links, normalize, render};
pub use zip::{ArchiveEntry, CompressionMethod, DirectoryIndex, extract_entry, read_directory};
