//! Transcript text processing.
//!
//! - [`normalize`]: decoding and cleanup of captured terminal output
//! - [`sgr`]: SGR escape sequences to styled HTML plus a plain copy
//! - [`links`]: report image URLs embedded in the transcript

pub mod links;
pub mod normalize;
pub mod sgr;

pub use links::{extract_links, is_report_image_url};
pub use normalize::{decode_transcript, normalize, normalize_bytes};
pub use sgr::{Rendered, StyleState, escape_html, render};
