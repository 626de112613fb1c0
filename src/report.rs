//! Report assembly.
//!
//! A report archive holds one log file per section. The [`SectionTable`]
//! says which files to look for and how to label them; [`build_report`]
//! runs every requested file through extraction, normalization, rendering
//! and link extraction. Sections that cannot be decoded are left out.

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::text::{self, Rendered};
use crate::zip::{self, DirectoryIndex};

/// The sections a report archive may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SectionKey {
    Header,
    BasicInfo,
    IpQuality,
    NetQuality,
    BackrouteTrace,
}

impl SectionKey {
    pub const ALL: [SectionKey; 5] = [
        SectionKey::Header,
        SectionKey::BasicInfo,
        SectionKey::IpQuality,
        SectionKey::NetQuality,
        SectionKey::BackrouteTrace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SectionKey::Header => "header_info",
            SectionKey::BasicInfo => "basic_info",
            SectionKey::IpQuality => "ip_quality",
            SectionKey::NetQuality => "net_quality",
            SectionKey::BackrouteTrace => "backroute_trace",
        }
    }

    /// File name of the section inside the archive
    pub fn entry_name(&self) -> String {
        format!("{}.log", self.as_str())
    }

    pub fn default_label(&self) -> &'static str {
        match self {
            SectionKey::Header => "Header",
            SectionKey::BasicInfo => "基本信息",
            SectionKey::IpQuality => "IP质量",
            SectionKey::NetQuality => "网络质量",
            SectionKey::BackrouteTrace => "回程路由",
        }
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SectionKey {
    type Err = String;

    /// Accepts the key itself or the archive file name (`ip_quality.log`).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let key = s.strip_suffix(".log").unwrap_or(s);
        SectionKey::ALL
            .into_iter()
            .find(|candidate| candidate.as_str() == key)
            .ok_or_else(|| {
                let known: Vec<_> = SectionKey::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown section '{s}' (expected one of: {})", known.join(", "))
            })
    }
}

/// One row of the section table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionSpec {
    pub key: SectionKey,
    pub entry_name: String,
    pub label: String,
}

impl SectionSpec {
    pub fn new(key: SectionKey, entry_name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            key,
            entry_name: entry_name.into(),
            label: label.into(),
        }
    }
}

impl From<SectionKey> for SectionSpec {
    fn from(key: SectionKey) -> Self {
        Self::new(key, key.entry_name(), key.default_label())
    }
}

/// Ordered list of sections to extract. Output order follows this table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionTable {
    sections: Vec<SectionSpec>,
}

impl Default for SectionTable {
    fn default() -> Self {
        Self {
            sections: SectionKey::ALL.into_iter().map(SectionSpec::from).collect(),
        }
    }
}

impl SectionTable {
    pub fn new(sections: Vec<SectionSpec>) -> Self {
        Self { sections }
    }

    /// Keep only the given keys, preserving table order.
    pub fn retain_keys(&mut self, keys: &[SectionKey]) {
        self.sections.retain(|spec| keys.contains(&spec.key));
    }

    /// Replace the label of `key`. Returns `false` if the key is not in the table.
    pub fn set_label(&mut self, key: SectionKey, label: impl Into<String>) -> bool {
        match self.sections.iter_mut().find(|spec| spec.key == key) {
            Some(spec) => {
                spec.label = label.into();
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SectionSpec> {
        self.sections.iter()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

/// A fully decoded section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedSection {
    pub key: SectionKey,
    pub label: String,
    /// Styled HTML fragment
    pub html: String,
    /// Escape-free copy of the transcript
    pub plain: String,
    /// Normalized transcript, the input of both renderings
    pub normalized: String,
    /// Report image URLs, first-seen order, no duplicates
    pub links: Vec<String>,
}

/// Sections decoded from one archive, in table order.
///
/// An empty report is a valid outcome: the archive was malformed or held
/// none of the requested files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    pub sections: Vec<DecodedSection>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn get(&self, key: SectionKey) -> Option<&DecodedSection> {
        self.sections.iter().find(|section| section.key == key)
    }

    /// Header and basic info as one copyable text, separated by a blank line.
    pub fn combined_plain(&self) -> String {
        self.combined_parts(|section| section.plain.as_str())
    }

    /// Header and basic info rendered as a single fragment.
    ///
    /// The joined text goes through one render pass, so a style left open at
    /// the end of the header carries into the basic info.
    pub fn combined_html(&self) -> String {
        text::render(&self.combined_parts(|section| section.normalized.as_str())).html
    }

    fn combined_parts<'a>(&'a self, part: impl Fn(&'a DecodedSection) -> &'a str) -> String {
        [SectionKey::Header, SectionKey::BasicInfo]
            .into_iter()
            .filter_map(|key| self.get(key))
            .map(part)
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    /// The image shown alongside a section, if the transcript linked one.
    pub fn first_link(&self, key: SectionKey) -> Option<&str> {
        self.get(key)?.links.first().map(String::as_str)
    }
}

/// Decode every section of `table` found in `data`.
///
/// Never fails. Problems are logged and cost only the affected section, or
/// every section when the archive itself cannot be read.
pub fn build_report(data: &[u8], table: &SectionTable) -> Report {
    let index = match zip::read_directory(data) {
        Ok(index) => index,
        Err(err) => {
            tracing::warn!(%err, archive_len = data.len(), "no sections available");
            return Report::default();
        }
    };
    tracing::debug!(entries = index.len(), "parsed archive directory");

    let sections = table
        .iter()
        .filter_map(|spec| match decode_section(data, &index, spec) {
            Ok(section) => Some(section),
            Err(err) => {
                tracing::warn!(section = %spec.key, %err, "section unavailable");
                None
            }
        })
        .collect();

    Report { sections }
}

/// Extract, normalize and render one section.
pub fn decode_section(
    data: &[u8],
    index: &DirectoryIndex,
    spec: &SectionSpec,
) -> Result<DecodedSection> {
    let entry = index
        .get(&spec.entry_name)
        .ok_or_else(|| Error::unavailable(spec.entry_name.as_str(), "not in archive"))?;

    let raw = zip::extract_entry(data, entry)?;
    let normalized = text::normalize_bytes(&raw);
    let Rendered { html, plain } = text::render(&normalized);
    let links = text::extract_links(&normalized);

    tracing::debug!(
        section = %spec.key,
        bytes = raw.len(),
        links = links.len(),
        "decoded section"
    );

    Ok(DecodedSection {
        key: spec.key,
        label: spec.label.clone(),
        html,
        plain,
        normalized,
        links,
    })
}
