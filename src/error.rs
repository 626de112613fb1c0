use thiserror::Error;

/// Failures of the report core.
///
/// None of these abort a whole report: a malformed archive degrades to
/// zero sections and an entry failure only drops that one section.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("archive is malformed: {0}")]
    ArchiveMalformed(&'static str),

    #[error("entry '{name}' is unavailable: {reason}")]
    EntryUnavailable { name: String, reason: &'static str },

    #[error("entry '{name}' uses unsupported compression method {method}")]
    DecompressionUnsupported { name: String, method: u16 },
}

impl Error {
    pub(crate) fn unavailable(name: impl Into<String>, reason: &'static str) -> Self {
        Self::EntryUnavailable {
            name: name.into(),
            reason,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
