mod http;
mod local;

pub use http::HttpArchive;
pub use local::LocalArchive;

use anyhow::Result;
use async_trait::async_trait;

/// Upload cap of the report service: archives above this are never stored.
pub const DEFAULT_MAX_ARCHIVE_BYTES: u64 = 50 * 1024 * 1024;

/// Trait for loading a complete archive into memory
#[async_trait]
pub trait ArchiveSource: Send + Sync {
    /// Read the whole archive, failing if it is larger than `limit` bytes
    async fn load(&self, limit: u64) -> Result<Vec<u8>>;

    /// Human-readable origin for messages
    fn describe(&self) -> String;
}
