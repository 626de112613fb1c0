use super::ArchiveSource;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use std::path::PathBuf;

/// Archive stored on the local filesystem
pub struct LocalArchive {
    path: PathBuf,
}

impl LocalArchive {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl ArchiveSource for LocalArchive {
    async fn load(&self, limit: u64) -> Result<Vec<u8>> {
        let size = tokio::fs::metadata(&self.path)
            .await
            .with_context(|| format!("cannot open {}", self.path.display()))?
            .len();

        // Check the size before reading anything
        if size > limit {
            bail!(
                "{} is {} bytes, larger than the {} byte limit",
                self.path.display(),
                size,
                limit
            );
        }

        let data = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("cannot read {}", self.path.display()))?;

        // The file may have grown since the metadata call
        if data.len() as u64 > limit {
            bail!("{} grew past the {} byte limit", self.path.display(), limit);
        }

        Ok(data)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_load_within_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"PK\x05\x06").unwrap();

        let source = LocalArchive::new(file.path());
        assert_eq!(source.load(1024).await.unwrap(), b"PK\x05\x06");
    }

    #[tokio::test]
    async fn test_load_over_limit() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; 64]).unwrap();

        let source = LocalArchive::new(file.path());
        assert!(source.load(63).await.is_err());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let source = LocalArchive::new(dir.path().join("missing.zip"));
        let err = source.load(1024).await.unwrap_err();
        assert!(err.to_string().contains("cannot open"));
    }
}
