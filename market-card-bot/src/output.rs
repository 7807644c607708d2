//! Where rendered cards go once they are encoded.

use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use anyhow::{bail, Result};
use base64::{engine::general_purpose::STANDARD, Engine};
use itertools::Itertools;
use sha2::{Digest, Sha256};
use tracing::{debug, info, warn};

/// `data:image/png;base64,...`
pub(crate) fn data_uri(png: &[u8]) -> String {
    format!("data:image/png;base64,{}", STANDARD.encode(png))
}

/// Content addressed PNG directory with a size and age cap.
pub(crate) struct ImageStore {
    dir: PathBuf,
    max_files: usize,
    max_age: Duration,
}

impl ImageStore {
    const DEFAULT_MAX_FILES: usize = 100;
    const DEFAULT_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            max_files: Self::DEFAULT_MAX_FILES,
            max_age: Self::DEFAULT_MAX_AGE,
        }
    }

    pub(crate) fn with_limits(mut self, max_files: usize, max_age: Duration) -> Self {
        self.max_files = max_files;
        self.max_age = max_age;
        self
    }

    pub(crate) fn dir(&self) -> &Path {
        &self.dir
    }

    pub(crate) fn file_name(png: &[u8]) -> String {
        format!("{:x}.png", Sha256::digest(png))
    }

    /// Writes `png` under its hash, unless that file already exists, then
    /// prunes the directory. Returns the path of the stored file.
    pub(crate) async fn save(&self, png: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(Self::file_name(png));
        if tokio::fs::try_exists(&path).await? {
            debug!("{} already stored", path.display());
        } else {
            tokio::fs::write(&path, png).await?;
            let written = tokio::fs::metadata(&path).await?.len();
            if written != png.len() as u64 {
                bail!(
                    "wrote {written} of {} bytes to {}",
                    png.len(),
                    path.display()
                );
            }
            info!("stored {}", path.display());
        }
        self.prune(&path).await?;
        Ok(path)
    }

    /// Removes stored PNGs older than the age cap, then the oldest ones past
    /// the file cap. `keep` is never removed.
    pub(crate) async fn prune(&self, keep: &Path) -> Result<usize> {
        let now = SystemTime::now();
        let mut files = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path == keep || path.extension().map_or(true, |ext| ext != "png") {
                continue;
            }
            let modified = entry.metadata().await?.modified()?;
            files.push((path, modified));
        }
        let kept_slots = self.max_files.saturating_sub(1);
        let (expired, fresh): (Vec<_>, Vec<_>) = files.into_iter().partition(|(_, modified)| {
            now.duration_since(*modified).unwrap_or_default() > self.max_age
        });
        let overflow = fresh.len().saturating_sub(kept_slots);
        let doomed = expired.into_iter().chain(
            fresh
                .into_iter()
                .sorted_by_key(|(_, modified)| *modified)
                .take(overflow),
        );
        let mut removed = 0;
        for (path, _) in doomed {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => removed += 1,
                Err(e) => warn!("unable to remove {}: {e}", path.display()),
            }
        }
        if removed > 0 {
            debug!("pruned {removed} images from {}", self.dir.display());
        }
        Ok(removed)
    }

    /// Checks the directory can be created and written to.
    pub(crate) async fn check_writable(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let probe = self.dir.join(".market-card-probe");
        tokio::fs::write(&probe, b"ok").await?;
        tokio::fs::remove_file(&probe).await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::{data_uri, ImageStore};

    #[test]
    fn data_uris() {
        assert_eq!(data_uri(b"png"), "data:image/png;base64,cG5n");
    }

    #[test]
    fn file_names_are_content_hashes() {
        let name = ImageStore::file_name(b"");
        assert_eq!(
            name,
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855.png"
        );
        assert_ne!(ImageStore::file_name(b"a"), ImageStore::file_name(b"b"));
    }

    #[tokio::test]
    async fn saves_once_per_content() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("cards"));
        let first = store.save(b"first image").await.unwrap();
        let again = store.save(b"first image").await.unwrap();
        assert_eq!(first, again);
        assert_eq!(std::fs::read(&first).unwrap(), b"first image");
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn keeps_newest_files_within_cap() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).with_limits(2, Duration::from_secs(3600));
        std::fs::write(dir.path().join("notes.txt"), b"not an image").unwrap();
        let mut stored = Vec::new();
        for i in 0..4u8 {
            stored.push(store.save(&[i; 8]).await.unwrap());
            // distinct modification times
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        let remaining: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "png"))
            .collect();
        assert_eq!(remaining.len(), 2);
        assert!(remaining.contains(&stored[3]));
        assert!(remaining.contains(&stored[2]));
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn expired_files_are_pruned() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path()).with_limits(100, Duration::ZERO);
        let old = store.save(b"old").await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        let new = store.save(b"new").await.unwrap();
        assert!(!old.exists());
        assert!(new.exists());
    }

    #[tokio::test]
    async fn writable_check() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path().join("nested"));
        store.check_writable().await.unwrap();
        assert_eq!(std::fs::read_dir(store.dir()).unwrap().count(), 0);
    }
}
