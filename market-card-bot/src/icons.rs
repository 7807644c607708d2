use std::path::PathBuf;

use async_trait::async_trait;
use market_card::{IconError, IconSource};
use xivapi::XivApiClient;

/// Fetches icons from the game data host.
pub(crate) struct RemoteIcons {
    client: XivApiClient,
}

impl RemoteIcons {
    pub(crate) fn new(client: XivApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IconSource for RemoteIcons {
    async fn fetch_icon(&self, icon_path: &str) -> Result<Vec<u8>, IconError> {
        self.client
            .icon_bytes(icon_path)
            .await
            .map_err(|e| IconError::Fetch(Box::new(e)))
    }
}

/// Reads icons from a local directory, by the file name of the icon path.
pub(crate) struct DirectoryIcons {
    dir: PathBuf,
}

impl DirectoryIcons {
    pub(crate) fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path_for(&self, icon_path: &str) -> Option<PathBuf> {
        icon_path
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty() && *name != "." && *name != "..")
            .map(|name| self.dir.join(name))
    }
}

#[async_trait]
impl IconSource for DirectoryIcons {
    async fn fetch_icon(&self, icon_path: &str) -> Result<Vec<u8>, IconError> {
        let path = self
            .path_for(icon_path)
            .ok_or_else(|| IconError::Missing(icon_path.to_string()))?;
        tokio::fs::read(&path)
            .await
            .map_err(|e| IconError::Fetch(Box::new(e)))
    }
}

/// Either of the two, picked at startup.
pub(crate) enum Icons {
    Remote(RemoteIcons),
    Directory(DirectoryIcons),
}

#[async_trait]
impl IconSource for Icons {
    async fn fetch_icon(&self, icon_path: &str) -> Result<Vec<u8>, IconError> {
        match self {
            Icons::Remote(icons) => icons.fetch_icon(icon_path).await,
            Icons::Directory(icons) => icons.fetch_icon(icon_path).await,
        }
    }
}

#[cfg(test)]
mod test {
    use market_card::{IconError, IconSource};

    use super::DirectoryIcons;

    #[tokio::test]
    async fn reads_icons_by_file_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("020801.png"), b"icon").unwrap();
        let icons = DirectoryIcons::new(dir.path());
        let bytes = icons.fetch_icon("/i/020000/020801.png").await.unwrap();
        assert_eq!(bytes, b"icon");
        assert!(matches!(
            icons.fetch_icon("/i/020000/missing.png").await,
            Err(IconError::Fetch(_))
        ));
        assert!(matches!(
            icons.fetch_icon("/i/020000/").await,
            Err(IconError::Missing(_))
        ));
    }
}
