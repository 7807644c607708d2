use async_trait::async_trait;
use image::RgbaImage;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IconError {
    #[error("failed to fetch icon: {0}")]
    Fetch(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("failed to decode icon: {0}")]
    Decode(#[from] image::ImageError),
    #[error("no icon for {0:?}")]
    Missing(String),
}

/// Where item icons come from. The only asynchronous dependency of a render.
#[async_trait]
pub trait IconSource: Send + Sync {
    /// Returns the encoded image bytes for an icon path such as
    /// `/i/020000/020801.png`.
    async fn fetch_icon(&self, icon_path: &str) -> Result<Vec<u8>, IconError>;

    async fn load_icon(&self, icon_path: &str) -> Result<RgbaImage, IconError> {
        let bytes = self.fetch_icon(icon_path).await?;
        Ok(image::load_from_memory(&bytes)?.to_rgba8())
    }
}

#[async_trait]
impl<T: IconSource + ?Sized> IconSource for &T {
    async fn fetch_icon(&self, icon_path: &str) -> Result<Vec<u8>, IconError> {
        (**self).fetch_icon(icon_path).await
    }
}

/// Never has an icon.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIcon;

#[async_trait]
impl IconSource for NoIcon {
    async fn fetch_icon(&self, icon_path: &str) -> Result<Vec<u8>, IconError> {
        Err(IconError::Missing(icon_path.to_string()))
    }
}

/// Serves the same bytes for every path.
#[derive(Debug, Clone, Default)]
pub struct StaticIcon(pub Vec<u8>);

#[async_trait]
impl IconSource for StaticIcon {
    async fn fetch_icon(&self, _icon_path: &str) -> Result<Vec<u8>, IconError> {
        Ok(self.0.clone())
    }
}
