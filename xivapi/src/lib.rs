pub mod models;

use crate::models::item::Item;
use log::{debug, info};
use reqwest::Client;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum XivApiError {
    #[error("{0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

pub trait XivDataQuery {
    type Data: DeserializeOwned;

    fn get_path(&self) -> String;
}

/// Requests a given item with the given ID
pub struct ItemRequest(pub u32);

impl ItemRequest {
    const COLUMNS: &'static str =
        "ID,Name,Icon,LevelItem,ItemKind.Name,ItemSearchCategory.Name,Rarity,CanBeHq";
}

impl XivDataQuery for ItemRequest {
    type Data = Item;

    fn get_path(&self) -> String {
        format!("/Item/{}?columns={}", self.0, Self::COLUMNS)
    }
}

/// Client for xivapi compatible game data hosts.
pub struct XivApiClient {
    client: Client,
    base_url: String,
}

impl XivApiClient {
    pub const CAFEMAKER_BASE_URL: &'static str = "https://cafemaker.wakingsands.com";

    pub fn new(base_url: impl Into<String>) -> Result<Self, XivApiError> {
        let client = Client::builder().build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn cafemaker() -> Result<Self, XivApiError> {
        Self::new(Self::CAFEMAKER_BASE_URL)
    }

    pub async fn query<T: XivDataQuery>(&self, query: T) -> Result<T::Data, XivApiError> {
        let url = format!("{}{}", self.base_url, query.get_path());
        debug!("preforming query {url:?}");
        Ok(self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?)
    }

    pub async fn item(&self, id: u32) -> Result<Item, XivApiError> {
        self.query(ItemRequest(id)).await
    }

    /// Absolute URL of an icon path as returned in [`Item::icon`].
    pub fn icon_url(&self, icon_path: &str) -> String {
        if icon_path.starts_with("http://") || icon_path.starts_with("https://") {
            return icon_path.to_string();
        }
        format!("{}/{}", self.base_url, icon_path.trim_start_matches('/'))
    }

    pub async fn icon_bytes(&self, icon_path: &str) -> Result<Vec<u8>, XivApiError> {
        let url = self.icon_url(icon_path);
        info!("downloading icon {url}");
        let bytes = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;
        Ok(bytes.to_vec())
    }
}
