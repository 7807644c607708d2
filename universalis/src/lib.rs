use chrono::{DateTime, Local};
use log::info;
use reqwest::{Client, Method, Request, Url};
use serde::{Deserialize, Serialize};
use serde_with::{formats::Flexible, serde_as, TimestampMilliSeconds, TimestampSeconds};
use thiserror::Error;

#[derive(Hash, Copy, Clone, Debug, Deserialize, Serialize, Eq, PartialEq, PartialOrd, Ord)]
pub struct ItemId(pub i32);

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, PartialOrd, Ord, Hash)]
pub struct WorldId(pub i32);

#[derive(Error, Debug)]
pub enum Error {
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("HTTP Error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("Bad ID, listing returned id {0}")]
    BadId(u32),
}

#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListingView {
    #[serde_as(as = "TimestampSeconds<i64, Flexible>")]
    pub last_review_time: DateTime<Local>,
    pub price_per_unit: u64,
    pub quantity: u64,
    pub world_name: Option<String>,
    #[serde(rename = "worldID")]
    pub world_id: Option<WorldId>,
    pub hq: bool,
    #[serde(default)]
    pub is_crafted: bool,
    #[serde(default)]
    pub on_mannequin: bool,
    #[serde(default)]
    pub retainer_city: u32,
    pub retainer_name: String,
    pub total: u64,
    #[serde(default)]
    pub tax: i64,
}

/// Current market data for a single item on a world, datacenter or region.
///
/// Exactly one of `world_name`, `dc_name` and `region_name` is normally set,
/// depending on which scope was requested.
#[serde_as]
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct CurrentlyShownView {
    #[serde(rename = "itemID")]
    pub item_id: u32,
    #[serde(rename = "worldID")]
    pub world_id: Option<WorldId>,
    pub world_name: Option<String>,
    pub dc_name: Option<String>,
    pub region_name: Option<String>,
    #[serde_as(as = "TimestampMilliSeconds<i64, Flexible>")]
    pub last_upload_time: DateTime<Local>,
    pub listings: Vec<ListingView>,
    #[serde(rename = "minPriceNQ", default)]
    pub min_price_nq: f64,
    #[serde(rename = "minPriceHQ", default)]
    pub min_price_hq: f64,
    #[serde(rename = "maxPriceNQ", default)]
    pub max_price_nq: f64,
    #[serde(rename = "maxPriceHQ", default)]
    pub max_price_hq: f64,
}

/// Which slice of the market a response describes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScopeName<'a> {
    World(&'a str),
    Datacenter(&'a str),
    Region(&'a str),
    Unknown,
}

impl CurrentlyShownView {
    /// Resolves the scope of the response. The first non-empty of world,
    /// datacenter and region wins.
    pub fn scope(&self) -> ScopeName<'_> {
        fn non_empty(name: &Option<String>) -> Option<&str> {
            name.as_deref().filter(|name| !name.is_empty())
        }
        if let Some(world) = non_empty(&self.world_name) {
            ScopeName::World(world)
        } else if let Some(dc) = non_empty(&self.dc_name) {
            ScopeName::Datacenter(dc)
        } else if let Some(region) = non_empty(&self.region_name) {
            ScopeName::Region(region)
        } else {
            ScopeName::Unknown
        }
    }
}

pub struct UniversalisClient {
    client: Client,
}

impl UniversalisClient {
    const UNIVERSALIS_BASE_URL: &'static str = "https://universalis.app/api/v2";

    pub fn new(user_agent: impl ToString) -> Result<Self, Error> {
        let client = Client::builder()
            .user_agent(user_agent.to_string())
            .build()?;

        Ok(UniversalisClient { client })
    }

    /// Fetches the current listings and price statistics of one item.
    pub async fn marketboard_current_data(
        &self,
        world_or_datacenter: &str,
        item_id: ItemId,
    ) -> Result<CurrentlyShownView, Error> {
        let request = Request::new(
            Method::GET,
            Url::parse(&format!(
                "{}/{world_or_datacenter}/{}",
                Self::UNIVERSALIS_BASE_URL,
                item_id.0
            ))?,
        );
        info!("Getting current marketboard data: {}", request.url());
        let view: CurrentlyShownView = self
            .client
            .execute(request)
            .await?
            .error_for_status()?
            .json()
            .await?;
        if view.item_id != item_id.0 as u32 {
            return Err(Error::BadId(view.item_id));
        }
        Ok(view)
    }
}
