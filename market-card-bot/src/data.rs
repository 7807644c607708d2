use std::path::Path;

use anyhow::{Context, Result};
use market_card::{ItemInfo, SaleInfo};
use tracing::info;
use universalis::{CurrentlyShownView, ItemId, UniversalisClient};
use xivapi::{models::item::Item, XivApiClient};

/// Fetches the item and its market data at the same time.
pub(crate) async fn fetch(
    xivapi: &XivApiClient,
    universalis: &UniversalisClient,
    item_id: u32,
    world: &str,
) -> Result<(ItemInfo, SaleInfo)> {
    info!("fetching item {item_id} on {world}");
    let market_id = i32::try_from(item_id).context("item id out of range")?;
    let (item, market) = futures::join!(
        xivapi.item(item_id),
        universalis.marketboard_current_data(world, ItemId(market_id))
    );
    let item = item.context("item lookup failed")?;
    let market = market.context("market lookup failed")?;
    Ok((item.into(), market.into()))
}

/// Reads an xivapi item record and a universalis response from disk.
pub(crate) async fn load(item: &Path, market: &Path) -> Result<(ItemInfo, SaleInfo)> {
    let item_json = tokio::fs::read(item)
        .await
        .with_context(|| format!("reading {}", item.display()))?;
    let market_json = tokio::fs::read(market)
        .await
        .with_context(|| format!("reading {}", market.display()))?;
    parse(&item_json, &market_json)
}

fn parse(item: &[u8], market: &[u8]) -> Result<(ItemInfo, SaleInfo)> {
    let item: Item = serde_json::from_slice(item).context("parsing item")?;
    let market: CurrentlyShownView =
        serde_json::from_slice(market).context("parsing market data")?;
    Ok((item.into(), market.into()))
}
