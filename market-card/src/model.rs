use chrono::{DateTime, Local};
use universalis::{CurrentlyShownView, ListingView, ScopeName};
use xivapi::models::item::Item;

/// Item rarity, 1 through 7. Out of range values clamp into that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rarity(u8);

impl Rarity {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 7))
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Zero based palette index
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ItemInfo {
    pub name: String,
    /// Icon path on the game data host
    pub icon: String,
    pub item_level: u32,
    pub kind: String,
    pub search_category: String,
    pub rarity: Rarity,
    pub can_be_hq: bool,
}

impl From<Item> for ItemInfo {
    fn from(item: Item) -> Self {
        Self {
            name: item.name,
            icon: item.icon,
            item_level: item.level_item,
            kind: item.item_kind.name,
            search_category: item.item_search_category.name,
            rarity: Rarity::new(item.rarity),
            can_be_hq: item.can_be_hq,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketScope {
    World(String),
    Datacenter(String),
    Region(String),
    Unknown,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PriceStats {
    pub min_nq: u64,
    pub min_hq: u64,
    pub max_nq: u64,
    pub max_hq: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub price_per_unit: u64,
    pub quantity: u64,
    pub total: u64,
    pub hq: bool,
    pub world_name: Option<String>,
    pub retainer_name: String,
    pub last_review_time: DateTime<Local>,
}

/// Market state of one item. Listings keep the order the source sent them in.
#[derive(Debug, Clone, PartialEq)]
pub struct SaleInfo {
    pub scope: MarketScope,
    pub last_upload_time: DateTime<Local>,
    pub stats: PriceStats,
    pub listings: Vec<Listing>,
}

fn price(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.round() as u64
    } else {
        0
    }
}

impl From<ListingView> for Listing {
    fn from(view: ListingView) -> Self {
        Self {
            price_per_unit: view.price_per_unit,
            quantity: view.quantity,
            total: view.total,
            hq: view.hq,
            world_name: view.world_name,
            retainer_name: view.retainer_name,
            last_review_time: view.last_review_time,
        }
    }
}

impl From<CurrentlyShownView> for SaleInfo {
    fn from(view: CurrentlyShownView) -> Self {
        let scope = match view.scope() {
            ScopeName::World(name) => MarketScope::World(name.to_string()),
            ScopeName::Datacenter(name) => MarketScope::Datacenter(name.to_string()),
            ScopeName::Region(name) => MarketScope::Region(name.to_string()),
            ScopeName::Unknown => MarketScope::Unknown,
        };
        Self {
            scope,
            last_upload_time: view.last_upload_time,
            stats: PriceStats {
                min_nq: price(view.min_price_nq),
                min_hq: price(view.min_price_hq),
                max_nq: price(view.max_price_nq),
                max_hq: price(view.max_price_hq),
            },
            listings: view.listings.into_iter().map(Listing::from).collect(),
        }
    }
}
