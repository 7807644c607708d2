use serde::{Deserialize, Serialize};
use serde_with::{serde_as, BoolFromInt};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct NamedRow {
    pub name: String,
}

#[serde_as]
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    #[serde(rename = "ID", default)]
    pub id: i32,
    pub name: String,
    /// Path of the icon relative to the game data host, ex. `/i/020000/020801.png`
    pub icon: String,
    pub level_item: u32,
    pub item_kind: NamedRow,
    pub item_search_category: NamedRow,
    pub rarity: u8,
    #[serde_as(as = "BoolFromInt")]
    pub can_be_hq: bool,
}
