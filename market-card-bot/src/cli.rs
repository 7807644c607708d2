use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Render market board cards for FFXIV items
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub(crate) struct Cli {
    /// JSON theme file, any values it leaves out keep their defaults
    #[arg(long, global = true)]
    pub(crate) config: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Render the current listings of one item
    Render(RenderArgs),
    /// Check that images can be drawn, encoded and stored
    Health(HealthArgs),
}

#[derive(Debug, Args)]
pub(crate) struct FontArgs {
    /// Font file registered under the configured CJK family
    #[arg(long, env = "MARKET_CARD_CJK_FONT")]
    pub(crate) cjk_font: Option<PathBuf>,
    /// Font file registered under the configured Latin family
    #[arg(long, env = "MARKET_CARD_LATIN_FONT")]
    pub(crate) latin_font: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub(crate) struct RenderArgs {
    /// Item id
    pub(crate) item_id: u32,
    /// World, datacenter or region name
    #[arg(long, default_value = "猫小胖")]
    pub(crate) world: String,
    /// Read the item from this xivapi JSON file instead of fetching it
    #[arg(long, requires = "market_json")]
    pub(crate) item_json: Option<PathBuf>,
    /// Read market data from this universalis JSON file instead of fetching it
    #[arg(long, requires = "item_json")]
    pub(crate) market_json: Option<PathBuf>,
    /// Load icons from this directory by file name instead of fetching them
    #[arg(long)]
    pub(crate) icon_dir: Option<PathBuf>,
    #[command(flatten)]
    pub(crate) fonts: FontArgs,
    /// HQ badge image drawn next to high quality listings
    #[arg(long, env = "MARKET_CARD_HQ_BADGE")]
    pub(crate) badge: Option<PathBuf>,
    #[arg(long, default_value = "out")]
    pub(crate) out_dir: PathBuf,
    /// Most images kept in the output directory
    #[arg(long, default_value_t = 100)]
    pub(crate) keep: usize,
    /// Images older than this many hours are removed
    #[arg(long, default_value_t = 24)]
    pub(crate) max_age_hours: u64,
    /// Print the image as a data URI as well
    #[arg(long)]
    pub(crate) data_uri: bool,
    /// Print a plain text table instead of drawing an image
    #[arg(long)]
    pub(crate) text: bool,
}

#[derive(Debug, Args)]
pub(crate) struct HealthArgs {
    #[arg(long, default_value = "out")]
    pub(crate) out_dir: PathBuf,
}
