mod cli;
mod data;
mod health;
mod icons;
mod output;
mod report;

use std::{path::Path, time::Duration};

use anyhow::{bail, Context, Result};
use chrono::Local;
use clap::Parser;
use market_card::{FontLibrary, RenderConfig, RenderPipeline};
use tracing::{info, warn};
use universalis::UniversalisClient;
use xivapi::XivApiClient;

use crate::{
    cli::{Cli, Command, FontArgs, RenderArgs},
    icons::{DirectoryIcons, Icons, RemoteIcons},
    output::{data_uri, ImageStore},
};

async fn load_config(path: Option<&Path>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig::default());
    };
    let json = tokio::fs::read(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;
    let config = serde_json::from_slice(&json)
        .with_context(|| format!("parsing theme {}", path.display()))?;
    info!("loaded theme {}", path.display());
    Ok(config)
}

fn load_fonts(config: &RenderConfig, args: &FontArgs) -> Result<FontLibrary> {
    let mut fonts = FontLibrary::new();
    let families = [
        (&config.fonts.cjk_family, &args.cjk_font),
        (&config.fonts.latin_family, &args.latin_font),
    ];
    for (family, path) in families {
        if let Some(path) = path {
            fonts
                .register_file(family.as_str(), path)
                .with_context(|| format!("loading {family} from {}", path.display()))?;
        }
    }
    if fonts.names().next().is_none() {
        bail!("no fonts registered, pass --cjk-font and/or --latin-font");
    }
    Ok(fonts)
}

fn max_age(hours: u64) -> Duration {
    Duration::from_secs(hours.saturating_mul(60 * 60))
}

async fn render(config: RenderConfig, args: RenderArgs) -> Result<()> {
    let (item, sale) = match (&args.item_json, &args.market_json) {
        (Some(item), Some(market)) => data::load(item, market).await?,
        _ => {
            let xivapi = XivApiClient::cafemaker()?;
            let universalis = UniversalisClient::new("market-card")?;
            data::fetch(&xivapi, &universalis, args.item_id, &args.world).await?
        }
    };
    if args.text {
        println!("{}", report::text_report(&item, &sale));
        return Ok(());
    }

    let fonts = load_fonts(&config, &args.fonts)?;
    let icons = match &args.icon_dir {
        Some(dir) => Icons::Directory(DirectoryIcons::new(dir)),
        None => Icons::Remote(RemoteIcons::new(XivApiClient::cafemaker()?)),
    };
    let mut pipeline = RenderPipeline::new(config, fonts, icons);
    match &args.badge {
        Some(badge) => {
            let bytes = tokio::fs::read(badge)
                .await
                .with_context(|| format!("reading badge {}", badge.display()))?;
            pipeline = pipeline.with_badge_bytes(&bytes)?;
        }
        None => warn!("no hq badge given, hq listings are drawn without it"),
    }

    let card = pipeline.render(&item, &sale, Local::now()).await?;
    info!(
        "drew {} of {} listings",
        card.summary.rows_drawn,
        sale.listings.len()
    );
    let store = ImageStore::new(&args.out_dir)
        .with_limits(args.keep, max_age(args.max_age_hours));
    let path = store.save(&card.png).await?;
    println!("{}", path.display());
    if args.data_uri {
        println!("{}", data_uri(&card.png));
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref()).await?;
    match cli.command {
        Command::Render(args) => render(config, args).await,
        Command::Health(args) => {
            let report = health::check(&ImageStore::new(args.out_dir)).await;
            println!("{report:?}");
            if !report.is_ok() {
                bail!("health check failed");
            }
            Ok(())
        }
    }
}
