use chrono::{DateTime, Local};
use image::RgbaImage;
use log::{debug, warn};

use crate::{
    config::RenderConfig,
    icon::IconSource,
    layout::{CardContent, LayoutEngine, LayoutSummary},
    model::{ItemInfo, SaleInfo},
    surface::Surface,
    text::TextShaper,
    Error,
};

/// Encoded card plus the geometry it was laid out with.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    pub png: Vec<u8>,
    pub summary: LayoutSummary,
}

/// Turns item and sale data into a PNG.
///
/// Holds everything that outlives a single render: configuration, the text
/// shaper with its fonts, the icon source and the decoded hq badge. Each call
/// to [`RenderPipeline::render`] gets a fresh surface, so renders can run
/// side by side.
pub struct RenderPipeline<S, I> {
    config: RenderConfig,
    shaper: S,
    icons: I,
    badge: Option<RgbaImage>,
}

impl<S: TextShaper, I: IconSource> RenderPipeline<S, I> {
    pub fn new(config: RenderConfig, shaper: S, icons: I) -> Self {
        Self {
            config,
            shaper,
            icons,
            badge: None,
        }
    }

    pub fn with_badge(mut self, badge: RgbaImage) -> Self {
        self.badge = Some(badge);
        self
    }

    /// Decodes the hq badge from encoded image bytes.
    pub fn with_badge_bytes(self, bytes: &[u8]) -> Result<Self, Error> {
        let badge = image::load_from_memory(bytes)?.to_rgba8();
        Ok(self.with_badge(badge))
    }

    /// Fetches the item icon, then lays out and encodes the card. A missing
    /// icon only leaves its area blank; only surface failures are errors.
    pub async fn render(
        &self,
        item: &ItemInfo,
        sale: &SaleInfo,
        generated_at: DateTime<Local>,
    ) -> Result<RenderedCard, Error> {
        let icon = match self.icons.load_icon(&item.icon).await {
            Ok(icon) => Some(icon),
            Err(e) => {
                warn!("icon {} unavailable, drawing without it: {e}", item.icon);
                None
            }
        };
        self.render_with_icon(item, sale, icon.as_ref(), generated_at)
    }

    /// The synchronous part of [`RenderPipeline::render`].
    pub fn render_with_icon(
        &self,
        item: &ItemInfo,
        sale: &SaleInfo,
        icon: Option<&RgbaImage>,
        generated_at: DateTime<Local>,
    ) -> Result<RenderedCard, Error> {
        let canvas = &self.config.canvas;
        let mut surface = Surface::new(canvas.width, canvas.height, &self.shaper)?;
        let content = CardContent {
            item,
            sale,
            icon,
            badge: self.badge.as_ref(),
            generated_at,
        };
        let summary = LayoutEngine::new(&mut surface, &self.config, content).run();
        let png = surface.encode_png()?;
        debug!(
            "rendered {} with {} of {} listings, {} bytes",
            item.name,
            summary.rows_drawn,
            sale.listings.len(),
            png.len()
        );
        Ok(RenderedCard { png, summary })
    }
}

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use async_trait::async_trait;
    use chrono::{Local, TimeZone};
    use image::{ImageFormat, Rgba, RgbaImage};

    use super::RenderPipeline;
    use crate::{
        config::RenderConfig,
        icon::{IconError, IconSource, NoIcon, StaticIcon},
        model::{ItemInfo, Listing, MarketScope, PriceStats, Rarity, SaleInfo},
        text::HeuristicShaper,
        Error,
    };

    struct Unreachable;

    #[async_trait]
    impl IconSource for Unreachable {
        async fn fetch_icon(&self, _icon_path: &str) -> Result<Vec<u8>, IconError> {
            Err(IconError::Fetch("connection refused".into()))
        }
    }

    fn item() -> ItemInfo {
        ItemInfo {
            name: "陈旧的鞣革地图".to_string(),
            icon: "/i/026000/026137.png".to_string(),
            item_level: 50,
            kind: "道具".to_string(),
            search_category: "其他".to_string(),
            rarity: Rarity::new(2),
            can_be_hq: true,
        }
    }

    fn sale(listings: usize) -> SaleInfo {
        let at = Local.with_ymd_and_hms(2023, 11, 5, 11, 30, 0).unwrap();
        SaleInfo {
            scope: MarketScope::World("紫水栈桥".to_string()),
            last_upload_time: at,
            stats: PriceStats {
                min_nq: 1200,
                min_hq: 0,
                max_nq: 52000,
                max_hq: 0,
            },
            listings: (0..listings)
                .map(|i| Listing {
                    price_per_unit: 1200 + 100 * i as u64,
                    quantity: 1 + i as u64,
                    total: (1200 + 100 * i as u64) * (1 + i as u64),
                    hq: i % 3 == 0,
                    world_name: Some("紫水栈桥".to_string()),
                    retainer_name: format!("雇员{i}"),
                    last_review_time: at,
                })
                .collect(),
        }
    }

    fn now() -> chrono::DateTime<Local> {
        Local.with_ymd_and_hms(2023, 11, 5, 12, 0, 0).unwrap()
    }

    fn png_icon() -> Vec<u8> {
        let mut png = Vec::new();
        RgbaImage::from_pixel(40, 40, Rgba([200, 120, 40, 255]))
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .unwrap();
        png
    }

    #[tokio::test]
    async fn renders_without_listings() {
        let pipeline = RenderPipeline::new(
            RenderConfig::default(),
            HeuristicShaper::default(),
            NoIcon,
        );
        let card = pipeline.render(&item(), &sale(0), now()).await.unwrap();
        assert!(!card.png.is_empty());
        assert_eq!(&card.png[..4], b"\x89PNG");
        assert_eq!(card.summary.rows_drawn, 0);
        let decoded = image::load_from_memory(&card.png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (720, 960));
    }

    #[tokio::test]
    async fn icon_failure_keeps_text_origin() {
        let failing = RenderPipeline::new(
            RenderConfig::default(),
            HeuristicShaper::default(),
            Unreachable,
        );
        let working = RenderPipeline::new(
            RenderConfig::default(),
            HeuristicShaper::default(),
            StaticIcon(png_icon()),
        );
        let without = failing.render(&item(), &sale(3), now()).await.unwrap();
        let with = working.render(&item(), &sale(3), now()).await.unwrap();
        assert!(!without.summary.icon_drawn);
        assert!(with.summary.icon_drawn);
        assert_eq!(without.summary.title_origin, with.summary.title_origin);
        assert_eq!(without.summary.subtitle_origin, with.summary.subtitle_origin);
        assert_eq!(without.summary.rows_drawn, 3);
        assert_ne!(without.png, with.png);
    }

    #[tokio::test]
    async fn truncation_is_silent_and_stable() {
        let pipeline = RenderPipeline::new(
            RenderConfig::default(),
            HeuristicShaper::default(),
            NoIcon,
        )
        .with_badge(RgbaImage::from_pixel(16, 16, Rgba([255, 215, 0, 255])));
        let many = sale(50);
        let first = pipeline.render(&item(), &many, now()).await.unwrap();
        let fitted = first.summary.rows_drawn;
        assert!(fitted > 0 && fitted < 50, "{fitted}");

        let second = pipeline.render(&item(), &many, now()).await.unwrap();
        assert_eq!(second.summary.rows_drawn, fitted);
        assert_eq!(second.png, first.png);

        // the same first rows drawn alone produce the same card
        let mut exact = many.clone();
        exact.listings.truncate(fitted);
        let alone = pipeline.render(&item(), &exact, now()).await.unwrap();
        assert_eq!(alone.summary.rows_drawn, fitted);
        assert_eq!(alone.png, first.png);
    }

    #[tokio::test]
    async fn unusable_canvas_is_an_error() {
        let mut config = RenderConfig::default();
        config.canvas.width = 0;
        let pipeline = RenderPipeline::new(config, HeuristicShaper::default(), NoIcon);
        let result = pipeline.render(&item(), &sale(1), now()).await;
        assert!(matches!(result, Err(Error::Surface(0, 960))));
    }

    #[test]
    fn badge_bytes_must_decode() {
        let pipeline = RenderPipeline::new(
            RenderConfig::default(),
            HeuristicShaper::default(),
            NoIcon,
        );
        assert!(pipeline.with_badge_bytes(b"nope").is_err());
    }
}
