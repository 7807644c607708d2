use chrono::{DateTime, Local};
use image::RgbaImage;
use log::debug;

use crate::{
    config::RenderConfig,
    format::{readable_number, timestamp},
    model::Listing,
    surface::{Surface, TextBaseline},
};

/// How many rows of `row_height` fit between `top` and `limit` when each row
/// is followed by `gap`. A row fits when its bottom does not pass `limit`.
pub fn rows_that_fit(count: usize, top: f32, row_height: f32, gap: f32, limit: f32) -> usize {
    if row_height <= 0.0 {
        return 0;
    }
    let mut fitted = 0;
    let mut cursor = top;
    while fitted < count && cursor + row_height <= limit {
        fitted += 1;
        cursor += row_height + gap;
    }
    fitted
}

/// Draws listing rows of one fixed height.
///
/// The height is measured once from a sample string at the price and meta
/// fonts, so every row is the same size whatever it displays.
pub struct ListingRowRenderer<'c> {
    config: &'c RenderConfig,
    badge: Option<&'c RgbaImage>,
    now: DateTime<Local>,
    price_line: f32,
    meta_line: f32,
}

impl<'c> ListingRowRenderer<'c> {
    pub fn new(
        surface: &Surface<'_>,
        config: &'c RenderConfig,
        badge: Option<&'c RgbaImage>,
        now: DateTime<Local>,
    ) -> Self {
        let fonts = &config.fonts;
        let sample = &config.labels.measure_sample;
        let metrics = surface.metrics();
        let price_line = metrics.measure(sample, &fonts.numeric(fonts.sizes.price)).height;
        let meta_line = metrics.measure(sample, &fonts.text(fonts.sizes.listing_meta)).height;
        debug!("listing lines {price_line} / {meta_line}");
        Self {
            config,
            badge,
            now,
            price_line,
            meta_line,
        }
    }

    pub fn row_height(&self) -> f32 {
        let canvas = &self.config.canvas;
        self.price_line + canvas.gap + self.meta_line + canvas.row_padding * 2.0
    }

    fn meta_text(&self, listing: &Listing) -> String {
        let labels = &self.config.labels;
        format!(
            "{} | {} | {}{}",
            listing.world_name.as_deref().unwrap_or_default(),
            listing.retainer_name,
            labels.reviewed,
            timestamp(listing.last_review_time, self.now, &labels.relative_time)
        )
    }

    /// Draws one row with its top left corner at `(left, top)` and returns the
    /// row height. Spans that overrun `width` are clipped by the surface.
    pub fn draw_row(
        &self,
        surface: &mut Surface<'_>,
        listing: &Listing,
        left: f32,
        top: f32,
        width: f32,
    ) -> f32 {
        let RenderConfig {
            canvas,
            fonts,
            palette,
            labels,
        } = self.config;
        let row_height = self.row_height();
        {
            let mut scope = surface.scoped();
            scope.set_fill(palette.row_gradient(listing.hq, left, left + width));
            scope.fill_rect(left, top, width, row_height);
        }

        let mut scope = surface.scoped();
        scope.set_baseline(TextBaseline::Bottom);
        let price_bottom = top + canvas.row_padding + self.price_line;
        let mut x = left + canvas.row_padding;

        scope
            .set_font(fonts.numeric(fonts.sizes.price))
            .set_fill(palette.price);
        x += scope.fill_text(&readable_number(listing.price_per_unit), x, price_bottom);
        x += canvas.gap / 2.0;

        scope
            .set_font(fonts.text(fonts.sizes.listing))
            .set_fill(palette.unit);
        x += scope.fill_text(&labels.price_unit, x, price_bottom);

        if listing.hq {
            if let Some(badge) = self.badge {
                let side = self.price_line;
                scope.draw_image(badge, x, price_bottom - side, side, side);
            }
            x += self.price_line;
        }
        x += canvas.gap;

        scope.set_fill(palette.listing_text);
        let quantity = format!(
            "{}{}",
            readable_number(listing.quantity),
            labels.quantity_suffix
        );
        x += scope.fill_text(&quantity, x, price_bottom);
        x += canvas.gap;

        let total = format!(
            "{}{}{}",
            labels.total_prefix,
            readable_number(listing.total),
            labels.total_suffix
        );
        scope.fill_text(&total, x, price_bottom);

        let meta_bottom = price_bottom + canvas.gap + self.meta_line;
        scope
            .set_font(fonts.text(fonts.sizes.listing_meta))
            .set_fill(palette.listing_meta);
        scope.fill_text(
            &self.meta_text(listing),
            left + canvas.row_padding,
            meta_bottom,
        );
        row_height
    }

    /// Draws rows in input order from `top` until the next one would pass
    /// `limit`. The rest are dropped without any marker. Returns how many rows
    /// were drawn.
    pub fn draw_rows(
        &self,
        surface: &mut Surface<'_>,
        listings: &[Listing],
        left: f32,
        top: f32,
        width: f32,
        limit: f32,
    ) -> usize {
        let gap = self.config.canvas.gap;
        let row_height = self.row_height();
        let count = rows_that_fit(listings.len(), top, row_height, gap, limit);
        let mut cursor = top;
        for listing in &listings[..count] {
            cursor += self.draw_row(surface, listing, left, cursor, width) + gap;
        }
        if count < listings.len() {
            debug!("{} of {} listings fit", count, listings.len());
        }
        count
    }
}
