//! Vertical flow of the card.
//!
//! Sections run in a fixed order, each starting one gap below the bottom of
//! the one before. The footer is measured and anchored to the bottom margin
//! before listings are drawn, so the listings fill whatever is left between
//! the chart and the footer.

use chrono::{DateTime, Local};
use image::RgbaImage;
use log::debug;

use crate::{
    bars::{available_width, Bar, BarChart},
    config::RenderConfig,
    format::{absolute_time, readable_number, scope_label, timestamp},
    legend::{layout_legend, LegendEntry},
    listing::ListingRowRenderer,
    model::{ItemInfo, SaleInfo},
    surface::{Surface, TextBaseline},
    LayoutBox,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Background,
    Icon,
    Title,
    Subtitle,
    UpdateTimestamp,
    Chart,
    Footer,
    Listings,
}

impl Section {
    pub const FIRST: Section = Section::Background;

    pub fn next(self) -> Option<Section> {
        match self {
            Section::Background => Some(Section::Icon),
            Section::Icon => Some(Section::Title),
            Section::Title => Some(Section::Subtitle),
            Section::Subtitle => Some(Section::UpdateTimestamp),
            Section::UpdateTimestamp => Some(Section::Chart),
            Section::Chart => Some(Section::Footer),
            Section::Footer => Some(Section::Listings),
            Section::Listings => None,
        }
    }
}

/// Everything one card shows.
#[derive(Debug, Clone, Copy)]
pub struct CardContent<'c> {
    pub item: &'c ItemInfo,
    pub sale: &'c SaleInfo,
    /// Decoded item icon, `None` when it could not be loaded
    pub icon: Option<&'c RgbaImage>,
    pub badge: Option<&'c RgbaImage>,
    pub generated_at: DateTime<Local>,
}

/// Where things ended up, for callers that care about geometry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutSummary {
    pub icon_drawn: bool,
    pub title_origin: (f32, f32),
    pub subtitle_origin: (f32, f32),
    pub header_bottom: f32,
    pub update_top: f32,
    pub chart_top: f32,
    pub legend: LayoutBox,
    pub chart: LayoutBox,
    pub footer_top: f32,
    pub listings_top: f32,
    pub row_height: f32,
    pub rows_drawn: usize,
    pub visited: Vec<Section>,
}

pub struct LayoutEngine<'s, 'a, 'c> {
    surface: &'s mut Surface<'a>,
    config: &'c RenderConfig,
    content: CardContent<'c>,
    cursor: f32,
    title_height: f32,
    subtitle_height: f32,
    summary: LayoutSummary,
}

impl<'s, 'a, 'c> LayoutEngine<'s, 'a, 'c> {
    pub fn new(
        surface: &'s mut Surface<'a>,
        config: &'c RenderConfig,
        content: CardContent<'c>,
    ) -> Self {
        Self {
            surface,
            config,
            content,
            cursor: config.canvas.margins.top,
            title_height: 0.0,
            subtitle_height: 0.0,
            summary: LayoutSummary::default(),
        }
    }

    /// Runs every section once, in order.
    pub fn run(mut self) -> LayoutSummary {
        let mut section = Some(Section::FIRST);
        while let Some(current) = section {
            self.step(current);
            self.summary.visited.push(current);
            section = current.next();
        }
        self.summary
    }

    fn step(&mut self, section: Section) {
        match section {
            Section::Background => self.background(),
            Section::Icon => self.icon(),
            Section::Title => self.title(),
            Section::Subtitle => self.subtitle(),
            Section::UpdateTimestamp => self.update_timestamp(),
            Section::Chart => self.chart(),
            Section::Footer => self.footer(),
            Section::Listings => self.listings(),
        }
        debug!("{section:?} done, cursor at {}", self.cursor);
    }

    fn left(&self) -> f32 {
        self.config.canvas.margins.left
    }

    fn background(&mut self) {
        let canvas = &self.config.canvas;
        let (width, height) = (canvas.width as f32, canvas.height as f32);
        let mut scope = self.surface.scoped();
        scope.set_fill(self.config.palette.background_gradient(height));
        scope.fill_rect(0.0, 0.0, width, height);
    }

    fn icon(&mut self) {
        let side = self.config.canvas.icon_side;
        let (left, top) = (self.left(), self.cursor);
        if let Some(icon) = self.content.icon {
            self.surface.draw_image(icon, left, top, side, side);
            self.summary.icon_drawn = true;
        }
    }

    /// Title and subtitle sit to the right of the icon footprint whether or
    /// not an icon was drawn.
    fn text_left(&self) -> f32 {
        self.left() + self.config.canvas.icon_side + self.config.canvas.gap
    }

    fn title(&mut self) {
        let RenderConfig { fonts, palette, .. } = self.config;
        let origin = (self.text_left(), self.cursor);
        let mut scope = self.surface.scoped();
        scope
            .set_font(fonts.text(fonts.sizes.title))
            .set_fill(palette.rarity_color(self.content.item.rarity))
            .set_baseline(TextBaseline::Top);
        let name = &self.content.item.name;
        self.title_height = scope.measure_text(name).height;
        scope.fill_text(name, origin.0, origin.1);
        self.summary.title_origin = origin;
    }

    fn subtitle(&mut self) {
        let RenderConfig {
            canvas,
            fonts,
            palette,
            labels,
        } = self.config;
        let item = self.content.item;
        let text = format!(
            "{} | {} | {}{}",
            item.kind, item.search_category, labels.item_level, item.item_level
        );
        let origin = (self.text_left(), self.cursor + self.title_height + canvas.gap);
        let mut scope = self.surface.scoped();
        scope
            .set_font(fonts.text(fonts.sizes.subtitle))
            .set_fill(palette.subtitle)
            .set_baseline(TextBaseline::Top);
        self.subtitle_height = scope.measure_text(&text).height;
        scope.fill_text(&text, origin.0, origin.1);
        drop(scope);

        let text_height = self.title_height + canvas.gap + self.subtitle_height;
        self.summary.subtitle_origin = origin;
        self.summary.header_bottom = self.cursor + canvas.icon_side.max(text_height);
        self.cursor = self.summary.header_bottom + canvas.gap;
    }

    fn update_timestamp(&mut self) {
        let RenderConfig {
            canvas,
            fonts,
            palette,
            labels,
        } = self.config;
        let sale = self.content.sale;
        let text = format!(
            "{} | {}{}",
            scope_label(&sale.scope, labels),
            labels.last_update,
            timestamp(
                sale.last_upload_time,
                self.content.generated_at,
                &labels.relative_time
            )
        );
        let top = self.cursor;
        let left = self.left();
        let mut scope = self.surface.scoped();
        scope
            .set_font(fonts.text(fonts.sizes.update))
            .set_fill(palette.update)
            .set_baseline(TextBaseline::Top);
        let height = scope.measure_text(&text).height;
        scope.fill_text(&text, left, top);
        drop(scope);

        self.summary.update_top = top;
        self.cursor = top + height + canvas.gap;
    }

    fn bar_chart(&self) -> BarChart {
        let RenderConfig {
            canvas,
            palette,
            labels,
            ..
        } = self.config;
        let stats = &self.content.sale.stats;
        let can_be_hq = self.content.item.can_be_hq;
        let nq = |magnitude: u64| Bar {
            magnitude,
            color: palette.bar_nq,
            label: readable_number(magnitude),
        };
        let hq = |magnitude: u64| {
            if can_be_hq {
                Bar {
                    magnitude,
                    color: palette.bar_hq,
                    label: readable_number(magnitude),
                }
            } else {
                Bar {
                    magnitude: 0,
                    color: palette.bar_hq,
                    label: labels.no_high_quality.clone(),
                }
            }
        };
        BarChart {
            bars: vec![
                nq(stats.min_nq),
                hq(stats.min_hq),
                nq(stats.max_nq),
                hq(stats.max_hq),
            ],
            bar_height: canvas.bar_height,
            gap: canvas.gap,
            group: 2,
        }
    }

    fn chart(&mut self) {
        let RenderConfig {
            canvas,
            fonts,
            palette,
            labels,
        } = self.config;
        let top = self.cursor;
        let left = self.left();
        let entries = [
            LegendEntry::new(palette.bar_nq, labels.normal_quality.clone()),
            LegendEntry::new(palette.bar_hq, labels.high_quality.clone()),
        ];
        let legend = {
            let mut scope = self.surface.scoped();
            scope
                .set_font(fonts.text(fonts.sizes.legend))
                .set_fill(palette.legend_text)
                .set_baseline(TextBaseline::Top);
            layout_legend(
                &mut scope,
                &entries,
                (left, top),
                canvas.legend_swatch,
                canvas.gap,
            )
        };

        let chart = self.bar_chart();
        let mut scope = self.surface.scoped();
        scope
            .set_font(fonts.numeric(fonts.sizes.bar_label))
            .set_fill(palette.bar_label);
        let widest = chart.widest_label(&scope);
        let available = available_width(canvas.content_width(), legend.width, widest, canvas.gap);
        let bars_left = left + legend.width + canvas.gap;
        let bars = chart.draw(&mut scope, (bars_left, top), chart.scale_max(), available);
        drop(scope);

        let height = legend.height.max(bars.height);
        self.summary.chart_top = top;
        self.summary.legend = legend;
        self.summary.chart = LayoutBox::new(legend.width + canvas.gap + bars.width, height);
        self.cursor = top + height + canvas.gap;
    }

    fn footer_text(&self) -> String {
        let labels = &self.config.labels;
        format!(
            "{}{}{}",
            labels.generated_at,
            absolute_time(self.content.generated_at),
            labels.disclaimer
        )
    }

    fn footer(&mut self) {
        let RenderConfig {
            canvas,
            fonts,
            palette,
            ..
        } = self.config;
        let text = self.footer_text();
        let left = self.left();
        let mut scope = self.surface.scoped();
        scope
            .set_font(fonts.text(fonts.sizes.footer))
            .set_fill(palette.footer)
            .set_baseline(TextBaseline::Top);
        let height = scope.measure_text(&text).height;
        let top = canvas.height as f32 - canvas.margins.bottom - height;
        scope.fill_text(&text, left, top);
        drop(scope);

        self.summary.footer_top = top;
    }

    fn listings(&mut self) {
        let config = self.config;
        let canvas = &config.canvas;
        let rows = ListingRowRenderer::new(
            self.surface,
            config,
            self.content.badge,
            self.content.generated_at,
        );
        let (left, top) = (self.left(), self.cursor);
        let limit = self.summary.footer_top - canvas.gap;
        let drawn = rows.draw_rows(
            self.surface,
            &self.content.sale.listings,
            left,
            top,
            canvas.content_width(),
            limit,
        );
        self.summary.listings_top = top;
        self.summary.row_height = rows.row_height();
        self.summary.rows_drawn = drawn;
    }
}
