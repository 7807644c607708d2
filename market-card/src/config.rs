//! Everything the renderer would otherwise hard code: canvas geometry, gaps,
//! font families and sizes, palette and the fixed label text.
//!
//! Every struct deserializes with `#[serde(default)]`, so a theme file only has
//! to name the values it changes.

use serde::{Deserialize, Serialize};

use crate::{
    color::{Color, GradientDirection, GradientStop, LinearGradient},
    model::Rarity,
    text::FontSpec,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    pub canvas: CanvasConfig,
    pub fonts: FontConfig,
    pub palette: Palette,
    pub labels: Labels,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
    pub left: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 16.0,
            right: 16.0,
            bottom: 16.0,
            left: 16.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: u32,
    pub height: u32,
    pub margins: Margins,
    /// Space between sections and between most spans
    pub gap: f32,
    /// Footprint reserved for the item icon, drawn or not
    pub icon_side: f32,
    pub legend_swatch: f32,
    pub bar_height: f32,
    /// Inner top and bottom padding of a listing row
    pub row_padding: f32,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 720,
            height: 960,
            margins: Margins::default(),
            gap: 8.0,
            icon_side: 64.0,
            legend_swatch: 16.0,
            bar_height: 12.0,
            row_padding: 8.0,
        }
    }
}

impl CanvasConfig {
    pub fn content_width(&self) -> f32 {
        (self.width as f32 - self.margins.left - self.margins.right).max(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSizes {
    pub title: f32,
    pub subtitle: f32,
    pub update: f32,
    pub legend: f32,
    pub bar_label: f32,
    pub price: f32,
    pub listing: f32,
    pub listing_meta: f32,
    pub footer: f32,
}

impl Default for FontSizes {
    fn default() -> Self {
        Self {
            title: 28.0,
            subtitle: 18.0,
            update: 14.0,
            legend: 12.0,
            bar_label: 9.0,
            price: 26.0,
            listing: 18.0,
            listing_meta: 12.0,
            footer: 10.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontConfig {
    pub cjk_family: String,
    pub latin_family: String,
    pub generic_family: String,
    pub sizes: FontSizes,
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            cjk_family: "WenquanyiZhengHei".to_string(),
            latin_family: "Georgia".to_string(),
            generic_family: "sans-serif".to_string(),
            sizes: FontSizes::default(),
        }
    }
}

impl FontConfig {
    /// `CJK, Latin, generic` chain used for most text.
    pub fn text(&self, size: f32) -> FontSpec {
        FontSpec::new(
            size,
            [&self.cjk_family, &self.latin_family, &self.generic_family],
        )
    }

    /// `Latin, CJK, generic` chain used where digits dominate.
    pub fn numeric(&self, size: f32) -> FontSpec {
        FontSpec::new(
            size,
            [&self.latin_family, &self.cjk_family, &self.generic_family],
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BackgroundStop {
    /// Position along the canvas height, `0.0..=1.0`
    pub offset: f32,
    pub color: Color,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub background: Vec<BackgroundStop>,
    /// Item name color per rarity, index 0 is rarity 1
    pub rarity: [Color; 7],
    pub subtitle: Color,
    pub update: Color,
    pub legend_text: Color,
    pub bar_nq: Color,
    pub bar_hq: Color,
    pub bar_label: Color,
    pub footer: Color,
    pub row_nq: Color,
    pub row_hq: Color,
    pub row_fade: Color,
    pub price: Color,
    pub unit: Color,
    pub listing_text: Color,
    pub listing_meta: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: vec![
                BackgroundStop {
                    offset: 0.0,
                    color: Color::rgb(255, 255, 255),
                },
                BackgroundStop {
                    offset: 0.005,
                    color: Color::rgb(105, 105, 105),
                },
                BackgroundStop {
                    offset: 0.015,
                    color: Color::rgb(75, 75, 75),
                },
                BackgroundStop {
                    offset: 1.0,
                    color: Color::rgb(27, 27, 27),
                },
            ],
            rarity: [
                Color::rgb(255, 255, 255),
                Color::rgb(192, 255, 192),
                Color::rgb(89, 144, 255),
                Color::rgb(179, 140, 255),
                Color::rgb(255, 255, 255),
                Color::rgb(255, 255, 255),
                Color::rgb(250, 137, 182),
            ],
            subtitle: Color::rgb(120, 120, 120),
            update: Color::rgb(220, 220, 220),
            legend_text: Color::rgb(255, 255, 255),
            bar_nq: Color::rgb(210, 210, 210),
            bar_hq: Color::rgb(221, 201, 70),
            bar_label: Color::rgb(255, 255, 255),
            footer: Color::rgb(160, 160, 160),
            row_nq: Color::rgba(64, 64, 64, 255),
            row_hq: Color::rgba(152, 152, 64, 255),
            row_fade: Color::TRANSPARENT,
            price: Color::rgb(255, 255, 255),
            unit: Color::rgb(220, 220, 220),
            listing_text: Color::rgb(255, 255, 255),
            listing_meta: Color::rgb(200, 200, 200),
        }
    }
}

impl Palette {
    pub fn rarity_color(&self, rarity: Rarity) -> Color {
        self.rarity[rarity.index()]
    }

    pub fn background_gradient(&self, height: f32) -> LinearGradient {
        LinearGradient {
            direction: GradientDirection::Vertical,
            start: 0.0,
            end: height,
            stops: self
                .background
                .iter()
                .map(|stop| GradientStop {
                    offset: stop.offset,
                    color: stop.color,
                })
                .collect(),
        }
    }

    pub fn row_gradient(&self, hq: bool, left: f32, right: f32) -> LinearGradient {
        let start = if hq { self.row_hq } else { self.row_nq };
        LinearGradient::two_stop(
            GradientDirection::Horizontal,
            left,
            right,
            start,
            self.row_fade,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RelativeTimeLabels {
    pub just_now: String,
    pub seconds: String,
    pub minutes: String,
    pub hours: String,
    pub days: String,
}

impl Default for RelativeTimeLabels {
    fn default() -> Self {
        Self {
            just_now: "刚刚".to_string(),
            seconds: "秒前".to_string(),
            minutes: "分钟前".to_string(),
            hours: "小时前".to_string(),
            days: "天前".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    pub item_level: String,
    pub datacenter_suffix: String,
    pub unknown_scope: String,
    pub last_update: String,
    pub normal_quality: String,
    pub high_quality: String,
    pub no_high_quality: String,
    pub price_unit: String,
    pub quantity_suffix: String,
    pub total_prefix: String,
    pub total_suffix: String,
    pub reviewed: String,
    /// Sample used to measure listing line heights
    pub measure_sample: String,
    pub generated_at: String,
    pub disclaimer: String,
    pub relative_time: RelativeTimeLabels,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            item_level: "品级".to_string(),
            datacenter_suffix: "区".to_string(),
            unknown_scope: "未知".to_string(),
            last_update: "最后更新于".to_string(),
            normal_quality: "普通".to_string(),
            high_quality: "高品质".to_string(),
            no_high_quality: "无HQ版本".to_string(),
            price_unit: "Gil/个".to_string(),
            quantity_suffix: "个".to_string(),
            total_prefix: "共计".to_string(),
            total_suffix: "Gil".to_string(),
            reviewed: "信息上传于".to_string(),
            measure_sample: "测试".to_string(),
            generated_at: "图片生成于".to_string(),
            disclaimer: "，物品数据来源于cafemaker，价格数据来源于universalis，\n\
                本插件作者（或开发团体）与cafemaker、universalis和《最终幻想14》的开发与发行公司无任何直接联系。\n\
                作者（或开发团体）不对您使用本功能带来的一切可能的后果承担任何责任。"
                .to_string(),
            relative_time: RelativeTimeLabels::default(),
        }
    }
}
