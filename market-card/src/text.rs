//! Text measurement.
//!
//! Layout only ever asks for `(width, height)` of a run of text. Width comes
//! straight from the shaper. Height goes through an ordered list of strategies
//! because shapers do not reliably report line metrics; the last resort is the
//! pixel size written in the font descriptor, so [`TextMetrics::measure`] always
//! produces a usable, positive height.

use std::{fmt::Display, str::FromStr};

use itertools::Itertools;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Used when a descriptor carries no parsable pixel size.
pub const DEFAULT_FONT_SIZE: f32 = 12.0;

static FONT_SIZE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:\.\d+)?)px").expect("font size pattern is valid"));

/// Pulls the pixel size out of a css like descriptor, `"18px Georgia"` -> 18.
pub fn font_size_from_descriptor(descriptor: &str) -> f32 {
    FONT_SIZE_PATTERN
        .captures(descriptor)
        .and_then(|captures| captures.get(1))
        .and_then(|size| size.as_str().parse::<f32>().ok())
        .filter(|size| size.is_finite() && *size > 0.0)
        .unwrap_or(DEFAULT_FONT_SIZE)
}

/// A pixel size plus an ordered family fallback chain.
#[derive(Debug, Clone, PartialEq)]
pub struct FontSpec {
    pub size: f32,
    pub families: Vec<String>,
}

impl FontSpec {
    pub fn new<S: Into<String>>(size: f32, families: impl IntoIterator<Item = S>) -> Self {
        Self {
            size,
            families: families.into_iter().map(Into::into).collect(),
        }
    }

    /// css font shorthand, `18px WenquanyiZhengHei, Georgia, sans-serif`
    pub fn descriptor(&self) -> String {
        self.to_string()
    }
}

impl Display for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}px {}", self.size, self.families.iter().join(", "))
    }
}

impl FromStr for FontSpec {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let size = font_size_from_descriptor(s);
        let families = FONT_SIZE_PATTERN
            .find(s)
            .map(|m| &s[m.end()..])
            .unwrap_or(s)
            .split(',')
            .map(|family| family.trim().trim_matches(|c| c == '"' || c == '\''))
            .filter(|family| !family.is_empty())
            .map(str::to_string)
            .collect();
        Ok(Self { size, families })
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ShapeError {
    #[error("no registered font matches {0:?}")]
    NoFont(String),
    #[error("shaping failed: {0}")]
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LineMetrics {
    pub width: f32,
    pub height: f32,
}

/// Raw output of a shaper. Any of the height related fields may be missing or
/// nonsense depending on the backend.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextMeasurement {
    pub width: f32,
    pub lines: Vec<LineMetrics>,
    pub height: Option<f32>,
    /// Distance from the baseline up to the top of the line box
    pub ascent: f32,
    /// Distance from the baseline down to the bottom of the line box
    pub descent: f32,
}

/// Backend that turns text into metrics and glyph coverage.
pub trait TextShaper {
    fn shape(&self, text: &str, font: &FontSpec) -> Result<TextMeasurement, ShapeError>;

    /// Rasterizes one line of text. `plot` receives pixel offsets relative to
    /// the pen position on the baseline and a coverage in `0.0..=1.0`.
    fn rasterize(
        &self,
        line: &str,
        font: &FontSpec,
        plot: &mut dyn FnMut(i32, i32, f32),
    ) -> Result<(), ShapeError>;
}

impl<T: TextShaper + ?Sized> TextShaper for &T {
    fn shape(&self, text: &str, font: &FontSpec) -> Result<TextMeasurement, ShapeError> {
        (**self).shape(text, font)
    }

    fn rasterize(
        &self,
        line: &str,
        font: &FontSpec,
        plot: &mut dyn FnMut(i32, i32, f32),
    ) -> Result<(), ShapeError> {
        (**self).rasterize(line, font, plot)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextSize {
    pub width: f32,
    pub height: f32,
}

type HeightStrategy = fn(&TextMeasurement) -> Option<f32>;

fn positive(value: f32) -> Option<f32> {
    (value.is_finite() && value > 0.0).then_some(value)
}

fn height_from_lines(measurement: &TextMeasurement) -> Option<f32> {
    if measurement.lines.is_empty() {
        return None;
    }
    measurement
        .lines
        .iter()
        .map(|line| positive(line.height))
        .sum::<Option<f32>>()
        .and_then(positive)
}

fn height_from_field(measurement: &TextMeasurement) -> Option<f32> {
    measurement.height.and_then(positive)
}

/// Tried in order, first positive answer wins.
const HEIGHT_STRATEGIES: [(&str, HeightStrategy); 2] = [
    ("line breakdown", height_from_lines),
    ("height field", height_from_field),
];

/// Resolves the height of a measurement, falling back to the descriptor size.
pub fn resolve_height(measurement: Option<&TextMeasurement>, font: &FontSpec) -> f32 {
    let resolved = measurement.and_then(|measurement| {
        HEIGHT_STRATEGIES.iter().find_map(|(name, strategy)| {
            let height = strategy(measurement)?;
            debug!("text height {height} from {name}");
            Some(height)
        })
    });
    resolved.unwrap_or_else(|| {
        let descriptor = font.descriptor();
        let height = font_size_from_descriptor(&descriptor);
        debug!("text height {height} from font descriptor {descriptor:?}");
        height
    })
}

/// Measures text through a shaper without ever failing.
#[derive(Clone, Copy)]
pub struct TextMetrics<'s> {
    shaper: &'s dyn TextShaper,
}

impl<'s> TextMetrics<'s> {
    pub fn new(shaper: &'s dyn TextShaper) -> Self {
        Self { shaper }
    }

    pub fn measure(&self, text: &str, font: &FontSpec) -> TextSize {
        match self.shaper.shape(text, font) {
            Ok(measurement) => TextSize {
                width: positive(measurement.width).unwrap_or(0.0),
                height: resolve_height(Some(&measurement), font),
            },
            Err(e) => {
                warn!("measuring {text:?} with {font} failed: {e}");
                TextSize {
                    width: 0.0,
                    height: resolve_height(None, font),
                }
            }
        }
    }
}

/// Font-free shaper with fixed advances, 0.6em for narrow glyphs and 1em for
/// wide (CJK) glyphs. Glyphs are drawn as solid blocks.
#[derive(Debug, Clone, Copy)]
pub struct HeuristicShaper {
    /// Line height as a multiple of the font size
    pub line_height: f32,
}

impl Default for HeuristicShaper {
    fn default() -> Self {
        Self { line_height: 1.2 }
    }
}

impl HeuristicShaper {
    fn advance(c: char, size: f32) -> f32 {
        if c as u32 >= 0x2E80 {
            size
        } else {
            size * 0.6
        }
    }

    fn line_width(line: &str, size: f32) -> f32 {
        line.chars().map(|c| Self::advance(c, size)).sum()
    }
}

impl TextShaper for HeuristicShaper {
    fn shape(&self, text: &str, font: &FontSpec) -> Result<TextMeasurement, ShapeError> {
        let line_height = font.size * self.line_height;
        let lines: Vec<_> = text
            .split('\n')
            .map(|line| LineMetrics {
                width: Self::line_width(line, font.size),
                height: line_height,
            })
            .collect();
        Ok(TextMeasurement {
            width: lines.iter().map(|l| l.width).fold(0.0, f32::max),
            height: Some(line_height * lines.len() as f32),
            lines,
            ascent: line_height * 0.8,
            descent: line_height * 0.2,
        })
    }

    fn rasterize(
        &self,
        line: &str,
        font: &FontSpec,
        plot: &mut dyn FnMut(i32, i32, f32),
    ) -> Result<(), ShapeError> {
        let mut caret: f32 = 0.0;
        let block_height = (font.size * 0.7).round() as i32;
        for c in line.chars() {
            let advance = Self::advance(c, font.size);
            if !c.is_whitespace() {
                let block_width = (advance * 0.8).round() as i32;
                let left = caret.round() as i32;
                for y in -block_height..0 {
                    for x in left..left + block_width {
                        plot(x, y, 1.0);
                    }
                }
            }
            caret += advance;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// Shaper that reports a fixed width and whatever height data it was given
    struct CannedShaper(Result<TextMeasurement, ShapeError>);

    impl TextShaper for CannedShaper {
        fn shape(&self, _text: &str, _font: &FontSpec) -> Result<TextMeasurement, ShapeError> {
            self.0.clone()
        }

        fn rasterize(
            &self,
            _line: &str,
            _font: &FontSpec,
            _plot: &mut dyn FnMut(i32, i32, f32),
        ) -> Result<(), ShapeError> {
            Ok(())
        }
    }

    fn font(descriptor: &str) -> FontSpec {
        descriptor.parse().unwrap()
    }

    #[test]
    fn descriptor_sizes() {
        assert_eq!(font_size_from_descriptor("18px X"), 18.0);
        assert_eq!(font_size_from_descriptor("bold 26px Georgia, serif"), 26.0);
        assert_eq!(font_size_from_descriptor("9.5px Georgia"), 9.5);
        assert_eq!(font_size_from_descriptor("Georgia"), DEFAULT_FONT_SIZE);
        assert_eq!(font_size_from_descriptor("0px Georgia"), DEFAULT_FONT_SIZE);
        assert_eq!(font_size_from_descriptor("18 px X"), DEFAULT_FONT_SIZE);
    }

    #[test]
    fn font_spec_parses_family_chain() {
        let spec = font("18px WenquanyiZhengHei, 'Georgia', sans-serif");
        assert_eq!(spec.size, 18.0);
        assert_eq!(
            spec.families,
            vec!["WenquanyiZhengHei", "Georgia", "sans-serif"]
        );
        assert_eq!(
            spec.descriptor(),
            "18px WenquanyiZhengHei, Georgia, sans-serif"
        );
    }

    #[test]
    fn line_breakdown_wins() {
        let shaper = CannedShaper(Ok(TextMeasurement {
            width: 40.0,
            lines: vec![
                LineMetrics {
                    width: 40.0,
                    height: 10.0,
                },
                LineMetrics {
                    width: 20.0,
                    height: 11.0,
                },
            ],
            height: Some(99.0),
            ..Default::default()
        }));
        let size = TextMetrics::new(&shaper).measure("a\nb", &font("18px X"));
        assert_eq!(size.width, 40.0);
        assert_eq!(size.height, 21.0);
    }

    #[test]
    fn height_field_used_when_lines_missing() {
        let shaper = CannedShaper(Ok(TextMeasurement {
            width: 12.0,
            height: Some(15.0),
            ..Default::default()
        }));
        let size = TextMetrics::new(&shaper).measure("a", &font("18px X"));
        assert_eq!(size.height, 15.0);
    }

    #[test]
    fn broken_metrics_fall_back_to_descriptor() {
        let broken = [
            TextMeasurement {
                width: 30.0,
                ..Default::default()
            },
            TextMeasurement {
                width: 30.0,
                lines: vec![LineMetrics {
                    width: 30.0,
                    height: 0.0,
                }],
                height: Some(0.0),
                ..Default::default()
            },
            TextMeasurement {
                width: 30.0,
                lines: vec![
                    LineMetrics {
                        width: 30.0,
                        height: 14.0,
                    },
                    LineMetrics {
                        width: 30.0,
                        height: f32::NAN,
                    },
                ],
                height: Some(-3.0),
                ..Default::default()
            },
        ];
        for measurement in broken {
            let shaper = CannedShaper(Ok(measurement));
            let size = TextMetrics::new(&shaper).measure("anything", &font("18px X"));
            assert_eq!(size.width, 30.0);
            assert_eq!(size.height, 18.0);
        }
    }

    #[test]
    fn shaping_errors_are_absorbed() {
        let shaper = CannedShaper(Err(ShapeError::NoFont("X".to_string())));
        let size = TextMetrics::new(&shaper).measure("anything", &font("18px X"));
        assert_eq!(size.width, 0.0);
        assert_eq!(size.height, 18.0);

        let size = TextMetrics::new(&shaper).measure("anything", &font("X"));
        assert_eq!(size.height, DEFAULT_FONT_SIZE);
    }

    #[test]
    fn heuristic_shaper_measures_wide_glyphs() {
        let shaper = HeuristicShaper::default();
        let metrics = TextMetrics::new(&shaper);
        let close = |a: f32, b: f32| (a - b).abs() < 1e-3;
        let latin = metrics.measure("BB", &font("10px X"));
        assert!(close(latin.width, 12.0), "{latin:?}");
        assert!(close(latin.height, 12.0), "{latin:?}");
        let cjk = metrics.measure("测试", &font("10px X"));
        assert!(close(cjk.width, 20.0), "{cjk:?}");
        let two_lines = metrics.measure("a\nbb", &font("10px X"));
        assert!(close(two_lines.width, 12.0), "{two_lines:?}");
        assert!(close(two_lines.height, 24.0), "{two_lines:?}");
    }
}
