//! Raster drawing surface.
//!
//! A [`Surface`] owns its pixmap for the duration of one render and is
//! consumed by [`Surface::encode_png`]. Drawing state (fill, font, baseline)
//! lives in a [`Style`] value. Code that needs a different style for a while
//! takes a [`StyleScope`] through [`Surface::scoped`]; the previous style comes
//! back when the scope is dropped.

use std::ops::{Deref, DerefMut};

use image::{imageops::FilterType, RgbaImage};
use log::warn;
use tiny_skia::{
    IntSize, Paint, Pixmap, PixmapPaint, Point, PremultipliedColorU8, Rect, Shader, SpreadMode,
    Transform,
};

use crate::{
    color::{Color, Fill, GradientDirection, LinearGradient},
    text::{
        resolve_height, FontSpec, TextMeasurement, TextMetrics, TextShaper, TextSize,
        DEFAULT_FONT_SIZE,
    },
    Error,
};

/// Where the `y` passed to [`Surface::fill_text`] sits relative to the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TextBaseline {
    /// Top of the line box
    #[default]
    Top,
    Middle,
    /// Bottom of the line box
    Bottom,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub fill: Fill,
    pub font: FontSpec,
    pub baseline: TextBaseline,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fill: Fill::Solid(Color::rgb(0, 0, 0)),
            font: FontSpec::new(DEFAULT_FONT_SIZE, ["sans-serif"]),
            baseline: TextBaseline::Top,
        }
    }
}

pub struct Surface<'a> {
    pixmap: Pixmap,
    style: Style,
    shaper: &'a dyn TextShaper,
}

impl<'a> Surface<'a> {
    pub fn new(width: u32, height: u32, shaper: &'a dyn TextShaper) -> Result<Self, Error> {
        let pixmap = Pixmap::new(width, height).ok_or(Error::Surface(width, height))?;
        Ok(Self {
            pixmap,
            style: Style::default(),
            shaper,
        })
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn metrics(&self) -> TextMetrics<'a> {
        TextMetrics::new(self.shaper)
    }

    /// Saves the current style. Everything set through the returned scope is
    /// undone when it goes out of scope.
    pub fn scoped(&mut self) -> StyleScope<'_, 'a> {
        let saved = self.style.clone();
        StyleScope {
            surface: self,
            saved: Some(saved),
        }
    }

    pub fn set_fill(&mut self, fill: impl Into<Fill>) -> &mut Self {
        self.style.fill = fill.into();
        self
    }

    pub fn set_font(&mut self, font: FontSpec) -> &mut Self {
        self.style.font = font;
        self
    }

    pub fn set_baseline(&mut self, baseline: TextBaseline) -> &mut Self {
        self.style.baseline = baseline;
        self
    }

    pub fn measure_text(&self, text: &str) -> TextSize {
        self.metrics().measure(text, &self.style.font)
    }

    fn shader(fill: &Fill) -> Shader<'static> {
        match fill {
            Fill::Solid(color) => Shader::SolidColor(color.to_skia()),
            Fill::Linear(gradient) => {
                Self::gradient_shader(gradient).unwrap_or_else(|| {
                    Shader::SolidColor(fill.primary_color().to_skia())
                })
            }
        }
    }

    fn gradient_shader(gradient: &LinearGradient) -> Option<Shader<'static>> {
        let (start, end) = match gradient.direction {
            GradientDirection::Vertical => (
                Point::from_xy(0.0, gradient.start),
                Point::from_xy(0.0, gradient.end),
            ),
            GradientDirection::Horizontal => (
                Point::from_xy(gradient.start, 0.0),
                Point::from_xy(gradient.end, 0.0),
            ),
        };
        let stops = gradient
            .stops
            .iter()
            .map(|stop| tiny_skia::GradientStop::new(stop.offset, stop.color.to_skia()))
            .collect();
        tiny_skia::LinearGradient::new(start, end, stops, SpreadMode::Pad, Transform::identity())
    }

    /// Fills a rectangle with the current fill. Empty or inverted rectangles
    /// draw nothing.
    pub fn fill_rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if !(width > 0.0 && height > 0.0) {
            return;
        }
        let Some(rect) = Rect::from_xywh(x, y, width, height) else {
            return;
        };
        let paint = Paint {
            shader: Self::shader(&self.style.fill),
            anti_alias: false,
            ..Paint::default()
        };
        self.pixmap
            .fill_rect(rect, &paint, Transform::identity(), None);
    }

    /// Draws text at `(x, y)` with the current font, fill and baseline. Lines
    /// split on `\n` and stack downwards. Returns the width of the widest line.
    ///
    /// Text that runs off the surface is clipped, never wrapped.
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) -> f32 {
        let font = self.style.font.clone();
        let measurement = match self.shaper.shape(text, &font) {
            Ok(measurement) => measurement,
            Err(e) => {
                warn!("skipping text {text:?}: {e}");
                return 0.0;
            }
        };
        let line_count = text.split('\n').count();
        let total_height = resolve_height(Some(&measurement), &font);
        let line_height = |index: usize| {
            measurement
                .lines
                .get(index)
                .map(|line| line.height)
                .filter(|height| height.is_finite() && *height > 0.0)
                .unwrap_or(total_height / line_count as f32)
        };
        let (ascent, descent) = line_box(&measurement, total_height / line_count as f32);
        let first_baseline = match self.style.baseline {
            TextBaseline::Top => y + ascent,
            TextBaseline::Middle => y - (ascent + descent) / 2.0 + ascent,
            TextBaseline::Bottom => y - descent,
        };
        let color = self.style.fill.primary_color();
        let mut baseline = first_baseline;
        for (index, line) in text.split('\n').enumerate() {
            let origin = (x.round() as i32, baseline.round() as i32);
            let pixmap = &mut self.pixmap;
            let result = self.shaper.rasterize(line, &font, &mut |dx, dy, coverage| {
                blend_pixel(pixmap, origin.0 + dx, origin.1 + dy, color, coverage)
            });
            if let Err(e) = result {
                warn!("failed to rasterize {line:?}: {e}");
            }
            baseline += line_height(index);
        }
        measurement.width.max(0.0)
    }

    /// Draws `image` scaled into the `width` x `height` box at `(x, y)`.
    pub fn draw_image(&mut self, image: &RgbaImage, x: f32, y: f32, width: f32, height: f32) {
        let (target_w, target_h) = (width.round(), height.round());
        if target_w < 1.0 || target_h < 1.0 || image.width() == 0 || image.height() == 0 {
            return;
        }
        let resized = image::imageops::resize(
            image,
            target_w as u32,
            target_h as u32,
            FilterType::CatmullRom,
        );
        let (w, h) = resized.dimensions();
        let mut data = resized.into_raw();
        for pixel in data.chunks_exact_mut(4) {
            let alpha = u16::from(pixel[3]);
            for channel in &mut pixel[..3] {
                *channel = ((u16::from(*channel) * alpha + 127) / 255) as u8;
            }
        }
        let Some(sprite) = IntSize::from_wh(w, h).and_then(|size| Pixmap::from_vec(data, size))
        else {
            warn!("unable to build a {w}x{h} sprite");
            return;
        };
        self.pixmap.draw_pixmap(
            x.round() as i32,
            y.round() as i32,
            sprite.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    /// Straight RGBA color of one pixel, for inspection.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        self.pixmap.pixel(x, y).map(|pixel| {
            let color = pixel.demultiply();
            Color::rgba(color.red(), color.green(), color.blue(), color.alpha())
        })
    }

    pub fn encode_png(self) -> Result<Vec<u8>, Error> {
        self.pixmap
            .encode_png()
            .map_err(|e| Error::Encode(e.to_string()))
    }
}

/// Ascent and descent of the first line. Shapers that report no usable
/// extents get an 80/20 split of the resolved line height.
fn line_box(measurement: &TextMeasurement, line_height: f32) -> (f32, f32) {
    let (ascent, descent) = (measurement.ascent, measurement.descent);
    let extent = ascent + descent;
    if extent.is_finite() && extent > 0.0 && ascent >= 0.0 && descent >= 0.0 {
        (ascent, descent)
    } else {
        (line_height * 0.8, line_height * 0.2)
    }
}

fn blend_pixel(pixmap: &mut Pixmap, x: i32, y: i32, color: Color, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= pixmap.width() || y as u32 >= pixmap.height() {
        return;
    }
    let coverage = coverage.clamp(0.0, 1.0);
    if coverage <= 0.0 {
        return;
    }
    let index = y as usize * pixmap.width() as usize + x as usize;
    let pixels = pixmap.pixels_mut();
    let dst = pixels[index];
    let src_a = f32::from(color.a) / 255.0 * coverage;
    let inverse = 1.0 - src_a;
    let mix = |src: u8, dst: u8| {
        (f32::from(src) * src_a + f32::from(dst) * inverse)
            .round()
            .clamp(0.0, 255.0) as u8
    };
    let alpha = (src_a * 255.0 + f32::from(dst.alpha()) * inverse)
        .round()
        .clamp(0.0, 255.0) as u8;
    let (r, g, b) = (
        mix(color.r, dst.red()).min(alpha),
        mix(color.g, dst.green()).min(alpha),
        mix(color.b, dst.blue()).min(alpha),
    );
    if let Some(blended) = PremultipliedColorU8::from_rgba(r, g, b, alpha) {
        pixels[index] = blended;
    }
}

/// Style snapshot taken by [`Surface::scoped`].
pub struct StyleScope<'s, 'a> {
    surface: &'s mut Surface<'a>,
    saved: Option<Style>,
}

impl<'a> Deref for StyleScope<'_, 'a> {
    type Target = Surface<'a>;

    fn deref(&self) -> &Self::Target {
        self.surface
    }
}

impl DerefMut for StyleScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.surface
    }
}

impl Drop for StyleScope<'_, '_> {
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.surface.style = saved;
        }
    }
}

#[cfg(test)]
mod test {
    use image::{Rgba, RgbaImage};

    use super::{Surface, TextBaseline};
    use crate::{
        color::{Color, GradientDirection, LinearGradient},
        text::{FontSpec, HeuristicShaper, ShapeError, TextMeasurement, TextShaper},
    };

    #[test]
    fn scoped_style_is_restored() {
        let shaper = HeuristicShaper::default();
        let mut surface = Surface::new(10, 10, &shaper).unwrap();
        let before = surface.style().clone();
        {
            let mut scope = surface.scoped();
            scope
                .set_fill(Color::WHITE)
                .set_font(FontSpec::new(30.0, ["Georgia"]))
                .set_baseline(TextBaseline::Bottom);
            assert_eq!(scope.style().baseline, TextBaseline::Bottom);
            {
                let mut inner = scope.scoped();
                inner.set_baseline(TextBaseline::Middle);
            }
            assert_eq!(scope.style().baseline, TextBaseline::Bottom);
        }
        assert_eq!(surface.style(), &before);
    }

    #[test]
    fn zero_sized_surfaces_fail() {
        let shaper = HeuristicShaper::default();
        assert!(matches!(
            Surface::new(0, 10, &shaper),
            Err(crate::Error::Surface(0, 10))
        ));
    }

    #[test]
    fn fills_solid_and_gradient_rects() {
        let shaper = HeuristicShaper::default();
        let mut surface = Surface::new(100, 10, &shaper).unwrap();
        surface.set_fill(Color::rgb(255, 0, 0));
        surface.fill_rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(surface.pixel(5, 5), Some(Color::rgb(255, 0, 0)));

        surface.set_fill(LinearGradient::two_stop(
            GradientDirection::Horizontal,
            20.0,
            100.0,
            Color::WHITE,
            Color::TRANSPARENT,
        ));
        surface.fill_rect(20.0, 0.0, 80.0, 10.0);
        let near = surface.pixel(21, 5).unwrap();
        let far = surface.pixel(98, 5).unwrap();
        assert!(near.a > 240, "{near:?}");
        assert!(far.a < 20, "{far:?}");

        // zero width draws nothing
        surface.set_fill(Color::rgb(0, 0, 255));
        surface.fill_rect(50.0, 0.0, 0.0, 10.0);
        assert_ne!(surface.pixel(50, 5), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn text_lands_inside_its_line_box() {
        let shaper = HeuristicShaper::default();
        let mut surface = Surface::new(60, 40, &shaper).unwrap();
        surface
            .set_fill(Color::WHITE)
            .set_font(FontSpec::new(10.0, ["X"]))
            .set_baseline(TextBaseline::Top);
        let width = surface.fill_text("AB", 5.0, 5.0);
        assert!((width - 12.0).abs() < 1e-3);
        // the 12px line box spans y 5..17, glyph blocks sit right above the baseline
        assert_eq!(surface.pixel(7, 13).map(|c| c.a), Some(255));
        assert_eq!(surface.pixel(7, 2).map(|c| c.a), Some(0));
        assert_eq!(surface.pixel(7, 30).map(|c| c.a), Some(0));
    }

    /// Reports only a width, no line, height or extent data.
    struct WidthOnly(HeuristicShaper);

    impl TextShaper for WidthOnly {
        fn shape(&self, text: &str, font: &FontSpec) -> Result<TextMeasurement, ShapeError> {
            let measured = self.0.shape(text, font)?;
            Ok(TextMeasurement {
                width: measured.width,
                ..TextMeasurement::default()
            })
        }

        fn rasterize(
            &self,
            line: &str,
            font: &FontSpec,
            plot: &mut dyn FnMut(i32, i32, f32),
        ) -> Result<(), ShapeError> {
            self.0.rasterize(line, font, plot)
        }
    }

    fn ink_rows(surface: &Surface, x: u32) -> (Option<u32>, Option<u32>) {
        let rows: Vec<_> = (0..100)
            .filter(|&y| surface.pixel(x, y).is_some_and(|c| c.a > 0))
            .collect();
        (rows.first().copied(), rows.last().copied())
    }

    #[test]
    fn text_without_extents_stays_in_its_line_box() {
        let shaper = WidthOnly(HeuristicShaper::default());
        let mut surface = Surface::new(60, 100, &shaper).unwrap();
        surface
            .set_fill(Color::WHITE)
            .set_font(FontSpec::new(18.0, ["X"]))
            .set_baseline(TextBaseline::Top);
        assert_eq!(surface.measure_text("HH").height, 18.0);
        surface.fill_text("HH", 2.0, 40.0);
        let (first, last) = ink_rows(&surface, 5);
        assert!(first.is_some_and(|y| y >= 40), "{first:?}");
        assert!(last.is_some_and(|y| y < 58), "{last:?}");

        let mut surface = Surface::new(60, 100, &shaper).unwrap();
        surface
            .set_fill(Color::WHITE)
            .set_font(FontSpec::new(18.0, ["X"]))
            .set_baseline(TextBaseline::Middle);
        surface.fill_text("HH", 2.0, 49.0);
        let (first, last) = ink_rows(&surface, 5);
        assert!(first.is_some_and(|y| y >= 40), "{first:?}");
        assert!(last.is_some_and(|y| y < 58), "{last:?}");
    }

    #[test]
    fn images_are_scaled_into_place() {
        let shaper = HeuristicShaper::default();
        let mut surface = Surface::new(20, 20, &shaper).unwrap();
        let icon = RgbaImage::from_pixel(4, 4, Rgba([0, 255, 0, 255]));
        surface.draw_image(&icon, 2.0, 2.0, 8.0, 8.0);
        assert_eq!(surface.pixel(5, 5), Some(Color::rgb(0, 255, 0)));
        assert_eq!(surface.pixel(15, 15).map(|c| c.a), Some(0));
    }

    #[test]
    fn encodes_png() {
        let shaper = HeuristicShaper::default();
        let surface = Surface::new(8, 8, &shaper).unwrap();
        let png = surface.encode_png().unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }
}
