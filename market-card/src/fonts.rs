use std::path::Path;

use ab_glyph::{point, Font, FontArc, Glyph, PxScale, ScaleFont};
use log::{debug, info};

use crate::{
    text::{FontSpec, LineMetrics, ShapeError, TextMeasurement, TextShaper},
    Error,
};

/// Generic family names resolve to every registered face not already in the chain.
const GENERIC_FAMILIES: [&str; 4] = ["sans-serif", "serif", "monospace", "system-ui"];

/// Named fonts available to the renderer.
///
/// Registration is idempotent by name. Text is shaped against the family chain
/// of its [`FontSpec`] with per glyph fallback, so a CJK face and a Latin face
/// can share one run.
#[derive(Clone, Default)]
pub struct FontLibrary {
    fonts: Vec<(String, FontArc)>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("fonts", &self.names().collect::<Vec<_>>())
            .finish()
    }
}

struct PlacedGlyph<'f> {
    font: &'f FontArc,
    glyph: Glyph,
}

impl FontLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.iter().map(|(name, _)| name.as_str())
    }

    fn get(&self, name: &str) -> Option<&FontArc> {
        self.fonts
            .iter()
            .find(|(registered, _)| registered.eq_ignore_ascii_case(name))
            .map(|(_, font)| font)
    }

    /// Registers font data under `name`. Returns `false` without touching the
    /// data if the name is already taken.
    pub fn register(&mut self, name: impl Into<String>, data: Vec<u8>) -> Result<bool, Error> {
        let name = name.into();
        if self.has(&name) {
            debug!("font {name} already registered");
            return Ok(false);
        }
        let font = FontArc::try_from_vec(data)?;
        info!("registered font {name}");
        self.fonts.push((name, font));
        Ok(true)
    }

    pub fn register_file(
        &mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<bool, Error> {
        let name = name.into();
        if self.has(&name) {
            return Ok(false);
        }
        let data = std::fs::read(path.as_ref())?;
        self.register(name, data)
    }

    fn chain(&self, spec: &FontSpec) -> Vec<&FontArc> {
        let mut chain: Vec<&FontArc> = Vec::new();
        for family in &spec.families {
            let generic = GENERIC_FAMILIES
                .iter()
                .any(|generic| generic.eq_ignore_ascii_case(family));
            let candidates: Vec<&FontArc> = if generic {
                self.fonts.iter().map(|(_, font)| font).collect()
            } else {
                self.get(family).into_iter().collect()
            };
            for font in candidates {
                if !chain.iter().any(|existing| std::ptr::eq(*existing, font)) {
                    chain.push(font);
                }
            }
        }
        chain
    }

    fn scale_for(font: &FontArc, size: f32) -> PxScale {
        // css sizes are em sizes, ab_glyph scales by ascent - descent
        let units_per_em = font.units_per_em().unwrap_or(1000.0);
        PxScale::from(size * font.height_unscaled() / units_per_em)
    }

    fn layout_line<'f>(chain: &[&'f FontArc], line: &str, size: f32) -> (Vec<PlacedGlyph<'f>>, f32) {
        let mut placed = Vec::with_capacity(line.len());
        let mut caret = 0.0;
        let mut previous: Option<(usize, ab_glyph::GlyphId)> = None;
        for c in line.chars().filter(|c| !c.is_control()) {
            let index = chain
                .iter()
                .position(|font| font.glyph_id(c).0 != 0)
                .unwrap_or(0);
            let font = chain[index];
            let scale = Self::scale_for(font, size);
            let scaled = font.as_scaled(scale);
            let id = font.glyph_id(c);
            if let Some((previous_index, previous_id)) = previous {
                if previous_index == index {
                    caret += scaled.kern(previous_id, id);
                }
            }
            placed.push(PlacedGlyph {
                font,
                glyph: id.with_scale_and_position(scale, point(caret, 0.0)),
            });
            caret += scaled.h_advance(id);
            previous = Some((index, id));
        }
        (placed, caret)
    }

    fn line_height(chain: &[&FontArc], glyphs: &[PlacedGlyph<'_>], size: f32) -> f32 {
        let height_of = |font: &FontArc| {
            let scaled = font.as_scaled(Self::scale_for(font, size));
            scaled.ascent() - scaled.descent() + scaled.line_gap()
        };
        let primary = height_of(chain[0]);
        glyphs
            .iter()
            .map(|placed| height_of(placed.font))
            .fold(primary, f32::max)
    }
}

impl TextShaper for FontLibrary {
    fn shape(&self, text: &str, font: &FontSpec) -> Result<TextMeasurement, ShapeError> {
        let chain = self.chain(font);
        let Some(primary) = chain.first() else {
            return Err(ShapeError::NoFont(font.descriptor()));
        };
        let lines: Vec<LineMetrics> = text
            .split('\n')
            .map(|line| {
                let (glyphs, width) = Self::layout_line(&chain, line, font.size);
                LineMetrics {
                    width,
                    height: Self::line_height(&chain, &glyphs, font.size),
                }
            })
            .collect();
        let scaled = primary.as_scaled(Self::scale_for(primary, font.size));
        Ok(TextMeasurement {
            width: lines.iter().map(|line| line.width).fold(0.0, f32::max),
            height: Some(lines.iter().map(|line| line.height).sum()),
            lines,
            ascent: scaled.ascent(),
            descent: -scaled.descent(),
        })
    }

    fn rasterize(
        &self,
        line: &str,
        font: &FontSpec,
        plot: &mut dyn FnMut(i32, i32, f32),
    ) -> Result<(), ShapeError> {
        let chain = self.chain(font);
        if chain.is_empty() {
            return Err(ShapeError::NoFont(font.descriptor()));
        }
        let (glyphs, _) = Self::layout_line(&chain, line, font.size);
        for placed in glyphs {
            if let Some(outlined) = placed.font.outline_glyph(placed.glyph) {
                let bounds = outlined.px_bounds();
                let (left, top) = (bounds.min.x as i32, bounds.min.y as i32);
                outlined.draw(|x, y, coverage| plot(left + x as i32, top + y as i32, coverage));
            }
        }
        Ok(())
    }
}
