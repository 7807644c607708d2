use crate::{
    color::Color,
    surface::{Surface, TextBaseline},
    LayoutBox,
};

#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub color: Color,
    pub label: String,
}

impl LegendEntry {
    pub fn new(color: Color, label: impl Into<String>) -> Self {
        Self {
            color,
            label: label.into(),
        }
    }
}

/// Draws a vertical list of swatches with their labels to the right, using the
/// surface's current font and fill for the labels.
///
/// An empty legend has zero height; callers treat that as no legend area.
pub fn layout_legend(
    surface: &mut Surface<'_>,
    entries: &[LegendEntry],
    origin: (f32, f32),
    swatch: f32,
    gap: f32,
) -> LayoutBox {
    let (left, top) = origin;
    let mut offset = 0.0;
    let mut label_width: f32 = 0.0;
    for entry in entries {
        let size = surface.measure_text(&entry.label);
        let row_height = swatch.max(size.height);
        {
            let mut scope = surface.scoped();
            scope.set_fill(entry.color);
            scope.fill_rect(left, top + offset, swatch, swatch);
        }
        {
            let mut scope = surface.scoped();
            scope.set_baseline(TextBaseline::Middle);
            scope.fill_text(&entry.label, left + swatch + gap, top + offset + swatch / 2.0);
        }
        label_width = label_width.max(size.width);
        offset += row_height + gap;
    }
    let height = if entries.is_empty() { 0.0 } else { offset - gap };
    LayoutBox::new(swatch + gap + label_width, height)
}

#[cfg(test)]
mod test {
    use super::{layout_legend, LegendEntry};
    use crate::{
        color::{Color, Fill},
        surface::Surface,
        text::{FontSpec, HeuristicShaper},
        LayoutBox,
    };

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-3
    }

    #[test]
    fn two_entries() {
        let shaper = HeuristicShaper::default();
        let mut surface = Surface::new(200, 100, &shaper).unwrap();
        surface
            .set_fill(Color::WHITE)
            .set_font(FontSpec::new(12.0, ["X"]));
        let entries = [
            LegendEntry::new("#fff".parse().unwrap(), "A"),
            LegendEntry::new("#000".parse().unwrap(), "BB"),
        ];
        let area = layout_legend(&mut surface, &entries, (0.0, 0.0), 16.0, 8.0);
        let bb = surface.measure_text("BB").width;
        // two 16px rows plus the gap between them
        assert!(close(area.height, 16.0 + 8.0 + 16.0), "{area:?}");
        assert!(close(area.width, 16.0 + 8.0 + bb), "{area:?}");
        assert_eq!(surface.pixel(4, 4), Some(Color::WHITE));
        assert_eq!(surface.pixel(4, 28), Some(Color::rgb(0, 0, 0)));
        // labels keep the surface fill
        assert_eq!(surface.style().fill, Fill::Solid(Color::WHITE));
    }

    #[test]
    fn tall_labels_grow_rows() {
        let shaper = HeuristicShaper { line_height: 2.0 };
        let mut surface = Surface::new(200, 200, &shaper).unwrap();
        surface.set_font(FontSpec::new(12.0, ["X"]));
        let entries = [
            LegendEntry::new(Color::WHITE, "A"),
            LegendEntry::new(Color::WHITE, "B"),
        ];
        let area = layout_legend(&mut surface, &entries, (0.0, 0.0), 16.0, 8.0);
        assert!(close(area.height, 24.0 + 8.0 + 24.0), "{area:?}");
    }

    #[test]
    fn empty_legend_has_no_height() {
        let shaper = HeuristicShaper::default();
        let mut surface = Surface::new(10, 10, &shaper).unwrap();
        let area = layout_legend(&mut surface, &[], (0.0, 0.0), 16.0, 8.0);
        assert_eq!(area, LayoutBox::new(24.0, 0.0));
    }
}
