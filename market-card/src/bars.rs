//! Horizontal bars scaled against one shared maximum, each followed by a
//! numeric label.

use crate::{
    color::Color,
    surface::{Surface, TextBaseline},
    LayoutBox,
};

/// Width of one bar. A zero scale maximum yields zero instead of NaN.
pub fn bar_width(magnitude: u64, scale_max: u64, available: f32) -> f32 {
    if scale_max == 0 || available <= 0.0 {
        return 0.0;
    }
    magnitude as f32 / scale_max as f32 * available
}

pub fn bar_widths(magnitudes: &[u64], scale_max: u64, available: f32) -> Vec<f32> {
    magnitudes
        .iter()
        .map(|magnitude| bar_width(*magnitude, scale_max, available))
        .collect()
}

/// Horizontal distance from the bar start to its label. Zero bars keep their
/// label flush at the start.
pub fn label_offset(width: f32, magnitude: u64, gap: f32) -> f32 {
    if magnitude > 0 {
        width + gap
    } else {
        width
    }
}

/// Room left for bars once the legend, the widest label and two gaps are
/// taken out of the section width.
pub fn available_width(
    section_width: f32,
    legend_width: f32,
    widest_label: f32,
    gap: f32,
) -> f32 {
    (section_width - legend_width - gap - widest_label - gap).max(0.0)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Bar {
    pub magnitude: u64,
    pub color: Color,
    pub label: String,
}

/// Bars stacked top to bottom. Every `group` bars are followed by an extra gap.
#[derive(Debug, Clone, PartialEq)]
pub struct BarChart {
    pub bars: Vec<Bar>,
    pub bar_height: f32,
    pub gap: f32,
    pub group: usize,
}

impl BarChart {
    /// Largest magnitude, the default scale.
    pub fn scale_max(&self) -> u64 {
        self.bars.iter().map(|bar| bar.magnitude).max().unwrap_or(0)
    }

    fn groups_before(&self, index: usize) -> usize {
        if self.group == 0 {
            0
        } else {
            index / self.group
        }
    }

    fn bar_top(&self, index: usize) -> f32 {
        index as f32 * self.bar_height + self.groups_before(index) as f32 * self.gap
    }

    pub fn height(&self) -> f32 {
        match self.bars.len() {
            0 => 0.0,
            n => self.bar_top(n - 1) + self.bar_height,
        }
    }

    /// Widest label under the surface's current font.
    pub fn widest_label(&self, surface: &Surface<'_>) -> f32 {
        self.bars
            .iter()
            .map(|bar| surface.measure_text(&bar.label).width)
            .fold(0.0, f32::max)
    }

    /// Draws the chart with its top left corner at `origin`. Labels use the
    /// surface's current font and fill.
    pub fn draw(
        &self,
        surface: &mut Surface<'_>,
        origin: (f32, f32),
        scale_max: u64,
        available: f32,
    ) -> LayoutBox {
        let (left, top) = origin;
        let magnitudes: Vec<_> = self.bars.iter().map(|bar| bar.magnitude).collect();
        let widths = bar_widths(&magnitudes, scale_max, available);
        let mut width: f32 = 0.0;
        for (index, (bar, bar_w)) in self.bars.iter().zip(widths).enumerate() {
            let bar_top = top + self.bar_top(index);
            {
                let mut scope = surface.scoped();
                scope.set_fill(bar.color);
                scope.fill_rect(left, bar_top, bar_w, self.bar_height);
            }
            let label_x = label_offset(bar_w, bar.magnitude, self.gap);
            let label_w = {
                let mut scope = surface.scoped();
                scope.set_baseline(TextBaseline::Middle);
                scope.fill_text(&bar.label, left + label_x, bar_top + self.bar_height / 2.0)
            };
            width = width.max(label_x + label_w);
        }
        LayoutBox::new(width, self.height())
    }
}
