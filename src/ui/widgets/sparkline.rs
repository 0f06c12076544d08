//! Rate sparkline widget for the history panel

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

/// Block characters for different rate levels (8 levels)
const BLOCKS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A sparkline showing quotation values over time, scaled between their min and max
pub struct RateSparkline<'a> {
    /// Rate for each day, oldest first
    values: &'a [f64],
    /// Lowest value, mapped to the lowest block
    min: f64,
    /// Highest value, mapped to the highest block
    max: f64,
    /// Style for the sparkline
    style: Style,
    /// Style for the most recent value
    marker_style: Style,
}

impl<'a> RateSparkline<'a> {
    pub fn new(values: &'a [f64]) -> Self {
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Self {
            values,
            min,
            max,
            style: Style::default().fg(Color::Cyan),
            marker_style: Style::default().fg(Color::Yellow),
        }
    }

    fn value_to_block(&self, value: f64) -> char {
        let range = self.max - self.min;
        if !range.is_finite() || range <= 0.0 {
            return BLOCKS[3];
        }
        let normalized = ((value - self.min) / range).clamp(0.0, 1.0);
        let index = ((normalized * 7.0).round() as usize).min(7);
        BLOCKS[index]
    }
}

impl<'a> Widget for RateSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.values.is_empty() {
            return;
        }

        // Keep the most recent values when the area is narrower than the series
        let width = area.width as usize;
        let skip = self.values.len().saturating_sub(width);
        let last = self.values.len() - 1;

        for (i, value) in self.values.iter().enumerate().skip(skip) {
            let block = self.value_to_block(*value);
            let x = area.x + (i - skip) as u16;

            let style = if i == last {
                self.marker_style
            } else {
                self.style
            };

            if let Some(cell) = buf.cell_mut((x, area.y)) {
                cell.set_char(block).set_style(style);
            }
        }
    }
}
