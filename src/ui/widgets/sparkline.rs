//! Mini sparkline widget for the price series

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

const BARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// A compact single-line sparkline.
///
/// Bars are scaled between the minimum and maximum of the visible window,
/// so small moves around a large base value stay visible.
pub struct MiniSparkline<'a> {
    data: &'a [u64],
    style: Style,
}

impl<'a> MiniSparkline<'a> {
    pub fn new(data: &'a [u64]) -> Self {
        Self {
            data,
            style: Style::default().fg(Color::Cyan),
        }
    }

    pub fn style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }
}

impl<'a> Widget for MiniSparkline<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 || self.data.is_empty() {
            return;
        }

        let text = sparkline_text(self.data, area.width as usize);
        for (i, ch) in text.chars().enumerate() {
            let x = area.x + i as u16;
            if x >= area.x + area.width {
                break;
            }
            buf.get_mut(x, area.y).set_char(ch).set_style(self.style);
        }
    }
}

/// Render the last `width` values as bar characters
pub fn sparkline_text(data: &[u64], width: usize) -> String {
    if data.is_empty() || width == 0 {
        return String::new();
    }

    let data_len = data.len().min(width);
    let window = &data[data.len() - data_len..];
    let min = window.iter().copied().min().unwrap_or(0);
    let max = window.iter().copied().max().unwrap_or(0);
    let span = max.saturating_sub(min);

    window
        .iter()
        .map(|&value| {
            let scaled = if span == 0 {
                3
            } else {
                (((value - min) as f64 / span as f64) * 7.0).round() as usize
            };
            BARS[scaled.min(7)]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sparkline_text() {
        let data = [250, 251, 252, 253, 254, 255, 256, 257];
        let text = sparkline_text(&data, 8);
        assert_eq!(text.chars().count(), 8);
        assert_eq!(text.chars().next(), Some('▁'));
        assert_eq!(text.chars().last(), Some('█'));
    }

    #[test]
    fn test_sparkline_keeps_latest_values() {
        let data = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10];
        let text = sparkline_text(&data, 4);
        assert_eq!(text.chars().count(), 4);
        assert_eq!(text.chars().last(), Some('█'));
    }

    #[test]
    fn test_flat_series() {
        let text = sparkline_text(&[250, 250, 250], 8);
        assert_eq!(text, "▄▄▄");
    }

    #[test]
    fn test_sparkline_text_empty() {
        let data: [u64; 0] = [];
        assert!(sparkline_text(&data, 8).is_empty());
    }
}
