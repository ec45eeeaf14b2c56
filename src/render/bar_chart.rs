use super::canvas::Canvas;
use super::{hex_rgba, RenderAdapter};
use crate::audio::features::FeatureRecord;

const MAX_HEIGHT_RATIO: f32 = 0.9;
const BOTTOM_MARGIN_RATIO: f32 = 0.05;
const MIN_HEIGHT_RATIO: f32 = 0.005;
/// Alpha at the foot of each bar
const FADE_ALPHA: u8 = 0x44;

/// Vertical bars along the bottom of a 2D canvas.
#[derive(Clone, Debug)]
pub struct BarChart2D {
    background: [u8; 4],
    placeholder: [u8; 4],
}

impl Default for BarChart2D {
    fn default() -> Self {
        Self {
            background: hex_rgba(0x000000, 255),
            placeholder: hex_rgba(0x666666, 255),
        }
    }
}

impl BarChart2D {
    pub fn new(background: [u8; 4]) -> Self {
        Self {
            background,
            ..Self::default()
        }
    }

    fn draw_placeholder(&self, canvas: &mut Canvas) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let block_w = (w * 0.25).min(100.0);
        let block_h = (h * 0.06).max(14.0);
        canvas.fill_rect((w - block_w) / 2.0, (h - block_h) / 2.0, block_w, block_h, self.placeholder);
    }
}

impl RenderAdapter for BarChart2D {
    type Target = Canvas;

    fn available_width(&self, target: &Canvas) -> Option<u32> {
        Some(target.width())
    }

    fn draw(&mut self, features: Option<&FeatureRecord>, canvas: &mut Canvas) {
        canvas.clear(self.background);

        let bars = match features.and_then(|f| f.bars.as_deref()) {
            Some(bars) if !bars.is_empty() => bars,
            _ => {
                self.draw_placeholder(canvas);
                return;
            }
        };

        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let bar_width = w / bars.len() as f32;
        let max_bar_height = h * MAX_HEIGHT_RATIO;
        let bottom_margin = h * BOTTOM_MARGIN_RATIO;

        for (i, bar) in bars.iter().enumerate() {
            let amplitude = (bar.amplitude / 255.0).clamp(0.0, 1.0);
            let bar_height = (h * MIN_HEIGHT_RATIO).max(amplitude * max_bar_height);
            let x = i as f32 * bar_width;
            let y = h - bar_height - bottom_margin;

            canvas.fill_vertical_gradient(
                x,
                y,
                bar_width,
                bar_height,
                bar.color.to_rgba(255),
                bar.color.to_rgba(FADE_ALPHA),
            );

            if bar_width > 3.0 {
                canvas.stroke_rect(x, y, bar_width, bar_height, (w * 0.0005).max(1.0), bar.color.to_rgba(255));
            }
        }
    }
}
