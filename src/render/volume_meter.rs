use std::collections::VecDeque;

use super::canvas::Canvas;
use super::{hex_rgba, RenderAdapter};
use crate::audio::features::FeatureRecord;

/// Single loudness bar with a short trail of recent values above it.
#[derive(Clone, Debug)]
pub struct VolumeMeter2D {
    color: [u8; 4],
    background: [u8; 4],
    trail: VecDeque<f32>,
    trail_len: usize,
}

impl Default for VolumeMeter2D {
    fn default() -> Self {
        Self::new(hex_rgba(0x00ff88, 255), 120)
    }
}

impl VolumeMeter2D {
    pub fn new(color: [u8; 4], trail_len: usize) -> Self {
        Self {
            color,
            background: hex_rgba(0x000000, 255),
            trail: VecDeque::with_capacity(trail_len),
            trail_len: trail_len.max(2),
        }
    }

    pub fn trail(&self) -> impl Iterator<Item = f32> + '_ {
        self.trail.iter().copied()
    }

    fn draw_placeholder(&self, canvas: &mut Canvas) {
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let block_w = (w * 0.25).min(100.0);
        let block_h = (h * 0.05).max(20.0);
        canvas.fill_rect(
            w / 2.0 - block_w / 2.0,
            h - block_h - h * 0.05,
            block_w,
            block_h,
            hex_rgba(0x333333, 255),
        );
    }

    fn draw_trail(&self, canvas: &mut Canvas, meter_width: f32) {
        if self.trail.len() < 2 {
            return;
        }
        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let trail_w = meter_width * 0.8;
        let trail_h = h * 0.15;
        let trail_x = (w - trail_w) / 2.0;
        let trail_y = h * 0.05;

        canvas.stroke_rect(trail_x, trail_y, trail_w, trail_h, (w * 0.002).max(1.0), hex_rgba(0x444444, 255));

        let last = (self.trail.len() - 1) as f32;
        let point = |i: usize, v: f32| {
            (
                trail_x + i as f32 / last * trail_w,
                trail_y + trail_h - v.clamp(0.0, 1.0) * trail_h,
            )
        };
        let line_width = (w * 0.005).max(2.0);
        for (i, pair) in self.trail.iter().collect::<Vec<_>>().windows(2).enumerate() {
            canvas.draw_line(point(i, *pair[0]), point(i + 1, *pair[1]), line_width, self.color);
        }
    }
}

impl RenderAdapter for VolumeMeter2D {
    type Target = Canvas;

    fn available_width(&self, _target: &Canvas) -> Option<u32> {
        None
    }

    fn draw(&mut self, features: Option<&FeatureRecord>, canvas: &mut Canvas) {
        canvas.clear(self.background);

        let Some(features) = features else {
            self.draw_placeholder(canvas);
            return;
        };

        if self.trail.len() >= self.trail_len {
            self.trail.pop_front();
        }
        self.trail.push_back(features.volume);

        let (w, h) = (canvas.width() as f32, canvas.height() as f32);
        let rect_w = w * 0.6;
        let rect_h = (h * 0.02).max(features.volume.clamp(0.0, 1.0) * h * 0.7);
        let rect_x = (w - rect_w) / 2.0;
        let rect_y = h - rect_h - h * 0.1;

        let mut faded = self.color;
        faded[3] = 0x80;
        canvas.fill_vertical_gradient(rect_x, rect_y, rect_w, rect_h, self.color, faded);
        canvas.stroke_rect(rect_x, rect_y, rect_w, rect_h, (w * 0.005).max(1.0), self.color);

        self.draw_trail(canvas, rect_w);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(volume: f32) -> FeatureRecord {
        FeatureRecord {
            volume,
            volume_ratio: 1.0,
            ..Default::default()
        }
    }

    #[test]
    fn full_volume_fills_seventy_percent() {
        let mut canvas = Canvas::new(100, 100);
        let mut meter = VolumeMeter2D::default();
        meter.draw(Some(&record(1.0)), &mut canvas);
        // Rect spans y = 20..90, x = 20..80
        assert_eq!(canvas.pixel(50, 20), Some([0x00, 0xff, 0x88, 255]));
        assert_eq!(canvas.pixel(50, 95), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(10, 50), Some([0, 0, 0, 255]));
    }

    #[test]
    fn trail_is_bounded() {
        let mut canvas = Canvas::new(64, 64);
        let mut meter = VolumeMeter2D::new([255, 255, 255, 255], 3);
        for v in [0.1, 0.2, 0.3, 0.4, 0.5] {
            meter.draw(Some(&record(v)), &mut canvas);
        }
        assert_eq!(meter.trail().collect::<Vec<_>>(), vec![0.3, 0.4, 0.5]);
    }

    #[test]
    fn placeholder_without_data() {
        let mut canvas = Canvas::new(200, 200);
        let mut meter = VolumeMeter2D::default();
        meter.draw(None, &mut canvas);
        // 50x20 block centred, 10 px above the bottom
        assert_eq!(canvas.pixel(100, 180), Some([0x33, 0x33, 0x33, 255]));
        assert_eq!(canvas.pixel(100, 100), Some([0, 0, 0, 255]));
        assert_eq!(meter.trail().count(), 0);
    }
}
