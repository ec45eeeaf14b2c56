use std::ops::Range;

/// RGBA8 pixel buffer, row-major, ready to pipe to the encoder.
#[derive(Clone, Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Canvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width as usize) * (height as usize) * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ])
    }

    pub fn clear(&mut self, color: [u8; 4]) {
        for px in self.pixels.chunks_exact_mut(4) {
            px.copy_from_slice(&color);
        }
    }

    /// Alpha-blend `color` over the pixel at (x, y).
    pub fn blend_pixel(&mut self, x: u32, y: u32, color: [u8; 4]) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = self.index(x, y);
        let a = color[3] as f32 / 255.0;
        let inv_a = 1.0 - a;
        for c in 0..3 {
            self.pixels[idx + c] = (color[c] as f32 * a + self.pixels[idx + c] as f32 * inv_a).round() as u8;
        }
        self.pixels[idx + 3] = 255;
    }

    /// Blend a rectangle given in fractional pixel coordinates.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: [u8; 4]) {
        for py in span(y, h, self.height) {
            for px in span(x, w, self.width) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    /// Rectangle fading linearly from `top` to `bottom`.
    pub fn fill_vertical_gradient(&mut self, x: f32, y: f32, w: f32, h: f32, top: [u8; 4], bottom: [u8; 4]) {
        let rows = span(y, h, self.height);
        let first = rows.start as f32;
        let count = (rows.end.saturating_sub(rows.start)).max(2) as f32 - 1.0;
        for py in rows {
            let t = (py as f32 - first) / count;
            let color = lerp_rgba(top, bottom, t);
            for px in span(x, w, self.width) {
                self.blend_pixel(px, py, color);
            }
        }
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32, line_width: f32, color: [u8; 4]) {
        let lw = line_width.max(1.0);
        self.fill_rect(x, y, w, lw, color);
        self.fill_rect(x, y + h - lw, w, lw, color);
        self.fill_rect(x, y + lw, lw, h - 2.0 * lw, color);
        self.fill_rect(x + w - lw, y + lw, lw, h - 2.0 * lw, color);
    }

    /// Thick line drawn by stamping squares along its length.
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), line_width: f32, color: [u8; 4]) {
        let (dx, dy) = (to.0 - from.0, to.1 - from.1);
        let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as usize;
        let lw = line_width.max(1.0);
        let mut last = None;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let cx = (from.0 + dx * t - lw / 2.0).round();
            let cy = (from.1 + dy * t - lw / 2.0).round();
            if last == Some((cx as i64, cy as i64)) {
                continue;
            }
            last = Some((cx as i64, cy as i64));
            self.fill_rect(cx, cy, lw, lw, color);
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }
}

/// Pixel indices whose centers fall inside `[start, start + len)`, clipped to `limit`.
fn span(start: f32, len: f32, limit: u32) -> Range<u32> {
    if !(len > 0.0) || !start.is_finite() {
        return 0..0;
    }
    let lo = start.round().clamp(0.0, limit as f32) as u32;
    let hi = (start + len).round().clamp(0.0, limit as f32) as u32;
    lo..hi.max(lo)
}

fn lerp_rgba(a: [u8; 4], b: [u8; 4], t: f32) -> [u8; 4] {
    let t = t.clamp(0.0, 1.0);
    let mut out = [0u8; 4];
    for c in 0..4 {
        out[c] = (a[c] as f32 + (b[c] as f32 - a[c] as f32) * t).round() as u8;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clear_sets_every_pixel() {
        let mut canvas = Canvas::new(4, 3);
        canvas.clear([1, 2, 3, 255]);
        assert_eq!(canvas.pixels().len(), 48);
        assert_eq!(canvas.pixel(3, 2), Some([1, 2, 3, 255]));
    }

    #[test]
    fn fill_rect_is_clipped() {
        let mut canvas = Canvas::new(4, 4);
        canvas.clear([0, 0, 0, 255]);
        canvas.fill_rect(-2.0, 2.0, 10.0, 10.0, [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(0, 1), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 2), Some([255, 255, 255, 255]));
        assert_eq!(canvas.pixel(3, 3), Some([255, 255, 255, 255]));
    }

    #[test]
    fn blend_respects_alpha() {
        let mut canvas = Canvas::new(1, 1);
        canvas.clear([0, 0, 0, 255]);
        canvas.blend_pixel(0, 0, [200, 100, 50, 0x80]);
        let px = canvas.pixel(0, 0).unwrap();
        assert!((px[0] as i16 - 100).abs() <= 1);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn gradient_runs_top_to_bottom() {
        let mut canvas = Canvas::new(1, 10);
        canvas.clear([0, 0, 0, 255]);
        canvas.fill_vertical_gradient(0.0, 0.0, 1.0, 10.0, [255, 0, 0, 255], [255, 0, 0, 0]);
        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 9), Some([0, 0, 0, 255]));
    }

    #[test]
    fn zero_sized_rect_draws_nothing() {
        let mut canvas = Canvas::new(2, 2);
        canvas.fill_rect(0.0, 0.0, 0.0, 2.0, [255; 4]);
        canvas.fill_rect(0.0, 0.0, f32::NAN, 2.0, [255; 4]);
        assert!(canvas.pixels().iter().all(|&b| b == 0));
    }
}
