//! Per-bar excitement colors on a two-stop gradient.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use super::history::History;

#[derive(Debug, Error, PartialEq)]
pub enum ColorError {
    #[error("expected a #rrggbb color, got '{0}'")]
    Malformed(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }

    pub fn to_rgba(self, alpha: u8) -> [u8; 4] {
        [self.r, self.g, self.b, alpha]
    }

    /// Normalized linear components for GPU consumers.
    pub fn to_f32(self) -> [f32; 3] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
        ]
    }

    fn to_hsl(self) -> Hsl {
        let r = self.r as f32 / 255.0;
        let g = self.g as f32 / 255.0;
        let b = self.b as f32 / 255.0;
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let l = (max + min) / 2.0;

        if max == min {
            return Hsl { h: None, s: 0.0, l };
        }

        let delta = max - min;
        let s = if l < 0.5 {
            delta / (max + min)
        } else {
            delta / (2.0 - max - min)
        };
        let sector = if r == max {
            (g - b) / delta
        } else if g == max {
            2.0 + (b - r) / delta
        } else {
            4.0 + (r - g) / delta
        };
        let mut h = sector * 60.0;
        if h < 0.0 {
            h += 360.0;
        }
        Hsl { h: Some(h), s, l }
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let hex = s.trim().strip_prefix('#').unwrap_or(s.trim());
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(ColorError::Malformed(s.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::Malformed(s.to_string()))
        };
        Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_hex()
    }
}

/// Hue is `None` for greys.
#[derive(Clone, Copy, Debug)]
struct Hsl {
    h: Option<f32>,
    s: f32,
    l: f32,
}

impl Hsl {
    fn to_rgb(self) -> Rgb {
        let Hsl { h, s, l } = self;
        let (r, g, b) = match h {
            Some(h) if s > 0.0 => {
                let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
                let p = 2.0 * l - q;
                let h = h / 360.0;
                (
                    hue_to_channel(p, q, h + 1.0 / 3.0),
                    hue_to_channel(p, q, h),
                    hue_to_channel(p, q, h - 1.0 / 3.0),
                )
            }
            _ => (l, l, l),
        };
        Rgb::new(to_byte(r), to_byte(g), to_byte(b))
    }
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

fn to_byte(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interpolation {
    Rgb,
    #[default]
    Hsl,
}

/// Fixed two-stop gradient from `low` (t = 0) to `high` (t = 1).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Gradient {
    pub low: Rgb,
    pub high: Rgb,
    pub interpolation: Interpolation,
}

impl Gradient {
    pub fn new(low: Rgb, high: Rgb, interpolation: Interpolation) -> Self {
        Self {
            low,
            high,
            interpolation,
        }
    }

    /// Color at position `t`, clamped into [0, 1].
    pub fn at(&self, t: f32) -> Rgb {
        if t.is_nan() || t <= 0.0 {
            return self.low;
        }
        if t >= 1.0 {
            return self.high;
        }
        match self.interpolation {
            Interpolation::Rgb => {
                let lerp = |a: u8, b: u8| to_byte((a as f32 + (b as f32 - a as f32) * t) / 255.0);
                Rgb::new(
                    lerp(self.low.r, self.high.r),
                    lerp(self.low.g, self.high.g),
                    lerp(self.low.b, self.high.b),
                )
            }
            Interpolation::Hsl => {
                let a = self.low.to_hsl();
                let b = self.high.to_hsl();
                let h = match (a.h, b.h) {
                    (Some(h0), Some(h1)) => {
                        // Shorter way round the hue circle
                        let mut dh = h1 - h0;
                        if dh > 180.0 {
                            dh -= 360.0;
                        } else if dh < -180.0 {
                            dh += 360.0;
                        }
                        Some((h0 + t * dh).rem_euclid(360.0))
                    }
                    (Some(h0), None) => Some(h0),
                    (None, Some(h1)) => Some(h1),
                    (None, None) => None,
                };
                let s = match (a.h, b.h) {
                    (Some(_), None) if b.l == 0.0 || b.l == 1.0 => a.s,
                    (None, Some(_)) if a.l == 0.0 || a.l == 1.0 => b.s,
                    _ => a.s + t * (b.s - a.s),
                };
                let l = a.l + t * (b.l - a.l);
                Hsl { h, s, l }.to_rgb()
            }
        }
    }
}

/// How far `current` sits above the history's average, as a fraction of
/// that average, clamped into [0, 1]. Zero when the average is zero.
pub fn excitement_ratio(current: f32, history: &History) -> f32 {
    let avg = history.mean();
    if avg <= 0.0 {
        return 0.0;
    }
    let ratio = current / avg - 1.0;
    if ratio.is_nan() {
        return 0.0;
    }
    ratio.clamp(0.0, 1.0)
}

pub fn color_for(current: f32, history: &History, gradient: &Gradient) -> Rgb {
    gradient.at(excitement_ratio(current, history))
}
