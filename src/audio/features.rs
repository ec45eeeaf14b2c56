use serde::Serialize;

use crate::pipeline::color::Rgb;

/// One drawn bar: smoothed amplitude (0-255) and its excitement color.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bar {
    pub amplitude: f32,
    pub color: Rgb,
}

/// Per-frame pipeline output, consumed once by a render adapter.
#[derive(Clone, Debug, Default, Serialize)]
pub struct FeatureRecord {
    /// Loudness (0.0-1.0), compressed according to the pipeline config
    pub volume: f32,
    /// Volume relative to the rolling average including this frame (1.0 when that average is 0)
    pub volume_ratio: f32,
    /// Raw magnitudes, when passthrough is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_data: Option<Vec<u8>>,
    /// Mel bars, absent for volume-only profiles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bars: Option<Vec<Bar>>,
}

impl FeatureRecord {
    pub fn bar_count(&self) -> usize {
        self.bars.as_ref().map_or(0, Vec::len)
    }

    pub fn amplitudes(&self) -> Vec<f32> {
        self.bars
            .as_ref()
            .map(|bars| bars.iter().map(|b| b.amplitude).collect())
            .unwrap_or_default()
    }

    pub fn colors(&self) -> Vec<Rgb> {
        self.bars
            .as_ref()
            .map(|bars| bars.iter().map(|b| b.color).collect())
            .unwrap_or_default()
    }
}
