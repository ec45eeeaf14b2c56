//! Per-frame feature extraction: volume, mel bars, smoothing and excitement colors.

pub mod color;
pub mod history;
pub mod mel;
pub mod volume;

use serde::Deserialize;
use thiserror::Error;

use crate::audio::features::{Bar, FeatureRecord};
use crate::audio::frame::FrequencyFrame;
use color::{color_for, Gradient, Interpolation, Rgb};
use history::{BarHistory, HistoryState};
use volume::{extract_volume, VolumeCompression};

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("max_bars must be at least 1")]
    ZeroBars,
    #[error("volume_window_seconds must be positive, got {0}")]
    InvalidWindow(f32),
    #[error("musical_range_fraction must be in (0, 1], got {0}")]
    InvalidRange(f32),
    #[error("min_bar_width_px must be at least 1")]
    ZeroBarWidth,
}

/// Presets matching each render backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    /// 2D bar chart: lower 60% of the spectrum, blue gradient
    Chart,
    /// 3D bar field: full spectrum, red gradient in HSL
    Field,
    /// Volume meter only, square-root loudness
    Meter,
}

impl Profile {
    pub fn config(self) -> PipelineConfig {
        let base = PipelineConfig::default();
        match self {
            Profile::Chart => base,
            Profile::Field => PipelineConfig {
                musical_range_fraction: 1.0,
                low_color: Rgb::new(0xff, 0x53, 0x81),
                high_color: Rgb::new(0xff, 0x08, 0x4a),
                interpolation: Interpolation::Hsl,
                ..base
            },
            Profile::Meter => PipelineConfig {
                bars: false,
                volume_compression: VolumeCompression::Sqrt,
                ..base
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Upper bound on bars per frame
    pub max_bars: usize,
    /// Horizon of the volume and per-bar histories
    pub volume_window_seconds: f32,
    /// Leading share of the spectrum treated as musical content
    pub musical_range_fraction: f32,
    /// Narrowest bar the adapter will draw; caps the bar count by width
    pub min_bar_width_px: u32,
    pub low_color: Rgb,
    pub high_color: Rgb,
    pub interpolation: Interpolation,
    pub volume_compression: VolumeCompression,
    /// Compute mel bars (off for volume-only output)
    pub bars: bool,
    /// Copy the raw magnitudes into each record
    pub passthrough_frequency_data: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_bars: 100,
            volume_window_seconds: 10.0,
            musical_range_fraction: 0.6,
            min_bar_width_px: 2,
            low_color: Rgb::new(0x56, 0x30, 0xff),
            high_color: Rgb::new(0x59, 0xc9, 0xff),
            interpolation: Interpolation::Hsl,
            volume_compression: VolumeCompression::None,
            bars: true,
            passthrough_frequency_data: false,
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_bars == 0 {
            return Err(ConfigError::ZeroBars);
        }
        if !self.volume_window_seconds.is_finite() || self.volume_window_seconds <= 0.0 {
            return Err(ConfigError::InvalidWindow(self.volume_window_seconds));
        }
        let fraction = self.musical_range_fraction;
        if !fraction.is_finite() || fraction <= 0.0 || fraction > 1.0 {
            return Err(ConfigError::InvalidRange(fraction));
        }
        if self.min_bar_width_px == 0 {
            return Err(ConfigError::ZeroBarWidth);
        }
        Ok(())
    }

    pub fn gradient(&self) -> Gradient {
        Gradient::new(self.low_color, self.high_color, self.interpolation)
    }
}

/// Run one frame through the pipeline, updating `state`.
///
/// A missing frame produces no record; the caller draws its placeholder.
/// `available_width` is the adapter's drawable width in pixels, if it has one.
pub fn process(
    frame: Option<&FrequencyFrame>,
    config: &PipelineConfig,
    state: &mut HistoryState,
    available_width: Option<u32>,
) -> Option<FeatureRecord> {
    let Some(frame) = frame else {
        log::trace!("No frequency data this frame");
        return None;
    };

    let capacity = frame.history_capacity(config.volume_window_seconds);
    let volume = extract_volume(frame.magnitudes(), config.volume_compression);

    // Ratio against the window including this frame
    state.volume.update(volume, capacity);
    let avg_volume = state.volume.mean();
    let volume_ratio = if avg_volume > 0.0 { volume / avg_volume } else { 1.0 };

    let bars = if config.bars {
        Some(compute_bars(frame, config, &mut state.bars, capacity, available_width))
    } else {
        None
    };

    Some(FeatureRecord {
        volume,
        volume_ratio,
        frequency_data: config
            .passthrough_frequency_data
            .then(|| frame.magnitudes().to_vec()),
        bars,
    })
}

fn compute_bars(
    frame: &FrequencyFrame,
    config: &PipelineConfig,
    history: &mut BarHistory,
    capacity: usize,
    available_width: Option<u32>,
) -> Vec<Bar> {
    let musical = mel::musical_range(frame.magnitudes(), config.musical_range_fraction);
    let bar_count = mel::usable_bar_count(
        musical.len(),
        available_width,
        config.min_bar_width_px,
        config.max_bars,
    );
    if bar_count == 0 {
        log::debug!("No room for bars ({} bins, width {:?})", musical.len(), available_width);
        return Vec::new();
    }

    let musical: Vec<f32> = musical.iter().map(|&m| m as f32).collect();
    let raw = mel::resample(&musical, frame.sample_rate(), bar_count);

    history.ensure_bars(raw.len(), capacity);
    let gradient = config.gradient();

    raw.iter()
        .enumerate()
        .map(|(i, &value)| {
            let amplitude = history.update(i, value, capacity);
            let color = history
                .get(i)
                .map_or(gradient.low, |h| color_for(value, h, &gradient));
            Bar { amplitude, color }
        })
        .collect()
}

/// One pipeline instance with its own history. Two visualizers running side
/// by side each need their own `Visualizer`.
#[derive(Debug)]
pub struct Visualizer {
    config: PipelineConfig,
    state: HistoryState,
}

impl Visualizer {
    pub fn new(config: PipelineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: HistoryState::new(),
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn state(&self) -> &HistoryState {
        &self.state
    }

    pub fn process(
        &mut self,
        frame: Option<&FrequencyFrame>,
        available_width: Option<u32>,
    ) -> Option<FeatureRecord> {
        process(frame, &self.config, &mut self.state, available_width)
    }

    /// Validate raw capture output and process it. Malformed input drops the frame.
    pub fn process_raw(
        &mut self,
        magnitudes: Option<Vec<u8>>,
        sample_rate: f32,
        buffer_length: usize,
        available_width: Option<u32>,
    ) -> Option<FeatureRecord> {
        let frame = match FrequencyFrame::new(magnitudes?, sample_rate, buffer_length) {
            Ok(frame) => frame,
            Err(err) => {
                log::debug!("Dropping frame: {}", err);
                return None;
            }
        };
        self.process(Some(&frame), available_width)
    }
}
