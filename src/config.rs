use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::audio::analysis::AnalyserConfig;
use crate::pipeline::color::{Interpolation, Rgb};
use crate::pipeline::volume::VolumeCompression;
use crate::pipeline::PipelineConfig;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub analyser: AnalyserConfig,
    #[serde(default)]
    pub pipeline: PipelineOverrides,
}

#[derive(Debug, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default = "default_fps")]
    pub fps: u32,
    #[serde(default = "default_crf")]
    pub crf: u32,
    #[serde(default = "default_codec")]
    pub codec: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: default_width(),
            height: default_height(),
            fps: default_fps(),
            crf: default_crf(),
            codec: default_codec(),
        }
    }
}

pub fn default_width() -> u32 { 1280 }
pub fn default_height() -> u32 { 720 }
pub fn default_fps() -> u32 { 60 }
pub fn default_crf() -> u32 { 18 }
pub fn default_codec() -> String { "libx264".into() }

/// `[pipeline]` table. Unset keys keep the backend profile's value.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PipelineOverrides {
    pub max_bars: Option<usize>,
    pub volume_window_seconds: Option<f32>,
    pub musical_range_fraction: Option<f32>,
    pub min_bar_width_px: Option<u32>,
    pub low_color: Option<Rgb>,
    pub high_color: Option<Rgb>,
    pub interpolation: Option<Interpolation>,
    pub volume_compression: Option<VolumeCompression>,
    pub passthrough_frequency_data: Option<bool>,
}

impl PipelineOverrides {
    pub fn apply(&self, mut base: PipelineConfig) -> PipelineConfig {
        if let Some(v) = self.max_bars { base.max_bars = v; }
        if let Some(v) = self.volume_window_seconds { base.volume_window_seconds = v; }
        if let Some(v) = self.musical_range_fraction { base.musical_range_fraction = v; }
        if let Some(v) = self.min_bar_width_px { base.min_bar_width_px = v; }
        if let Some(v) = self.low_color { base.low_color = v; }
        if let Some(v) = self.high_color { base.high_color = v; }
        if let Some(v) = self.interpolation { base.interpolation = v; }
        if let Some(v) = self.volume_compression { base.volume_compression = v; }
        if let Some(v) = self.passthrough_frequency_data { base.passthrough_frequency_data = v; }
        base
    }
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    parse_config(&content).with_context(|| format!("Failed to parse config: {}", path.display()))
}

pub fn parse_config(content: &str) -> Result<Config> {
    Ok(toml::from_str(content)?)
}

/// `./melbars.toml`, then `~/.config/melbars/config.toml`, then the platform config dir.
pub fn find_config_path() -> Option<PathBuf> {
    let local = PathBuf::from("melbars.toml");
    if local.exists() {
        return Some(local);
    }
    if let Some(home) = dirs::home_dir() {
        let xdg = home.join(".config").join("melbars").join("config.toml");
        if xdg.exists() {
            return Some(xdg);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        let platform = config_dir.join("melbars").join("config.toml");
        if platform.exists() {
            return Some(platform);
        }
    }
    None
}
