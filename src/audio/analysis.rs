use rayon::prelude::*;
use rustfft::{num_complex::Complex, Fft, FftPlanner};
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

use super::decode::AudioData;
use super::frame::FrequencyFrame;

#[derive(Debug, Error, PartialEq)]
pub enum AnalyserError {
    #[error("fft_size must be a power of two between 32 and 32768, got {0}")]
    FftSize(usize),
    #[error("smoothing_time_constant must be in [0, 1), got {0}")]
    Smoothing(f32),
    #[error("min_decibels ({min}) must be below max_decibels ({max})")]
    DecibelRange { min: f32, max: f32 },
    #[error("invalid sample rate: {0}")]
    SampleRate(u32),
}

/// Byte spectrum settings. Defaults match a browser analyser node with a 2048-point FFT.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct AnalyserConfig {
    pub fft_size: usize,
    pub smoothing_time_constant: f32,
    pub min_decibels: f32,
    pub max_decibels: f32,
}

impl Default for AnalyserConfig {
    fn default() -> Self {
        Self {
            fft_size: 2048,
            smoothing_time_constant: 0.8,
            min_decibels: -100.0,
            max_decibels: -30.0,
        }
    }
}

impl AnalyserConfig {
    pub fn validate(&self) -> Result<(), AnalyserError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(AnalyserError::FftSize(self.fft_size));
        }
        if !(0.0..1.0).contains(&self.smoothing_time_constant) {
            return Err(AnalyserError::Smoothing(self.smoothing_time_constant));
        }
        if !(self.min_decibels < self.max_decibels) {
            return Err(AnalyserError::DecibelRange {
                min: self.min_decibels,
                max: self.max_decibels,
            });
        }
        Ok(())
    }

    /// Bins per frame (`fft_size / 2`).
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }
}

/// Streaming analyser: feed the latest `fft_size` samples once per tick.
pub struct Analyser {
    config: AnalyserConfig,
    sample_rate: u32,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
    smoothed: Vec<f32>,
}

impl Analyser {
    pub fn new(config: AnalyserConfig, sample_rate: u32) -> Result<Self, AnalyserError> {
        config.validate()?;
        if sample_rate == 0 {
            return Err(AnalyserError::SampleRate(sample_rate));
        }
        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(config.fft_size);
        let window = blackman_window(config.fft_size);
        let smoothed = vec![0.0; config.bin_count()];
        Ok(Self {
            config,
            sample_rate,
            fft,
            window,
            smoothed,
        })
    }

    /// Analyse the most recent samples. Shorter input is zero padded at the front.
    pub fn tick(&mut self, recent: &[f32]) -> FrequencyFrame {
        let magnitudes = block_magnitudes(&*self.fft, &self.window, recent);
        smooth_into(&mut self.smoothed, &magnitudes, self.config.smoothing_time_constant);
        let bytes = to_bytes(&self.smoothed, &self.config);
        build_frame(bytes, self.sample_rate)
    }
}

/// Byte spectrum for every video frame of `audio`.
pub fn analyze(audio: &AudioData, fps: u32, config: &AnalyserConfig) -> Result<Vec<FrequencyFrame>, AnalyserError> {
    config.validate()?;
    if audio.sample_rate == 0 {
        return Err(AnalyserError::SampleRate(audio.sample_rate));
    }

    let samples = &audio.samples;
    let sr = audio.sample_rate;
    let duration = samples.len() as f32 / sr as f32;
    let total_frames = (duration * fps as f32).ceil() as usize;
    let samples_per_frame = sr as f32 / fps as f32;
    let window = blackman_window(config.fft_size);

    log::info!("Pass 1: FFT magnitudes ({} frames, fft_size={})...", total_frames, config.fft_size);
    let magnitudes: Vec<Vec<f32>> = (0..total_frames)
        .into_par_iter()
        .map_init(
            || FftPlanner::<f32>::new().plan_fft_forward(config.fft_size),
            |fft, frame_idx| {
                let end = (((frame_idx + 1) as f32 * samples_per_frame) as usize).min(samples.len());
                let start = end.saturating_sub(config.fft_size);
                block_magnitudes(&**fft, &window, &samples[start..end])
            },
        )
        .collect();

    log::info!(
        "Pass 2: Temporal smoothing & byte mapping (tau={:.2})...",
        config.smoothing_time_constant
    );
    let mut smoothed = vec![0.0f32; config.bin_count()];
    let frames = magnitudes
        .iter()
        .map(|mags| {
            smooth_into(&mut smoothed, mags, config.smoothing_time_constant);
            build_frame(to_bytes(&smoothed, config), sr)
        })
        .collect();

    Ok(frames)
}

fn build_frame(bytes: Vec<u8>, sample_rate: u32) -> FrequencyFrame {
    let len = bytes.len();
    // fft_size and sample rate are validated before any frame is built
    FrequencyFrame::new(bytes, sample_rate as f32, len).unwrap_or_else(|err| {
        unreachable!("analyser produced an invalid frame: {}", err)
    })
}

fn block_magnitudes(fft: &dyn Fft<f32>, window: &[f32], recent: &[f32]) -> Vec<f32> {
    let size = window.len();
    let take = recent.len().min(size);
    let offset = size - take;
    let tail = &recent[recent.len() - take..];

    let mut buffer = vec![Complex::new(0.0f32, 0.0); size];
    for (i, &s) in tail.iter().enumerate() {
        buffer[offset + i] = Complex::new(s * window[offset + i], 0.0);
    }
    fft.process(&mut buffer);

    let scale = 1.0 / size as f32;
    buffer[..size / 2].iter().map(|c| c.norm() * scale).collect()
}

fn smooth_into(smoothed: &mut [f32], magnitudes: &[f32], tau: f32) {
    for (s, &m) in smoothed.iter_mut().zip(magnitudes) {
        let next = tau * *s + (1.0 - tau) * m;
        *s = if next.is_finite() { next } else { 0.0 };
    }
}

fn to_bytes(smoothed: &[f32], config: &AnalyserConfig) -> Vec<u8> {
    let range = config.max_decibels - config.min_decibels;
    smoothed
        .iter()
        .map(|&m| {
            if m <= 0.0 {
                return 0;
            }
            let db = 20.0 * m.log10();
            let scaled = (255.0 / range * (db - config.min_decibels)).floor();
            scaled.clamp(0.0, 255.0) as u8
        })
        .collect()
}

fn blackman_window(size: usize) -> Vec<f32> {
    let n = size as f32;
    (0..size)
        .map(|i| {
            let x = 2.0 * std::f32::consts::PI * i as f32 / n;
            0.42 - 0.5 * x.cos() + 0.08 * (2.0 * x).cos()
        })
        .collect()
}
