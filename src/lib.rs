//! Audio feature extraction for bar visualizers.
//!
//! A [`FrequencyFrame`](audio::frame::FrequencyFrame) of byte magnitudes goes
//! through one [`Visualizer`](pipeline::Visualizer) per display, producing a
//! [`FeatureRecord`](audio::features::FeatureRecord) of loudness and
//! mel-spaced, smoothed, colored bars that a render adapter draws unchanged.

pub mod audio;
pub mod config;
pub mod encode;
pub mod pipeline;
pub mod render;

#[cfg(test)]
mod tests;
