use serde::{Deserialize, Serialize};

/// Loudness curve applied to the mean magnitude.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VolumeCompression {
    /// Linear mean, `mean / 255`.
    #[default]
    None,
    /// `sqrt(mean / 255)`: lifts quiet passages.
    Sqrt,
}

/// Single loudness value in [0, 1] for a frame of byte magnitudes. Empty input is silence.
pub fn extract_volume(magnitudes: &[u8], compression: VolumeCompression) -> f32 {
    if magnitudes.is_empty() {
        return 0.0;
    }
    let sum: u64 = magnitudes.iter().map(|&m| m as u64).sum();
    let raw = (sum as f64 / magnitudes.len() as f64 / 255.0) as f32;
    let volume = match compression {
        VolumeCompression::None => raw,
        VolumeCompression::Sqrt => raw.sqrt(),
    };
    volume.clamp(0.0, 1.0)
}
