use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum FrameError {
    #[error("frame has no magnitudes")]
    Empty,
    #[error("invalid sample rate: {0}")]
    InvalidSampleRate(f32),
    #[error("buffer length {expected} does not match {actual} magnitudes")]
    LengthMismatch { expected: usize, actual: usize },
}

/// Upper bound on history length, whatever the frame rate. A 10 s window at
/// 60 frames per second needs 600.
pub const MAX_HISTORY_FRAMES: usize = 1 << 16;

/// One tick of byte frequency magnitudes, ordered low to high frequency.
#[derive(Clone, Debug)]
pub struct FrequencyFrame {
    magnitudes: Vec<u8>,
    sample_rate: f32,
    buffer_length: usize,
}

impl FrequencyFrame {
    pub fn new(magnitudes: Vec<u8>, sample_rate: f32, buffer_length: usize) -> Result<Self, FrameError> {
        if magnitudes.is_empty() || buffer_length == 0 {
            return Err(FrameError::Empty);
        }
        if !sample_rate.is_finite() || sample_rate <= 0.0 {
            return Err(FrameError::InvalidSampleRate(sample_rate));
        }
        if magnitudes.len() != buffer_length {
            return Err(FrameError::LengthMismatch {
                expected: buffer_length,
                actual: magnitudes.len(),
            });
        }
        Ok(Self {
            magnitudes,
            sample_rate,
            buffer_length,
        })
    }

    pub fn magnitudes(&self) -> &[u8] {
        &self.magnitudes
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    pub fn buffer_length(&self) -> usize {
        self.buffer_length
    }

    pub fn nyquist(&self) -> f32 {
        self.sample_rate / 2.0
    }

    /// Seconds of audio represented by one frame (`buffer_length / sample_rate`).
    pub fn frame_duration(&self) -> f32 {
        self.buffer_length as f32 / self.sample_rate
    }

    /// Number of frames that fit in `window_seconds`, rounded, between 1 and
    /// [`MAX_HISTORY_FRAMES`].
    pub fn history_capacity(&self, window_seconds: f32) -> usize {
        let frames = (window_seconds / self.frame_duration()).round();
        if frames.is_finite() && frames >= 1.0 {
            (frames as usize).min(MAX_HISTORY_FRAMES)
        } else if frames.is_infinite() && frames > 0.0 {
            MAX_HISTORY_FRAMES
        } else {
            1
        }
    }

    pub fn into_magnitudes(self) -> Vec<u8> {
        self.magnitudes
    }
}
