//! Linear FFT bins to mel-spaced bars.

const MIN_FREQ: f32 = 20.0;
const MAX_FREQ: f32 = 20000.0;

pub fn hz_to_mel(hz: f32) -> f32 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

pub fn mel_to_hz(mel: f32) -> f32 {
    700.0 * (10f32.powf(mel / 2595.0) - 1.0)
}

/// Leading `floor(len * fraction)` entries of the spectrum.
pub fn musical_range(magnitudes: &[u8], fraction: f32) -> &[u8] {
    let end = (magnitudes.len() as f32 * fraction.clamp(0.0, 1.0)).floor() as usize;
    &magnitudes[..end.min(magnitudes.len())]
}

/// Bars the frame can support: bounded by the data, the render width and `max_bars`.
pub fn usable_bar_count(
    data_len: usize,
    available_width: Option<u32>,
    min_bar_width: u32,
    max_bars: usize,
) -> usize {
    let by_width = match available_width {
        Some(width) if min_bar_width > 0 => (width / min_bar_width) as usize,
        _ => usize::MAX,
    };
    data_len.min(by_width).min(max_bars)
}

/// Average the bins inside each of `bar_count` equal-width mel bands between
/// 20 Hz and `min(nyquist, 20 kHz)`.
///
/// When there are no more bins than bars the data is returned as is.
pub fn resample(musical: &[f32], sample_rate: f32, bar_count: usize) -> Vec<f32> {
    if musical.len() <= bar_count {
        return musical.to_vec();
    }

    let nyquist = sample_rate / 2.0;
    let freq_per_bin = nyquist / musical.len() as f32;
    let min_mel = hz_to_mel(MIN_FREQ);
    let max_mel = hz_to_mel(nyquist.min(MAX_FREQ));
    if !(max_mel > min_mel) {
        // Nothing audible below nyquist
        return vec![0.0; bar_count];
    }
    let mel_step = (max_mel - min_mel) / bar_count as f32;

    (0..bar_count)
        .map(|i| {
            let low_hz = mel_to_hz(min_mel + i as f32 * mel_step);
            let high_hz = mel_to_hz(min_mel + (i + 1) as f32 * mel_step);

            let start = ((low_hz / freq_per_bin).floor().max(0.0) as usize).min(musical.len());
            let end = ((high_hz / freq_per_bin).ceil().max(0.0) as usize).min(musical.len());

            mean(&musical[start..end.max(start)])
        })
        .collect()
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f32>() / values.len() as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mel_is_strictly_increasing() {
        let mut prev = hz_to_mel(20.0);
        let mut f = 30.0;
        while f <= 20000.0 {
            let m = hz_to_mel(f);
            assert!(m > prev, "mel({}) = {} not above {}", f, m, prev);
            prev = m;
            f += 10.0;
        }
    }

    #[test]
    fn mel_round_trip() {
        for &f in &[20.0f32, 100.0, 440.0, 1000.0, 4000.0, 12345.0, 20000.0] {
            let back = mel_to_hz(hz_to_mel(f));
            assert!((back - f).abs() <= f * 1e-4, "{} -> {}", f, back);
        }
    }

    #[test]
    fn musical_range_truncates() {
        let data = [1u8; 1024];
        assert_eq!(musical_range(&data, 0.6).len(), 614);
        assert_eq!(musical_range(&data, 1.0).len(), 1024);
    }

    #[test]
    fn bar_count_bounds() {
        assert_eq!(usable_bar_count(614, Some(400), 2, 100), 100);
        assert_eq!(usable_bar_count(614, Some(100), 2, 100), 50);
        assert_eq!(usable_bar_count(40, None, 2, 100), 40);
        assert_eq!(usable_bar_count(614, None, 2, 150), 150);
    }

    #[test]
    fn resample_shape_and_range() {
        let data: Vec<f32> = (0..1024).map(|i| (i % 256) as f32).collect();
        let bars = resample(&data, 44100.0, 100);
        assert_eq!(bars.len(), 100);
        assert!(bars.iter().all(|&b| (0.0..=255.0).contains(&b)));
    }

    #[test]
    fn uniform_spectrum_gives_uniform_bars() {
        let data = vec![128.0f32; 1024];
        let bars = resample(&data, 44100.0, 100);
        for b in bars {
            assert!((b - 128.0).abs() < 1e-3);
        }
    }

    #[test]
    fn short_data_passes_through() {
        let data = vec![3.0f32, 7.0, 11.0];
        assert_eq!(resample(&data, 44100.0, 3), data);
        assert_eq!(resample(&data, 44100.0, 10), data);
    }

    #[test]
    fn low_nyquist_spans_whole_spectrum() {
        // 16 kHz: bands stop at 8 kHz, so every bar still finds bins
        let bars = resample(&vec![128.0f32; 1024], 16000.0, 100);
        assert_eq!(bars.len(), 100);
        assert!(bars.iter().all(|&b| (b - 128.0).abs() < 1e-3));

        let mut top_only = vec![0.0f32; 1024];
        top_only[1023] = 255.0;
        let bars = resample(&top_only, 16000.0, 100);
        assert!(bars[99] > 0.0);
        assert!(bars[..90].iter().all(|&b| b == 0.0));
    }

    #[test]
    fn nyquist_below_audible_range_is_silent() {
        let bars = resample(&vec![200.0f32; 1024], 30.0, 100);
        assert_eq!(bars, vec![0.0; 100]);
        let bars = resample(&vec![200.0f32; 1024], 0.0, 100);
        assert_eq!(bars, vec![0.0; 100]);
    }

    #[test]
    fn low_bands_weight_low_bins() {
        // Energy only in the lowest 5% of bins should light up far more than
        // 5% of the bars.
        let mut data = vec![0.0f32; 1024];
        for v in data.iter_mut().take(51) {
            *v = 200.0;
        }
        let bars = resample(&data, 44100.0, 100);
        let lit = bars.iter().filter(|&&b| b > 0.0).count();
        assert!(lit > 20, "only {} bars lit", lit);
    }
}
