use crate::audio::analysis::{self, AnalyserConfig};
use crate::audio::decode::AudioData;
use crate::audio::frame::FrequencyFrame;
use crate::pipeline::history::BarHistory;
use crate::pipeline::volume::VolumeCompression;
use crate::pipeline::{PipelineConfig, Profile, Visualizer};
use crate::render::{BarChart2D, BarField3D, Canvas, RenderAdapter, Scene};

fn uniform(value: u8) -> FrequencyFrame {
    FrequencyFrame::new(vec![value; 1024], 44100.0, 1024).unwrap()
}

#[test]
fn uniform_spectrum_gives_uniform_bars() {
    let mut vis = Visualizer::new(Profile::Field.config()).unwrap();
    let record = vis.process(Some(&uniform(128)), None).unwrap();

    assert!((record.volume - 128.0 / 255.0).abs() < 1e-4);
    assert_eq!(record.bar_count(), 100);
    for amplitude in record.amplitudes() {
        assert!((amplitude - 128.0).abs() < 1e-3, "bar at {}", amplitude);
    }

    let sqrt = PipelineConfig {
        volume_compression: VolumeCompression::Sqrt,
        ..Profile::Field.config()
    };
    let mut vis = Visualizer::new(sqrt).unwrap();
    let record = vis.process(Some(&uniform(128)), None).unwrap();
    assert!((record.volume - 0.7085).abs() < 1e-3);
}

#[test]
fn chart_profile_keeps_uniform_bars_over_musical_range() {
    let mut vis = Visualizer::new(Profile::Chart.config()).unwrap();
    let record = vis.process(Some(&uniform(128)), Some(1280)).unwrap();
    assert_eq!(record.bar_count(), 100);
    assert!(record.amplitudes().iter().all(|a| (a - 128.0).abs() < 1e-3));
}

#[test]
fn silence_maps_to_low_color() {
    for profile in [Profile::Chart, Profile::Field] {
        let config = profile.config();
        let low = config.low_color;
        let mut vis = Visualizer::new(config).unwrap();
        for _ in 0..3 {
            let record = vis.process(Some(&uniform(0)), None).unwrap();
            assert_eq!(record.volume, 0.0);
            assert!(record.amplitudes().iter().all(|&a| a == 0.0));
            assert!(record.colors().iter().all(|&c| c == low));
        }
    }
}

#[test]
fn history_keeps_last_capacity_values() {
    let mut bars = BarHistory::new();
    bars.ensure_bars(1, 10);
    let mut smoothed = 0.0;
    for value in 1..=15 {
        smoothed = bars.update(0, value as f32, 10);
    }
    let kept: Vec<f32> = bars.get(0).unwrap().iter().collect();
    let expected: Vec<f32> = (6..=15).map(|v| v as f32).collect();
    assert_eq!(kept, expected);
    assert_eq!(smoothed, 14.5);
}

#[test]
fn every_bar_history_is_bounded_fifo() {
    // 0.1 s over 1024-sample frames at 44.1 kHz rounds to 4 frames
    let config = PipelineConfig {
        volume_window_seconds: 0.1,
        ..Profile::Field.config()
    };
    let mut vis = Visualizer::new(config).unwrap();
    for value in 1..=7u8 {
        vis.process(Some(&uniform(value * 10)), None);
    }

    let state = vis.state();
    assert_eq!(state.bars.len(), 100);
    for bar in 0..state.bars.len() {
        let kept: Vec<f32> = state.bars.get(bar).unwrap().iter().collect();
        assert_eq!(kept, vec![40.0, 50.0, 60.0, 70.0], "bar {}", bar);
    }
    assert_eq!(state.volume.history().len(), 4);
}

#[test]
fn first_frame_is_not_smoothed() {
    let mut vis = Visualizer::new(Profile::Field.config()).unwrap();
    let first = vis.process(Some(&uniform(90)), None).unwrap();
    assert!(first.amplitudes().iter().all(|&a| a == 90.0));
    let second = vis.process(Some(&uniform(30)), None).unwrap();
    assert!(second.amplitudes().iter().all(|&a| a == 60.0));
}

#[test]
fn both_adapters_draw_the_same_record() {
    let mut vis = Visualizer::new(Profile::Chart.config()).unwrap();
    let mut canvas = Canvas::new(320, 180);
    let mut chart = BarChart2D::default();
    let width = chart.available_width(&canvas);
    let record = vis.process(Some(&uniform(200)), width).unwrap();

    chart.draw(Some(&record), &mut canvas);
    let mut scene = Scene::default();
    let mut field = BarField3D::new();
    field.draw(Some(&record), &mut scene);

    assert_eq!(scene.front_row().len(), record.bar_count());
    for (instance, bar) in scene.front_row().iter().zip(record.bars.as_deref().unwrap()) {
        assert_eq!(instance.color, bar.color.to_f32());
    }
    // Bars fill the lower part of the canvas, the top row stays background
    assert_eq!(canvas.pixel(5, 0), Some([0, 0, 0, 255]));
    assert_ne!(canvas.pixel(5, 150), Some([0, 0, 0, 255]));
}

#[test]
fn synthetic_tone_runs_end_to_end() {
    let sample_rate = 44100;
    let samples: Vec<f32> = (0..sample_rate)
        .map(|i| 0.01 * (2.0 * std::f32::consts::PI * 1000.0 * i as f32 / sample_rate as f32).sin())
        .collect();
    let audio = AudioData { samples, sample_rate: sample_rate as u32 };

    let frames = analysis::analyze(&audio, 30, &AnalyserConfig::default()).unwrap();
    assert_eq!(frames.len(), 30);

    let mut vis = Visualizer::new(Profile::Chart.config()).unwrap();
    let mut last = None;
    for frame in &frames {
        last = vis.process(Some(frame), Some(1280));
    }
    let record = last.unwrap();
    assert_eq!(record.bar_count(), 100);
    assert!(record.volume > 0.0 && record.volume <= 1.0);
    assert!(record.amplitudes().iter().all(|&a| (0.0..=255.0).contains(&a)));
}

#[test]
fn sub_audible_sample_rate_gives_silent_bars() {
    let mut vis = Visualizer::new(Profile::Field.config()).unwrap();
    let frame = FrequencyFrame::new(vec![200; 1024], 30.0, 1024).unwrap();
    let record = vis.process(Some(&frame), None).unwrap();
    assert_eq!(record.bar_count(), 100);
    assert!(record.amplitudes().iter().all(|&a| a == 0.0));
    assert!((record.volume - 200.0 / 255.0).abs() < 1e-4);
}
