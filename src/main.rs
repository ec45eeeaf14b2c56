mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufWriter;

use cli::Cli;
use melbars::audio::{analysis, decode};
use melbars::audio::frame::FrequencyFrame;
use melbars::config::{self, Config};
use melbars::encode::ffmpeg::{EncoderSettings, FfmpegEncoder};
use melbars::encode::jsonl::JsonLinesWriter;
use melbars::pipeline::{PipelineConfig, Visualizer};
use melbars::render::{Backend, BarChart2D, BarField3D, Canvas, RenderAdapter, Scene, VolumeMeter2D};

type FeatureSink = Option<JsonLinesWriter<BufWriter<File>>>;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut cli = Cli::parse();
    let backend = Backend::from(cli.backend);

    let file_config = match cli.config.clone().or_else(config::find_config_path) {
        Some(path) => match config::load_config(&path) {
            Ok(cfg) => {
                log::info!("Loaded config from {}", path.display());
                cfg
            }
            Err(err) => {
                log::warn!("Ignoring config: {:#}", err);
                Config::default()
            }
        },
        None => Config::default(),
    };
    // Config values apply only when the CLI is at its default
    if cli.width == config::default_width() { cli.width = file_config.output.width; }
    if cli.height == config::default_height() { cli.height = file_config.output.height; }
    if cli.fps == config::default_fps() { cli.fps = file_config.output.fps; }
    if cli.crf == config::default_crf() { cli.crf = file_config.output.crf; }
    if cli.codec == config::default_codec() { cli.codec = file_config.output.codec.clone(); }

    let input = cli.input.as_ref().context("Input audio file is required")?;
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }
    if cli.fps == 0 {
        anyhow::bail!("--fps must be at least 1");
    }

    let pipeline_config = pipeline_config(&cli, backend, &file_config);
    let mut visualizer = Visualizer::new(pipeline_config).context("Invalid pipeline configuration")?;

    log::info!("melbars - mel bar visualizer");
    log::info!("Input: {}", input.display());
    log::info!("Output: {}", cli.output.display());
    log::info!("Backend: {:?}, {}x{} @ {}fps", backend, cli.width, cli.height, cli.fps);

    log::info!("Decoding audio...");
    let audio = decode::decode_audio(input)?;

    log::info!("Analysing audio...");
    let frames = analysis::analyze(&audio, cli.fps, &file_config.analyser)
        .context("Invalid analyser configuration")?;
    log::info!("Total frames: {}, Duration: {:.1}s", frames.len(), audio.duration());

    let mut features_out: FeatureSink = cli
        .features_out
        .as_deref()
        .map(JsonLinesWriter::create)
        .transpose()?;

    if backend.renders_video() {
        let settings = EncoderSettings {
            width: cli.width,
            height: cli.height,
            fps: cli.fps,
            codec: cli.codec.clone(),
            pix_fmt: cli.pix_fmt.clone(),
            crf: cli.crf,
            bitrate: cli.bitrate.clone(),
        };
        log::info!("Starting FFmpeg encoder...");
        let mut encoder = FfmpegEncoder::new(&cli.output, input, &settings)?;
        let mut canvas = Canvas::new(cli.width, cli.height);
        let mut emit = |canvas: &Canvas| encoder.write_frame(canvas.pixels());

        if backend == Backend::Chart {
            let mut chart = BarChart2D::default();
            drive(&frames, &mut visualizer, &mut chart, &mut canvas, &mut features_out, &mut emit)?;
        } else {
            let mut meter = VolumeMeter2D::default();
            drive(&frames, &mut visualizer, &mut meter, &mut canvas, &mut features_out, &mut emit)?;
        }

        log::info!("Finishing encoding...");
        encoder.finish()?;
    } else {
        let mut scenes = JsonLinesWriter::create(&cli.output)?;
        let mut scene = Scene::default();
        let mut field = BarField3D::new();
        drive(
            &frames,
            &mut visualizer,
            &mut field,
            &mut scene,
            &mut features_out,
            &mut |scene: &Scene| scenes.write(scene),
        )?;
        scenes.finish()?;
    }

    if let Some(writer) = features_out {
        writer.finish()?;
    }

    log::info!("Done! Output: {}", cli.output.display());
    Ok(())
}

/// Backend profile, then the config file's `[pipeline]` table, then CLI flags.
fn pipeline_config(cli: &Cli, backend: Backend, file_config: &Config) -> PipelineConfig {
    let mut config = file_config.pipeline.apply(backend.profile().config());
    if let Some(max_bars) = cli.max_bars {
        config.max_bars = max_bars;
    }
    if let Some(compression) = cli.volume_compression {
        config.volume_compression = compression.into();
    }
    if let Some(fraction) = cli.musical_range {
        config.musical_range_fraction = fraction;
    }
    config
}

/// One pipeline pass and one draw per frame, in order.
fn drive<A, F>(
    frames: &[FrequencyFrame],
    visualizer: &mut Visualizer,
    adapter: &mut A,
    target: &mut A::Target,
    features_out: &mut FeatureSink,
    emit: &mut F,
) -> Result<()>
where
    A: RenderAdapter,
    F: FnMut(&A::Target) -> Result<()>,
{
    let pb = ProgressBar::new(frames.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} frames ({eta} remaining)")
            .context("Invalid progress template")?
            .progress_chars("=>-"),
    );

    for (frame_idx, frame) in frames.iter().enumerate() {
        let width = adapter.available_width(target);
        let features = visualizer.process(Some(frame), width);

        if let Some(writer) = features_out.as_mut() {
            writer.write_optional(features.as_ref())?;
        }

        adapter.draw(features.as_ref(), target);
        emit(target)?;
        pb.set_position(frame_idx as u64 + 1);
    }

    pb.finish_with_message("Rendering complete");
    Ok(())
}
