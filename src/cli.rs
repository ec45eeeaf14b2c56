use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use melbars::pipeline::volume::VolumeCompression;
use melbars::render::Backend;

#[derive(Parser, Debug)]
#[command(name = "melbars", about = "Mel-scaled audio bar visualizer")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG)
    pub input: Option<PathBuf>,

    /// Output file: a video for chart/meter, JSON lines for field
    #[arg(short, long, default_value = "output.mp4")]
    pub output: PathBuf,

    /// Render backend
    #[arg(short, long, value_enum, default_value_t = BackendArg::Chart)]
    pub backend: BackendArg,

    /// Config file (defaults to melbars.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Also write every feature record as JSON lines to this path
    #[arg(long)]
    pub features_out: Option<PathBuf>,

    /// Video width in pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,

    /// Video height in pixels
    #[arg(long, default_value_t = 720)]
    pub height: u32,

    /// Frames per second (one pipeline pass per frame)
    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// H.264 CRF quality (0-51, lower = better). Ignored when --bitrate is set.
    #[arg(long, default_value_t = 18)]
    pub crf: u32,

    /// Video bitrate (e.g. 2400k, 5M). When set, uses -b:v instead of -crf.
    #[arg(long)]
    pub bitrate: Option<String>,

    /// FFmpeg video codec
    #[arg(long, default_value = "libx264")]
    pub codec: String,

    /// FFmpeg pixel format
    #[arg(long, default_value = "yuv420p")]
    pub pix_fmt: String,

    /// Upper bound on bars per frame
    #[arg(long)]
    pub max_bars: Option<usize>,

    /// Loudness curve
    #[arg(long, value_enum)]
    pub volume_compression: Option<CompressionArg>,

    /// Share of the spectrum treated as musical content, in (0, 1]
    #[arg(long)]
    pub musical_range: Option<f32>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendArg {
    /// 2D bar chart video
    Chart,
    /// 3D bar field scene description (JSON lines)
    Field,
    /// 2D volume meter video
    Meter,
}

impl From<BackendArg> for Backend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Chart => Backend::Chart,
            BackendArg::Field => Backend::Field,
            BackendArg::Meter => Backend::Meter,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum CompressionArg {
    /// Linear mean
    None,
    /// Square root, lifts quiet passages
    Sqrt,
}

impl From<CompressionArg> for VolumeCompression {
    fn from(arg: CompressionArg) -> Self {
        match arg {
            CompressionArg::None => VolumeCompression::None,
            CompressionArg::Sqrt => VolumeCompression::Sqrt,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_backend_and_compression() {
        let cli = Cli::try_parse_from(["melbars", "song.wav", "-b", "field", "--volume-compression", "sqrt"]).unwrap();
        assert_eq!(Backend::from(cli.backend), Backend::Field);
        assert_eq!(cli.volume_compression.map(VolumeCompression::from), Some(VolumeCompression::Sqrt));

        let cli = Cli::try_parse_from(["melbars", "song.wav"]).unwrap();
        assert_eq!(Backend::from(cli.backend), Backend::Chart);
        assert!(cli.volume_compression.is_none());
        assert!(Cli::try_parse_from(["melbars", "-b", "spiral"]).is_err());
    }
}
