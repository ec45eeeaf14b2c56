//! Render adapters. Each one draws a `FeatureRecord` as-is: amplitudes and
//! colors come from the pipeline and are never recomputed here.

pub mod bar_chart;
pub mod bar_field;
pub mod canvas;
pub mod volume_meter;

use crate::audio::features::FeatureRecord;
use crate::pipeline::Profile;

pub use bar_chart::BarChart2D;
pub use bar_field::{BarField3D, BoxInstance, Scene};
pub use canvas::Canvas;
pub use volume_meter::VolumeMeter2D;

pub trait RenderAdapter {
    type Target;

    /// Width in pixels the pipeline may spread bars over, if the target has one.
    fn available_width(&self, target: &Self::Target) -> Option<u32>;

    /// Draw one frame. `None` means the pipeline had no data this tick.
    fn draw(&mut self, features: Option<&FeatureRecord>, target: &mut Self::Target);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// 2D bar chart video
    Chart,
    /// 3D bar field scene description (JSON lines)
    Field,
    /// 2D volume meter video
    Meter,
}

impl Backend {
    pub fn profile(self) -> Profile {
        match self {
            Backend::Chart => Profile::Chart,
            Backend::Field => Profile::Field,
            Backend::Meter => Profile::Meter,
        }
    }

    pub fn renders_video(self) -> bool {
        !matches!(self, Backend::Field)
    }
}

pub(crate) fn hex_rgba(hex: u32, alpha: u8) -> [u8; 4] {
    [(hex >> 16) as u8, (hex >> 8) as u8, hex as u8, alpha]
}
