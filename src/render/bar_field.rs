use bytemuck::{Pod, Zeroable};
use serde::Serialize;

use super::RenderAdapter;
use crate::audio::features::FeatureRecord;

const BAR_WIDTH: f32 = 1.0;
const BAR_SPACING: f32 = 1.2;
const MAX_HEIGHT: f32 = 20.0;
const MIN_HEIGHT: f32 = 0.1;
const MIRROR_Z: f32 = -10.0;

/// One extruded box, laid out for direct upload as a GPU instance buffer.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable, Serialize)]
pub struct BoxInstance {
    pub position: [f32; 3],
    pub scale: [f32; 3],
    pub color: [f32; 3],
}

/// Scene state for an external 3D renderer. Persists across frames so a
/// frame without data keeps showing the last bars.
#[derive(Clone, Debug, Serialize)]
pub struct Scene {
    /// Front row first, then the mirrored back row
    pub boxes: Vec<BoxInstance>,
    pub light_intensity: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
}

impl Default for Scene {
    fn default() -> Self {
        Self {
            boxes: Vec::new(),
            light_intensity: 1.0,
            camera_position: [0.0, 20.0, 50.0],
            camera_target: [0.0, 0.0, 0.0],
        }
    }
}

impl Scene {
    pub fn front_row(&self) -> &[BoxInstance] {
        &self.boxes[..self.boxes.len() / 2]
    }

    pub fn back_row(&self) -> &[BoxInstance] {
        &self.boxes[self.boxes.len() / 2..]
    }

    pub fn instance_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.boxes)
    }
}

/// Two rows of boxes, front at z = 0 and a mirror at z = -10, centred on x = 0.
#[derive(Clone, Debug, Default)]
pub struct BarField3D;

impl BarField3D {
    pub fn new() -> Self {
        Self
    }
}

impl RenderAdapter for BarField3D {
    type Target = Scene;

    fn available_width(&self, _target: &Scene) -> Option<u32> {
        None
    }

    fn draw(&mut self, features: Option<&FeatureRecord>, scene: &mut Scene) {
        let Some(features) = features else {
            return;
        };
        let bars = features.bars.as_deref().unwrap_or_default();
        let count = bars.len();

        scene.light_intensity = (0.5 + features.volume_ratio).min(2.0);

        let row = |z: f32| {
            bars.iter().enumerate().map(move |(i, bar)| {
                let height = MIN_HEIGHT.max(bar.amplitude / 255.0 * MAX_HEIGHT);
                let x = (i as f32 - count as f32 / 2.0) * BAR_SPACING;
                BoxInstance {
                    position: [x, height / 2.0, z],
                    scale: [BAR_WIDTH, height, BAR_WIDTH],
                    color: bar.color.to_f32(),
                }
            })
        };

        scene.boxes.clear();
        scene.boxes.extend(row(0.0));
        scene.boxes.extend(row(MIRROR_Z));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::features::Bar;
    use crate::pipeline::color::Rgb;

    fn record(amplitudes: &[f32], ratio: f32) -> FeatureRecord {
        FeatureRecord {
            volume: 0.3,
            volume_ratio: ratio,
            frequency_data: None,
            bars: Some(
                amplitudes
                    .iter()
                    .map(|&amplitude| Bar { amplitude, color: Rgb::new(255, 0, 0) })
                    .collect(),
            ),
        }
    }

    #[test]
    fn builds_mirrored_rows() {
        let mut scene = Scene::default();
        BarField3D::new().draw(Some(&record(&[255.0, 0.0, 127.5, 51.0], 1.0)), &mut scene);
        assert_eq!(scene.boxes.len(), 8);

        let front = scene.front_row();
        assert_eq!(front[0].scale[1], 20.0);
        assert_eq!(front[0].position, [-2.0 * 1.2, 10.0, 0.0]);
        assert_eq!(front[1].scale[1], 0.1);
        assert!((front[2].scale[1] - 10.0).abs() < 1e-4);
        assert_eq!(front[0].color, [1.0, 0.0, 0.0]);

        let back = scene.back_row();
        for (f, b) in front.iter().zip(back) {
            assert_eq!(f.scale, b.scale);
            assert_eq!(b.position[2], -10.0);
        }
    }

    #[test]
    fn light_follows_volume_ratio() {
        let mut scene = Scene::default();
        let mut field = BarField3D::new();
        field.draw(Some(&record(&[1.0], 1.0)), &mut scene);
        assert_eq!(scene.light_intensity, 1.5);
        field.draw(Some(&record(&[1.0], 7.0)), &mut scene);
        assert_eq!(scene.light_intensity, 2.0);
    }

    #[test]
    fn keeps_last_scene_without_data() {
        let mut scene = Scene::default();
        let mut field = BarField3D::new();
        field.draw(Some(&record(&[100.0, 200.0], 1.0)), &mut scene);
        field.draw(None, &mut scene);
        assert_eq!(scene.boxes.len(), 4);
    }

    #[test]
    fn instance_bytes_are_tightly_packed() {
        let mut scene = Scene::default();
        BarField3D::new().draw(Some(&record(&[10.0, 20.0, 30.0], 1.0)), &mut scene);
        assert_eq!(std::mem::size_of::<BoxInstance>(), 36);
        assert_eq!(scene.instance_bytes().len(), 6 * 36);
    }
}
