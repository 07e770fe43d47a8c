// config.rs - Tunables for the morph scene, loadable from JSON
use anyhow::{Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::math::parse_hex_color;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MorphConfig {
    pub scroll: ScrollConfig,
    pub camera: CameraConfig,
    pub particles: ParticleConfig,
    pub touch: TouchConfig,
}

impl MorphConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        Self::from_json_str(&text).with_context(|| format!("Invalid config file: {:?}", path))
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: MorphConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            self.scroll.max > self.scroll.min,
            "scroll.max ({}) must exceed scroll.min ({})",
            self.scroll.max,
            self.scroll.min
        );
        anyhow::ensure!(
            self.scroll.smoothness > 0.0 && self.scroll.smoothness <= 1.0,
            "scroll.smoothness must be in (0, 1], got {}",
            self.scroll.smoothness
        );
        anyhow::ensure!(
            self.camera.fov_degrees > 0.0 && self.camera.fov_degrees < 180.0,
            "camera.fov_degrees must be in (0, 180), got {}",
            self.camera.fov_degrees
        );
        anyhow::ensure!(!self.camera.normals.is_empty(), "camera.normals must not be empty");
        anyhow::ensure!(
            parse_hex_color(&self.particles.color_a).is_some(),
            "particles.color_a is not a #rrggbb color: {}",
            self.particles.color_a
        );
        anyhow::ensure!(
            parse_hex_color(&self.particles.color_b).is_some(),
            "particles.color_b is not a #rrggbb color: {}",
            self.particles.color_b
        );
        Ok(())
    }
}

/// Scroll window: `value` lives in `[min, max]`, progress is its `[0, 1]` slice
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub min: f32,
    pub max: f32,
    pub sensitivity: f32,
    pub smoothness: f32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            min: -0.2,
            max: 1.2,
            sensitivity: 0.001,
            smoothness: 0.1,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub damping: f32,
    pub distance_margin: f32,
    pub min_distance: f32,
    pub default_position: [f32; 3],
    /// Viewing direction per model slot, reused cyclically
    pub normals: Vec<[f32; 3]>,
    pub focus_duration: f32,
}

impl CameraConfig {
    pub fn fov_radians(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    /// Zero when no normals are configured
    pub fn normal_for(&self, slot: usize) -> Vec3 {
        if self.normals.is_empty() {
            return Vec3::ZERO;
        }
        let n = self.normals[slot % self.normals.len()];
        Vec3::from_array(n).normalize_or_zero()
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 35.0,
            damping: 0.05,
            distance_margin: 1.2,
            min_distance: 2.0,
            default_position: [0.0, 0.0, 16.0],
            normals: vec![
                [-1.0, 0.0, 0.0],
                [0.0, 0.0, -1.0],
                [1.0, 0.0, 0.0],
                [0.0, 0.0, 1.0],
            ],
            focus_duration: 2.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    pub point_size: f32,
    pub max_size_scale: f32,
    pub color_a: String,
    pub color_b: String,
}

impl ParticleConfig {
    pub fn colors(&self) -> ([f32; 3], [f32; 3]) {
        let fallback = [1.0, 1.0, 1.0];
        (
            parse_hex_color(&self.color_a).unwrap_or(fallback),
            parse_hex_color(&self.color_b).unwrap_or(fallback),
        )
    }
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            point_size: 0.05,
            max_size_scale: 1.5,
            color_a: "#fdf5a0".to_string(),
            color_b: "#29a6ff".to_string(),
        }
    }
}

/// Touch drag and flick tuning, in pixels and milliseconds
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct TouchConfig {
    pub multiplier: f32,
    pub flick_ms: u64,
    pub flick_px: f32,
    pub inertia: f32,
}

impl Default for TouchConfig {
    fn default() -> Self {
        Self {
            multiplier: 5.0,
            flick_ms: 200,
            flick_px: 50.0,
            inertia: 0.3,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_scene() {
        let config = MorphConfig::default();
        assert_eq!(config.scroll.min, -0.2);
        assert_eq!(config.scroll.max, 1.2);
        assert_eq!(config.camera.fov_degrees, 35.0);
        assert_eq!(config.camera.normals.len(), 4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = MorphConfig::from_json_str(r#"{ "scroll": { "sensitivity": 0.01 } }"#).unwrap();
        assert_eq!(config.scroll.sensitivity, 0.01);
        assert_eq!(config.scroll.smoothness, 0.1);
        assert_eq!(config.particles.color_a, "#fdf5a0");
    }

    #[test]
    fn test_rejects_inverted_scroll_window() {
        let err = MorphConfig::from_json_str(r#"{ "scroll": { "min": 1.0, "max": 0.0 } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_rejects_bad_color() {
        let err = MorphConfig::from_json_str(r#"{ "particles": { "color_a": "blue" } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn test_normals_cycle() {
        let camera = CameraConfig::default();
        assert_eq!(camera.normal_for(0), Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(camera.normal_for(5), Vec3::new(0.0, 0.0, -1.0));
    }

    #[test]
    fn test_no_normals_gives_zero_direction() {
        let mut config = MorphConfig::default();
        config.camera.normals.clear();
        assert_eq!(config.camera.normal_for(3), Vec3::ZERO);
        assert!(config.validate().is_err());
    }
}
