use glam::Vec3;
use log::warn;

use crate::config::CameraConfig;
use crate::loaders::ModelRecord;
use crate::math::AABB;

/// Where the camera sits and what it looks at
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub target: Vec3,
}

impl CameraPose {
    pub fn lerp(&self, other: &CameraPose, t: f32) -> CameraPose {
        CameraPose {
            position: self.position.lerp(other.position, t),
            target: self.target.lerp(other.target, t),
        }
    }
}

/// Camera placement that fits one model on screen
#[derive(Debug, Clone, PartialEq)]
pub struct Framing {
    pub name: String,
    pub center: Vec3,
    pub size: Vec3,
    pub max_dimension: f32,
    pub optimal_distance: f32,
    pub direction: Vec3,
}

impl Framing {
    pub fn new(name: impl Into<String>, bounds: &AABB, direction: Vec3, camera: &CameraConfig) -> Self {
        let max_dimension = bounds.max_dimension();
        Self {
            name: name.into(),
            center: bounds.center(),
            size: bounds.size(),
            max_dimension,
            optimal_distance: optimal_distance(
                max_dimension,
                camera.fov_radians(),
                camera.distance_margin,
                camera.min_distance,
            ),
            direction,
        }
    }

    pub fn pose(&self) -> CameraPose {
        CameraPose {
            position: self.center + self.direction * self.optimal_distance,
            target: self.center,
        }
    }
}

/// Distance at which `max_dimension` fills the vertical field of view,
/// widened by `margin` and never closer than `min_distance`
pub fn optimal_distance(max_dimension: f32, fov_radians: f32, margin: f32, min_distance: f32) -> f32 {
    let fit = max_dimension / (2.0 * (fov_radians / 2.0).tan()) * margin;
    fit.max(min_distance)
}

/// One framing per model slot; models without bounds get `None`
pub fn frame_models(models: &[ModelRecord], camera: &CameraConfig) -> Vec<Option<Framing>> {
    models
        .iter()
        .enumerate()
        .map(|(slot, model)| match &model.bounding_box {
            Some(bounds) => Some(Framing::new(&model.name, bounds, camera.normal_for(slot), camera)),
            None => {
                warn!("Model {} ({}) has no bounding box, camera will hold", slot, model.name);
                None
            }
        })
        .collect()
}

/// Pose between two framings; `None` if either side is missing
pub fn blend_framings(current: Option<&Framing>, next: Option<&Framing>, t: f32) -> Option<CameraPose> {
    let (current, next) = (current?, next?);
    Some(current.pose().lerp(&next.pose(), t))
}

/// Timed move to a fixed pose with power2 in-out easing
#[derive(Debug, Clone, Copy)]
pub struct FocusTween {
    from: CameraPose,
    to: CameraPose,
    duration: f32,
    elapsed: f32,
}

impl FocusTween {
    pub fn new(from: CameraPose, to: CameraPose, duration: f32) -> Self {
        Self {
            from,
            to,
            duration: duration.max(f32::EPSILON),
            elapsed: 0.0,
        }
    }

    pub fn advance(&mut self, dt: f32) -> CameraPose {
        self.elapsed = (self.elapsed + dt).min(self.duration);
        self.from.lerp(&self.to, ease_power2_in_out(self.elapsed / self.duration))
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed >= self.duration
    }
}

pub fn ease_power2_in_out(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        2.0 * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
    }
}

/// Camera that eases toward a desired pose a fixed fraction per tick
#[derive(Debug, Clone)]
pub struct CameraRig {
    pose: CameraPose,
    damping: f32,
    tween: Option<FocusTween>,
}

impl CameraRig {
    pub fn new(pose: CameraPose, damping: f32) -> Self {
        Self {
            pose,
            damping,
            tween: None,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn is_focusing(&self) -> bool {
        self.tween.is_some()
    }

    pub fn focus(&mut self, to: CameraPose, duration: f32) {
        self.tween = Some(FocusTween::new(self.pose, to, duration));
    }

    /// A running focus tween wins over `desired`. With no desired pose the
    /// camera holds where it is.
    pub fn update(&mut self, dt: f32, desired: Option<CameraPose>) -> CameraPose {
        if let Some(tween) = self.tween.as_mut() {
            self.pose = tween.advance(dt);
            if tween.is_finished() {
                self.tween = None;
            }
        } else if let Some(desired) = desired {
            self.pose = self.pose.lerp(&desired, self.damping);
        }
        self.pose
    }
}
