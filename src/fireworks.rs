//! Procedural firework bursts: particles laid out along rays of a tilted
//! ellipse, sagging toward the rim.

use glam::Vec3;
use rand::Rng;

use crate::math::hsl_to_rgb;

/// Shape of the burst ellipse
#[derive(Debug, Clone, Copy)]
pub struct FireworkParams {
    /// Normal of the ellipse plane, need not be unit length
    pub normal: Vec3,
    /// Spin of the ellipse about its normal, radians
    pub rotation: f32,
    pub ray_count: u32,
    pub semi_major: f32,
    pub semi_minor: f32,
    /// Half thickness of the disc along its normal
    pub jitter: f32,
}

impl Default for FireworkParams {
    fn default() -> Self {
        Self {
            normal: Vec3::new(-0.12, 0.35, 0.25),
            rotation: 1.15,
            ray_count: 28,
            semi_major: 1.2,
            semi_minor: 0.6,
            jitter: 0.01,
        }
    }
}

impl FireworkParams {
    /// In-plane axes after applying `rotation`, plus the unit normal
    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let normal = self.normal.normalize_or_zero();
        let normal = if normal == Vec3::ZERO { Vec3::Z } else { normal };

        let right = Vec3::Y.cross(normal).normalize_or_zero();
        // Normal parallel to up: any horizontal axis will do
        let right = if right == Vec3::ZERO { Vec3::X } else { right };
        let up = normal.cross(right).normalize();

        let (sin, cos) = self.rotation.sin_cos();
        let rotated_right = right * cos + up * sin;
        let rotated_up = -right * sin + up * cos;

        (rotated_right, rotated_up, normal)
    }
}

/// Per-particle attributes of one burst
#[derive(Debug, Clone, Default)]
pub struct FireworkLayout {
    pub positions: Vec<Vec3>,
    pub sizes: Vec<f32>,
    pub time_multipliers: Vec<f32>,
}

impl FireworkLayout {
    pub fn generate<R: Rng + ?Sized>(count: usize, radius: f32, params: &FireworkParams, rng: &mut R) -> Self {
        let (right, up, normal) = params.basis();
        let ray_count = params.ray_count.max(1) as f32;
        let per_ray = count as f32 / ray_count;

        let mut layout = FireworkLayout {
            positions: Vec::with_capacity(count),
            sizes: Vec::with_capacity(count),
            time_multipliers: Vec::with_capacity(count),
        };

        for i in 0..count {
            let i = i as f32;
            let ray = (i / per_ray).floor();
            let along = (i % per_ray) / per_ray;

            let angle = ray / ray_count * std::f32::consts::TAU;
            // sqrt pushes more particles toward the rim
            let distance = (along.sqrt() * 0.8 + 0.3) * radius;

            let local_x = angle.cos() * distance * params.semi_major;
            let local_y = angle.sin() * distance * params.semi_minor;
            let local_z = (rng.gen::<f32>() - 0.5) * 2.0 * params.jitter;

            let world = right * local_x + up * local_y + normal * local_z;
            let sag = (world.length() * 0.4).powi(3);

            layout.positions.push(Vec3::new(world.x, world.y - sag, world.z));
            layout.sizes.push(rng.gen());
            layout.time_multipliers.push(1.0 + rng.gen::<f32>());
        }

        layout
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// One randomly placed burst as spawned by a click or tap
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FireworkBurst {
    pub count: usize,
    pub position: Vec3,
    pub size: f32,
    pub radius: f32,
    pub color: [f32; 3],
}

impl FireworkBurst {
    /// Seconds from launch until the burst is removed
    pub const LIFETIME: f32 = 8.0;

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let count = 2500 + rng.gen_range(0..200);
        let position = Vec3::new(
            (rng.gen::<f32>() - 0.5) * 1.5,
            rng.gen::<f32>() - 0.3,
            (rng.gen::<f32>() - 0.5) * 4.0,
        );

        Self {
            count,
            position,
            size: 0.08,
            radius: 1.0,
            color: hsl_to_rgb(rng.gen::<f32>(), 1.0, 0.75),
        }
    }

    pub fn layout<R: Rng + ?Sized>(&self, params: &FireworkParams, rng: &mut R) -> FireworkLayout {
        FireworkLayout::generate(self.count, self.radius, params, rng)
    }

    /// Linear animation progress after `elapsed` seconds
    pub fn progress_at(elapsed: f32) -> f32 {
        (elapsed / Self::LIFETIME).clamp(0.0, 1.0)
    }

    pub fn is_expired(elapsed: f32) -> bool {
        elapsed >= Self::LIFETIME
    }
}
