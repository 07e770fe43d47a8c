use glam::Vec3;
use log::{debug, info};
use rand::Rng;

use super::camera::{blend_framings, frame_models, CameraPose, CameraRig, Framing};
use super::input::{InputQueue, InputSender, ScrollInput, TouchTracker};
use super::normalize::{normalize_buffers, NormalizedBuffer};
use super::scroll::{IndexChange, TransitionMachine};
use crate::config::MorphConfig;
use crate::error::MorphError;
use crate::loaders::ModelRecord;

/// Uniform block for the particle shader
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MorphUniforms {
    pub progress: f32,
    pub point_size: f32,
    pub resolution: [f32; 2],
    pub color_a: [f32; 3],
    pub _pad1: f32,
    pub color_b: [f32; 3],
    pub _pad2: f32,
}

/// What the renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct FrameOutput<'a> {
    pub current: &'a NormalizedBuffer,
    pub next: &'a NormalizedBuffer,
    pub progress: f32,
    pub point_size: f32,
    pub index: usize,
    pub next_index: usize,
    /// Set when the buffer pair changed this tick
    pub change: Option<IndexChange>,
    pub camera: CameraPose,
}

/// Owns all per-scene state. Created once models are loaded, updated once
/// per display tick, disposed when the scene goes away.
#[derive(Debug)]
pub struct MorphSession {
    config: MorphConfig,
    names: Vec<String>,
    buffers: Vec<NormalizedBuffer>,
    sizes: Vec<f32>,
    framings: Vec<Option<Framing>>,
    machine: TransitionMachine,
    touch: TouchTracker,
    queue: InputQueue,
    rig: CameraRig,
    disposed: bool,
}

impl MorphSession {
    pub fn init<R: Rng + ?Sized>(
        models: &[ModelRecord],
        config: MorphConfig,
        rng: &mut R,
    ) -> Result<Self, MorphError> {
        config
            .validate()
            .map_err(|e| MorphError::InvalidConfig(format!("{:#}", e)))?;
        let machine = TransitionMachine::new(models.len(), &config.scroll)?;

        let sources: Vec<&[Vec3]> = models.iter().map(|m| m.positions.as_slice()).collect();
        let buffers = normalize_buffers(&sources, rng)?;
        let particle_count = buffers.first().map_or(0, NormalizedBuffer::len);

        let max_scale = config.particles.max_size_scale;
        let sizes = (0..particle_count).map(|_| rng.gen::<f32>() * max_scale).collect();

        let framings = frame_models(models, &config.camera);
        let start = match framings.first() {
            Some(Some(framing)) => framing.pose(),
            _ => CameraPose {
                position: Vec3::from_array(config.camera.default_position),
                target: Vec3::ZERO,
            },
        };
        let rig = CameraRig::new(start, config.camera.damping);

        info!(
            "Morph session ready: {} models, {} particles each",
            models.len(),
            particle_count
        );

        Ok(Self {
            names: models.iter().map(|m| m.name.clone()).collect(),
            touch: TouchTracker::new(config.touch),
            config,
            buffers,
            sizes,
            framings,
            machine,
            queue: InputQueue::new(),
            rig,
            disposed: false,
        })
    }

    /// Handle for input producers. Inputs are applied on the next `update`.
    pub fn input_sender(&self) -> InputSender {
        self.queue.sender()
    }

    pub fn update(&mut self, dt: f32) -> Result<FrameOutput<'_>, MorphError> {
        if self.disposed {
            return Err(MorphError::Disposed);
        }

        for input in self.queue.drain() {
            if let Some(delta) = self.touch.handle(input) {
                self.machine.scroll_by(delta);
            }
        }

        let outcome = self.machine.tick();
        if outcome.change.is_some() {
            debug!(
                "Now morphing {} -> {}",
                self.names[outcome.index], self.names[outcome.next_index]
            );
        }

        let desired = blend_framings(
            self.framings[outcome.index].as_ref(),
            self.framings[outcome.next_index].as_ref(),
            self.machine.section_progress(),
        );
        let camera = self.rig.update(dt, desired);

        Ok(FrameOutput {
            current: &self.buffers[outcome.index],
            next: &self.buffers[outcome.next_index],
            progress: outcome.progress,
            point_size: self.config.particles.point_size,
            index: outcome.index,
            next_index: outcome.next_index,
            change: outcome.change,
            camera,
        })
    }

    /// Applies one input immediately, bypassing the queue
    pub fn apply_input(&mut self, input: ScrollInput) {
        if let Some(delta) = self.touch.handle(input) {
            self.machine.scroll_by(delta);
        }
    }

    /// Tweens the camera onto one model. False if the slot has no framing.
    pub fn focus_on(&mut self, slot: usize) -> bool {
        let Some(Some(framing)) = self.framings.get(slot) else {
            return false;
        };
        self.rig.focus(framing.pose(), self.config.camera.focus_duration);
        true
    }

    pub fn uniforms(&self, resolution: [f32; 2]) -> MorphUniforms {
        let (color_a, color_b) = self.config.particles.colors();
        MorphUniforms {
            progress: self.machine.progress(),
            point_size: self.config.particles.point_size,
            resolution,
            color_a,
            _pad1: 0.0,
            color_b,
            _pad2: 0.0,
        }
    }

    /// Drops the particle buffers. Further updates fail.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.buffers = Vec::new();
        self.sizes = Vec::new();
        self.disposed = true;
        info!("Morph session disposed");
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn machine(&self) -> &TransitionMachine {
        &self.machine
    }

    pub fn camera(&self) -> CameraPose {
        self.rig.pose()
    }

    pub fn buffers(&self) -> &[NormalizedBuffer] {
        &self.buffers
    }

    /// Per-particle size scale in `[0, max_size_scale)`
    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn framings(&self) -> &[Option<Framing>] {
        &self.framings
    }

    pub fn model_names(&self) -> &[String] {
        &self.names
    }

    pub fn particle_count(&self) -> usize {
        self.sizes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn models() -> Vec<ModelRecord> {
        vec![
            ModelRecord::new(0, "a", vec![Vec3::ZERO, Vec3::ONE]),
            ModelRecord::new(1, "b", vec![Vec3::splat(2.0); 5]),
            ModelRecord::new(2, "c", vec![-Vec3::ONE, Vec3::X, Vec3::Y]),
        ]
    }

    fn session() -> MorphSession {
        MorphSession::init(&models(), MorphConfig::default(), &mut StdRng::seed_from_u64(3)).unwrap()
    }

    #[test]
    fn test_init_normalizes_and_sizes() {
        let s = session();
        assert_eq!(s.particle_count(), 5);
        assert!(s.buffers().iter().all(|b| b.len() == 5));
        assert!(s.sizes().iter().all(|&v| (0.0..1.5).contains(&v)));
        assert_eq!(s.model_names(), &["a", "b", "c"]);
    }

    #[test]
    fn test_single_model_rejected() {
        let one = vec![ModelRecord::new(0, "solo", vec![Vec3::ZERO])];
        let err = MorphSession::init(&one, MorphConfig::default(), &mut StdRng::seed_from_u64(0));
        assert_eq!(err.unwrap_err(), MorphError::TooFewModels(1));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = MorphConfig::default();
        config.camera.normals.clear();
        let err = MorphSession::init(&models(), config, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, MorphError::InvalidConfig(ref msg) if msg.contains("normals")));

        let mut config = MorphConfig::default();
        config.scroll.max = config.scroll.min;
        let err = MorphSession::init(&models(), config, &mut StdRng::seed_from_u64(0)).unwrap_err();
        assert!(matches!(err, MorphError::InvalidConfig(_)));
    }

    #[test]
    fn test_camera_starts_on_first_model() {
        let s = session();
        assert_eq!(s.camera(), s.framings()[0].as_ref().unwrap().pose());

        let mut unbounded = models();
        unbounded[0].bounding_box = None;
        let s = MorphSession::init(&unbounded, MorphConfig::default(), &mut StdRng::seed_from_u64(3)).unwrap();
        assert_eq!(s.camera().position, Vec3::new(0.0, 0.0, 16.0));
        assert_eq!(s.camera().target, Vec3::ZERO);
    }

    #[test]
    fn test_queued_inputs_apply_on_update() {
        let mut s = session();
        let sender = s.input_sender();
        sender.send(ScrollInput::Wheel { delta_y: 300.0 });

        // Nothing moves until the session ticks
        assert_eq!(s.machine().scroll().target, 0.0);

        let frame = s.update(1.0 / 60.0).unwrap();
        assert_eq!(frame.index, 0);
        assert_eq!(frame.next_index, 1);
        assert!((frame.progress - 0.03).abs() < 1e-5);
        assert_eq!(frame.current.len(), 5);
    }

    #[test]
    fn test_uniform_block_layout() {
        let s = session();
        let uniforms = s.uniforms([800.0, 600.0]);
        assert_eq!(std::mem::size_of::<MorphUniforms>(), 48);
        assert_eq!(bytemuck::bytes_of(&uniforms).len(), 48);
        assert_eq!(uniforms.point_size, 0.05);
    }

    #[test]
    fn test_dispose_stops_updates() {
        let mut s = session();
        s.dispose();
        assert!(s.is_disposed());
        assert!(s.buffers().is_empty());
        assert_eq!(s.update(0.016).unwrap_err(), MorphError::Disposed);
    }

    #[test]
    fn test_focus_on_unknown_slot() {
        let mut s = session();
        assert!(!s.focus_on(9));
        assert!(s.focus_on(2));
    }
}
