//! Scroll-driven morphing between particle clouds built from loaded models

pub mod camera;
pub mod input;
pub mod normalize;
pub mod scroll;
pub mod session;

pub use camera::{frame_models, optimal_distance, CameraPose, CameraRig, FocusTween, Framing};
pub use input::{InputQueue, InputScript, InputSender, ScrollInput, ScriptedInput, TouchTracker};
pub use normalize::{normalize_buffers, NormalizedBuffer};
pub use scroll::{smoothing_step, IndexChange, ScrollState, TickOutcome, TransitionMachine};
pub use session::{FrameOutput, MorphSession, MorphUniforms};
