pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod fireworks;
pub mod loaders;
pub mod math;
pub mod morph;

pub use config::MorphConfig;
pub use error::{LoadError, MorphError};
pub use loaders::{load_models, GltfSource, ModelRecord, ModelSource};
pub use morph::{MorphSession, NormalizedBuffer, TransitionMachine};
