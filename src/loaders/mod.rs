pub mod batch;
pub mod gltf;

pub use self::batch::{load_models, model_name, DecodedModel, LoadBatch, ModelRecord, ModelSource};
pub use self::gltf::{load_gltf_positions, GltfSource};
