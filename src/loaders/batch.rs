use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use glam::Vec3;
use log::{debug, info, warn};
use std::path::Path;

use crate::error::LoadError;
use crate::math::AABB;

/// Raw output of a model decoder: one position array per sub-mesh
#[derive(Debug, Clone, Default)]
pub struct DecodedModel {
    pub sub_meshes: Vec<Vec<Vec3>>,
    /// Bounds as declared by the asset, if it declares any
    pub bounds: Option<AABB>,
}

/// Decodes a model asset into positions. Loads run concurrently, so the
/// returned future must not block on its siblings.
pub trait ModelSource {
    fn load<'a>(&'a self, source_id: &'a str) -> BoxFuture<'a, Result<DecodedModel, LoadError>>;
}

/// One loaded model. Immutable once built.
#[derive(Debug, Clone)]
pub struct ModelRecord {
    /// Position in the caller's input list
    pub index: usize,
    pub name: String,
    pub bounding_box: Option<AABB>,
    pub positions: Vec<Vec3>,
}

impl ModelRecord {
    pub fn new(index: usize, name: impl Into<String>, positions: Vec<Vec3>) -> Self {
        let bounding_box = AABB::from_points(&positions);
        Self {
            index,
            name: name.into(),
            bounding_box,
            positions,
        }
    }

    /// Multi-part assets are merged and re-bounded; a single part keeps
    /// whatever bounds the decoder declared.
    pub fn from_decoded(index: usize, source_id: &str, decoded: DecodedModel) -> Self {
        let name = model_name(source_id);
        let DecodedModel { mut sub_meshes, bounds } = decoded;

        if sub_meshes.len() > 1 {
            let positions: Vec<Vec3> = sub_meshes.into_iter().flatten().collect();
            return Self::new(index, name, positions);
        }

        Self {
            index,
            name,
            bounding_box: bounds,
            positions: sub_meshes.pop().unwrap_or_default(),
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// `"./models/hello.glb"` -> `"hello"`
pub fn model_name(source_id: &str) -> String {
    Path::new(source_id)
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_id.to_string())
}

/// Result of a concurrent load, already restored to input order
#[derive(Debug)]
pub struct LoadBatch {
    pub outcomes: Vec<Result<ModelRecord, LoadError>>,
    /// Input indices in the order their loads finished
    pub completion_order: Vec<usize>,
}

impl LoadBatch {
    pub fn failures(&self) -> impl Iterator<Item = &LoadError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err())
    }

    /// Every model, or the first failure in input order
    pub fn all_loaded(self) -> Result<Vec<ModelRecord>, LoadError> {
        self.outcomes.into_iter().collect()
    }

    /// Successful models in input order; failures are logged and dropped
    pub fn into_models(self) -> Vec<ModelRecord> {
        self.outcomes
            .into_iter()
            .filter_map(|outcome| match outcome {
                Ok(record) => Some(record),
                Err(e) => {
                    warn!("Skipping model {:?}: {:#}", e.source_id, e.cause);
                    None
                }
            })
            .collect()
    }
}

/// Starts every load at once and waits for all of them. The returned
/// outcomes line up with `source_ids` no matter which load finished first.
pub async fn load_models<S, I>(source: &S, source_ids: &[I]) -> LoadBatch
where
    S: ModelSource + ?Sized,
    I: AsRef<str>,
{
    info!("Loading {} models", source_ids.len());

    let mut pending: FuturesUnordered<_> = source_ids
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let id = id.as_ref();
            source.load(id).map(move |result| (index, id, result))
        })
        .collect();

    let mut arrived = Vec::with_capacity(source_ids.len());
    let mut completion_order = Vec::with_capacity(source_ids.len());

    while let Some((index, id, result)) = pending.next().await {
        completion_order.push(index);

        let outcome = result.map(|decoded| ModelRecord::from_decoded(index, id, decoded));
        match &outcome {
            Ok(record) => debug!(
                "Model {} ({}) loaded: {} vertices",
                index,
                record.name,
                record.vertex_count()
            ),
            Err(e) => warn!("Model {} failed to load: {}", index, e),
        }
        arrived.push((index, outcome));
    }

    arrived.sort_by_key(|(index, _)| *index);

    LoadBatch {
        outcomes: arrived.into_iter().map(|(_, outcome)| outcome).collect(),
        completion_order,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_name_strips_dir_and_extension() {
        assert_eq!(model_name("./hello.glb"), "hello");
        assert_eq!(model_name("assets/models/cute.gltf"), "cute");
        assert_eq!(model_name("meet"), "meet");
    }

    #[test]
    fn test_single_part_keeps_declared_bounds() {
        let decoded = DecodedModel {
            sub_meshes: vec![vec![Vec3::ZERO, Vec3::ONE]],
            bounds: None,
        };

        let record = ModelRecord::from_decoded(3, "a.glb", decoded);

        assert_eq!(record.index, 3);
        assert_eq!(record.vertex_count(), 2);
        assert!(record.bounding_box.is_none());
    }

    #[test]
    fn test_multi_part_is_merged_and_rebounded() {
        let decoded = DecodedModel {
            sub_meshes: vec![
                vec![Vec3::new(-1.0, 0.0, 0.0)],
                vec![Vec3::new(2.0, 3.0, 4.0), Vec3::ZERO],
            ],
            bounds: Some(AABB::new(Vec3::ZERO, Vec3::ZERO)),
        };

        let record = ModelRecord::from_decoded(0, "b.glb", decoded);

        assert_eq!(
            record.positions,
            vec![Vec3::new(-1.0, 0.0, 0.0), Vec3::new(2.0, 3.0, 4.0), Vec3::ZERO]
        );
        let bounds = record.bounding_box.unwrap();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(2.0, 3.0, 4.0));
    }
}
