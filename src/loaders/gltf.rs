use anyhow::{Context, Result};
use futures::channel::oneshot;
use futures::future::BoxFuture;
use glam::{Mat4, Vec3};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::thread;

use super::batch::{DecodedModel, ModelSource};
use crate::error::LoadError;
use crate::math::AABB;

/// Loads `.gltf` / `.glb` files from disk, relative to an optional base directory
#[derive(Debug, Clone, Default)]
pub struct GltfSource {
    base_dir: Option<PathBuf>,
}

impl GltfSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: Some(base_dir.into()),
        }
    }

    fn resolve(&self, source_id: &str) -> PathBuf {
        match &self.base_dir {
            Some(dir) => dir.join(source_id),
            None => PathBuf::from(source_id),
        }
    }
}

impl ModelSource for GltfSource {
    /// Decoding starts on its own thread as soon as `load` is called, so
    /// every load of a batch decodes in parallel.
    fn load<'a>(&'a self, source_id: &'a str) -> BoxFuture<'a, Result<DecodedModel, LoadError>> {
        let path = self.resolve(source_id);
        let (tx, rx) = oneshot::channel();
        let spawned = thread::Builder::new()
            .name(format!("gltf-load {}", source_id))
            .spawn(move || {
                let _ = tx.send(load_gltf_positions(&path));
            });

        Box::pin(async move {
            if let Err(e) = spawned {
                return Err(LoadError::new(source_id, e));
            }
            match rx.await {
                Ok(result) => result.map_err(|e| LoadError::new(source_id, e)),
                Err(_) => Err(LoadError::new(source_id, "decoder thread exited without a result")),
            }
        })
    }
}

/// Reads every mesh primitive of the default scene as one sub-mesh, in
/// world space
pub fn load_gltf_positions(path: impl AsRef<Path>) -> Result<DecodedModel> {
    let path = path.as_ref();
    info!("Loading glTF file: {:?}", path);

    let (gltf, buffers, _images) =
        gltf::import(path).context(format!("Failed to load glTF file: {:?}", path))?;

    debug!(
        "glTF loaded: {} scenes, {} nodes, {} meshes",
        gltf.scenes().count(),
        gltf.nodes().count(),
        gltf.meshes().count()
    );

    let scene = gltf
        .default_scene()
        .or_else(|| gltf.scenes().next())
        .context("glTF file has no scenes")?;

    let mut decoded = DecodedModel::default();
    for node in scene.nodes() {
        process_node(&node, &buffers, &Mat4::IDENTITY, &mut decoded)?;
    }

    if decoded.sub_meshes.is_empty() {
        warn!("No geometry found in glTF file {:?}", path);
    }

    Ok(decoded)
}

fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    parent_transform: &Mat4,
    decoded: &mut DecodedModel,
) -> Result<()> {
    let local_transform = Mat4::from_cols_array_2d(&node.transform().matrix());
    let global_transform = *parent_transform * local_transform;

    if let Some(mesh) = node.mesh() {
        process_mesh(&mesh, buffers, &global_transform, decoded)?;
    }

    for child in node.children() {
        process_node(&child, buffers, &global_transform, decoded)?;
    }

    Ok(())
}

fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    transform: &Mat4,
    decoded: &mut DecodedModel,
) -> Result<()> {
    debug!("  Processing mesh: {:?}", mesh.name());

    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<Vec3> = reader
            .read_positions()
            .context("Mesh primitive has no positions")?
            .map(|pos| transform.transform_point3(Vec3::from_array(pos)))
            .collect();

        if positions.is_empty() {
            continue;
        }

        let declared = primitive.bounding_box();
        let bounds = AABB::new(Vec3::from_array(declared.min), Vec3::from_array(declared.max))
            .transformed(transform);

        decoded.bounds = Some(match decoded.bounds {
            Some(existing) => existing.union(&bounds),
            None => bounds,
        });
        decoded.sub_meshes.push(positions);
    }

    Ok(())
}
