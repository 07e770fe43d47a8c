use glam::Vec3;
use rand::Rng;

use crate::error::MorphError;

/// A position buffer padded to the shared particle count
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedBuffer {
    pub positions: Vec<Vec3>,
    /// Vertices copied verbatim from the source
    pub source_count: usize,
    /// Source vertex used for each padded slot `source_count..`
    pub resampled_from: Vec<usize>,
}

impl NormalizedBuffer {
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Flat `xyz` layout for vertex buffer upload
    pub fn as_flat(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }
}

/// Pads every buffer to the largest vertex count. Slot `i` of each output
/// holds source vertex `i` while it exists; the remaining slots copy a
/// uniformly chosen vertex of the same source so the extra particles spread
/// over the shape instead of piling up in one spot.
pub fn normalize_buffers<S, R>(sources: &[S], rng: &mut R) -> Result<Vec<NormalizedBuffer>, MorphError>
where
    S: AsRef<[Vec3]>,
    R: Rng + ?Sized,
{
    let max_count = sources.iter().map(|s| s.as_ref().len()).max().unwrap_or(0);

    sources
        .iter()
        .enumerate()
        .map(|(index, source)| pad_buffer(index, source.as_ref(), max_count, rng))
        .collect()
}

fn pad_buffer<R: Rng + ?Sized>(
    index: usize,
    source: &[Vec3],
    target_count: usize,
    rng: &mut R,
) -> Result<NormalizedBuffer, MorphError> {
    let source_count = source.len();
    if source_count == 0 && target_count > 0 {
        return Err(MorphError::EmptySource { index });
    }

    let resampled_from: Vec<usize> = (source_count..target_count)
        .map(|_| rng.gen_range(0..source_count))
        .collect();

    let mut positions = Vec::with_capacity(target_count);
    positions.extend_from_slice(source);
    positions.extend(resampled_from.iter().map(|&i| source[i]));

    Ok(NormalizedBuffer {
        positions,
        source_count,
        resampled_from,
    })
}
