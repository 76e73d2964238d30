use super::RenderMesh;
use crate::heightmap::HeightMap;

/// Build the flat water quad for a chunk, or `None` when every sample sits
/// above the water level. The quad spans the full chunk footprint; water
/// presence is a whole-chunk flag, not a per-sample mask.
pub fn build_water_plane(
    heights: &HeightMap,
    level: f32,
    chunk_size: f32,
    height_scale: f32,
) -> Option<RenderMesh> {
    if !heights.samples.iter().any(|sample| *sample <= level) {
        return None;
    }

    let half = chunk_size / 2.0;
    let y = level * height_scale;
    Some(RenderMesh {
        positions: vec![
            [-half, y, -half],
            [half, y, -half],
            [-half, y, half],
            [half, y, half],
        ],
        normals: vec![[0.0, 1.0, 0.0]; 4],
        uvs: vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
        indices: vec![0, 1, 2, 1, 3, 2],
    })
}
