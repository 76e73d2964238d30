use crate::config::vertex_step;
use crate::heightmap::HeightMap;

mod water;
pub use water::build_water_plane;

/// Geometry handed to the render/physics backend. Attribute arrays are
/// parallel; `indices` is a triangle list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderMesh {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl RenderMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Boundary to the triangulation stage. Pure: the same grid and detail
/// factor always produce the same mesh. Higher `lod` means a coarser mesh
/// over the same footprint.
pub trait MeshBuilder: Send + Sync {
    fn build(&self, heights: &HeightMap, lod: u8) -> RenderMesh;
}

/// Default triangulator: a regular vertex grid centered on the chunk
/// footprint, decimated by the detail factor's vertex step.
pub struct GridMeshBuilder {
    pub chunk_size: f32,
    pub height_scale: f32,
}

impl MeshBuilder for GridMeshBuilder {
    fn build(&self, heights: &HeightMap, lod: u8) -> RenderMesh {
        let resolution = heights.resolution;
        let step = vertex_step(lod);
        let grid = (resolution - 1) / step + 1;
        let denom = (resolution - 1) as f32;
        let half = self.chunk_size / 2.0;

        let mut positions = Vec::with_capacity((grid * grid) as usize);
        let mut normals = Vec::with_capacity((grid * grid) as usize);
        let mut uvs = Vec::with_capacity((grid * grid) as usize);
        for gy in 0..grid {
            for gx in 0..grid {
                let x = gx * step;
                let y = gy * step;
                let fx = x as f32 / denom;
                let fy = y as f32 / denom;
                positions.push([
                    -half + fx * self.chunk_size,
                    heights.sample(x, y) * self.height_scale,
                    -half + fy * self.chunk_size,
                ]);
                normals.push(self.vertex_normal(heights, x, y, step));
                uvs.push([fx, fy]);
            }
        }

        let mut indices = Vec::with_capacity(((grid - 1) * (grid - 1) * 6) as usize);
        for gy in 0..grid - 1 {
            for gx in 0..grid - 1 {
                let i0 = gy * grid + gx;
                let i1 = i0 + 1;
                let i2 = i0 + grid;
                let i3 = i2 + 1;
                indices.extend_from_slice(&[i0, i2, i1, i1, i2, i3]);
            }
        }

        RenderMesh {
            positions,
            normals,
            uvs,
            indices,
        }
    }
}

impl GridMeshBuilder {
    fn vertex_normal(&self, heights: &HeightMap, x: u32, y: u32, step: u32) -> [f32; 3] {
        let spacing = self.chunk_size / (heights.resolution - 1) as f32;
        let last = heights.resolution - 1;
        let left = x.saturating_sub(step);
        let right = (x + step).min(last);
        let down = y.saturating_sub(step);
        let up = (y + step).min(last);

        let dx = (heights.sample(right, y) - heights.sample(left, y)) * self.height_scale
            / ((right - left).max(1) as f32 * spacing);
        let dy = (heights.sample(x, up) - heights.sample(x, down)) * self.height_scale
            / ((up - down).max(1) as f32 * spacing);

        let normal = glam::Vec3::new(-dx, 1.0, -dy).normalize_or_zero();
        [normal.x, normal.y, normal.z]
    }
}
