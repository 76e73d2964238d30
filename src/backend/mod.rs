use crate::config::SurfaceRegion;
use crate::mesh::RenderMesh;
use crate::streaming::ChunkCoord;

/// Boundary to the render/physics backend. The engine pushes geometry and
/// state changes through this trait from the main timeline only; a backend
/// maps chunk coordinates to whatever scene objects it manages.
///
/// Meshes may be re-applied for a coordinate as the selected detail level
/// changes; the latest call wins. `set_active(coord, false)` hides every
/// object belonging to the chunk, water included.
pub trait TerrainBackend {
    fn apply_terrain_mesh(&mut self, coord: ChunkCoord, mesh: &RenderMesh);
    fn apply_collision_mesh(&mut self, coord: ChunkCoord, mesh: &RenderMesh);
    fn apply_water_mesh(&mut self, coord: ChunkCoord, mesh: &RenderMesh);
    fn set_surface(&mut self, coord: ChunkCoord, region: &SurfaceRegion);
    fn set_active(&mut self, coord: ChunkCoord, active: bool);
}

/// Backend that discards everything. Useful for headless runs and tools
/// that only want the streaming bookkeeping.
#[derive(Default)]
pub struct NullBackend;

impl TerrainBackend for NullBackend {
    fn apply_terrain_mesh(&mut self, _coord: ChunkCoord, _mesh: &RenderMesh) {}
    fn apply_collision_mesh(&mut self, _coord: ChunkCoord, _mesh: &RenderMesh) {}
    fn apply_water_mesh(&mut self, _coord: ChunkCoord, _mesh: &RenderMesh) {}
    fn set_surface(&mut self, _coord: ChunkCoord, _region: &SurfaceRegion) {}
    fn set_active(&mut self, _coord: ChunkCoord, _active: bool) {}
}
