use std::sync::Arc;

use glam::Vec2;
use tracing::{debug, warn};

use super::lod::LodMesh;
use super::ChunkCoord;
use crate::backend::TerrainBackend;
use crate::config::{LodLevel, WorldConfig};
use crate::heightmap::HeightMap;
use crate::mesh::{build_water_plane, RenderMesh};
use crate::surface;
use crate::workers::{ComputePool, ComputeRequest};

/// Axis-aligned footprint of a chunk, used for nearest-edge distance to the
/// viewer.
#[derive(Clone, Copy, Debug)]
pub struct ChunkBounds {
    pub center: Vec2,
    pub half: f32,
}

impl ChunkBounds {
    pub fn new(center: Vec2, size: f32) -> Self {
        Self {
            center,
            half: size / 2.0,
        }
    }

    pub fn sq_distance(&self, point: Vec2) -> f32 {
        let outside = ((point - self.center).abs() - Vec2::splat(self.half)).max(Vec2::ZERO);
        outside.length_squared()
    }

    pub fn distance(&self, point: Vec2) -> f32 {
        self.sq_distance(point).sqrt()
    }
}

/// Detail level selected for a viewer distance: the first level whose
/// visible distance covers it, or the last level once every threshold is
/// exceeded. Callers decide visibility separately against the maximum view
/// distance.
pub fn lod_index_for_distance(levels: &[LodLevel], distance: f32) -> usize {
    let mut index = 0;
    for (i, level) in levels.iter().enumerate().take(levels.len().saturating_sub(1)) {
        if distance > level.visible_distance {
            index = i + 1;
        } else {
            break;
        }
    }
    index
}

/// One streamed terrain tile: its bounds, cached height data, per-level
/// mesh trackers and the currently displayed detail level.
///
/// A chunk is created the first time the streaming window touches its
/// coordinate and lives for the whole session; falling out of view only
/// hides it. Construction immediately requests height data; everything
/// else waits for the delivery.
pub struct TerrainChunk {
    coord: ChunkCoord,
    bounds: ChunkBounds,
    config: Arc<WorldConfig>,
    max_view_distance: f32,
    collision_index: usize,
    heights: Option<Arc<HeightMap>>,
    lod_meshes: Vec<LodMesh>,
    collision_applied: bool,
    active_lod: Option<usize>,
    visible: bool,
}

impl TerrainChunk {
    pub fn new(coord: ChunkCoord, config: Arc<WorldConfig>, pool: &ComputePool) -> Self {
        let center = coord.center(config.chunk_size);
        let bounds = ChunkBounds::new(center, config.chunk_size);
        let lod_meshes = config
            .lod_levels
            .iter()
            .map(|level| LodMesh::new(level.lod))
            .collect();

        pool.submit(ComputeRequest::HeightData {
            coord,
            origin: center - Vec2::splat(config.chunk_size / 2.0),
        });
        debug!(cx = coord.cx, cy = coord.cy, "terrain chunk created");

        Self {
            coord,
            bounds,
            max_view_distance: config.max_view_distance(),
            collision_index: config.collision_lod_index().unwrap_or(0),
            config,
            heights: None,
            lod_meshes,
            collision_applied: false,
            active_lod: None,
            visible: false,
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn bounds(&self) -> ChunkBounds {
        self.bounds
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn has_height_data(&self) -> bool {
        self.heights.is_some()
    }

    /// Store the one-shot height delivery: classify the dominant surface,
    /// grow a water plane if any sample sits at or below the water level,
    /// then run the first detail evaluation. Duplicate deliveries are
    /// dropped.
    pub fn on_height_data(
        &mut self,
        heights: HeightMap,
        viewer: Vec2,
        pool: &ComputePool,
        backend: &mut dyn TerrainBackend,
    ) -> bool {
        if self.heights.is_some() {
            warn!(
                cx = self.coord.cx,
                cy = self.coord.cy,
                "duplicate height data ignored"
            );
            return self.visible;
        }

        match surface::dominant_region(&self.config.regions, &heights) {
            Some(region) => backend.set_surface(self.coord, region),
            None => debug!(
                cx = self.coord.cx,
                cy = self.coord.cy,
                "no surface region matched; chunk left unclassified"
            ),
        }

        if self.config.water.enabled {
            if let Some(water) = build_water_plane(
                &heights,
                self.config.water.level,
                self.config.chunk_size,
                self.config.height_scale,
            ) {
                backend.apply_water_mesh(self.coord, &water);
            }
        }

        self.heights = Some(Arc::new(heights));
        self.evaluate(viewer, pool, backend)
    }

    /// Route a finished background build into its tracker. The caller is
    /// expected to re-evaluate afterwards so a freshly built mesh can be
    /// promoted without waiting for the next viewer move.
    pub fn on_mesh_built(&mut self, lod_index: usize, mesh: RenderMesh) {
        match self.lod_meshes.get_mut(lod_index) {
            Some(tracker) => tracker.complete(self.coord, mesh),
            None => warn!(
                cx = self.coord.cx,
                cy = self.coord.cy,
                lod_index,
                "mesh delivered for an unknown detail level"
            ),
        }
    }

    /// Re-run visibility and detail selection against the viewer. Swaps in
    /// the selected level's mesh when it is already built, otherwise leaves
    /// the previous mesh up and requests the build for later. Returns the
    /// resulting visibility.
    pub fn evaluate(
        &mut self,
        viewer: Vec2,
        pool: &ComputePool,
        backend: &mut dyn TerrainBackend,
    ) -> bool {
        let heights = match &self.heights {
            Some(heights) => heights.clone(),
            None => return false,
        };

        let distance = self.bounds.distance(viewer);
        let visible = distance <= self.max_view_distance;

        if visible {
            let lod_index = lod_index_for_distance(&self.config.lod_levels, distance);
            if self.active_lod != Some(lod_index) {
                if self.lod_meshes[lod_index].is_ready() {
                    if let Some(mesh) = self.lod_meshes[lod_index].ready_mesh() {
                        backend.apply_terrain_mesh(self.coord, mesh);
                    }
                    debug!(
                        cx = self.coord.cx,
                        cy = self.coord.cy,
                        lod_index,
                        "displayed detail level switched"
                    );
                    self.active_lod = Some(lod_index);
                } else {
                    self.lod_meshes[lod_index].request(
                        self.coord,
                        lod_index,
                        heights.clone(),
                        pool,
                    );
                }
            }

            // The collision mesh always targets the flagged collision level
            // and only matters once the viewer is close enough for lod 0.
            if lod_index == 0 {
                let collision = self.collision_index;
                if self.lod_meshes[collision].is_ready() {
                    if !self.collision_applied {
                        if let Some(mesh) = self.lod_meshes[collision].ready_mesh() {
                            backend.apply_collision_mesh(self.coord, mesh);
                        }
                        self.collision_applied = true;
                    }
                } else {
                    self.lod_meshes[collision].request(self.coord, collision, heights, pool);
                }
            }
        }

        self.set_visible(visible, backend);
        visible
    }

    pub fn set_visible(&mut self, visible: bool, backend: &mut dyn TerrainBackend) {
        if self.visible != visible {
            backend.set_active(self.coord, visible);
            self.visible = visible;
        }
    }
}
