use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::TerrainBackend;
use crate::config::WorldConfig;
use crate::workers::{ComputePool, ComputeResult};

mod chunk;
mod lod;

pub use chunk::{lod_index_for_distance, ChunkBounds, TerrainChunk};

/// Grid coordinate of a chunk. One grid cell spans `chunk_size` world units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
}

impl ChunkCoord {
    pub fn center(self, chunk_size: f32) -> Vec2 {
        Vec2::new(self.cx as f32, self.cy as f32) * chunk_size
    }
}

/// Owns the chunk registry and drives streaming around the viewer.
///
/// All mutation happens on the thread that calls [`StreamingManager::update_viewer`]
/// and [`StreamingManager::drain_results`]; workers only ever talk back
/// through the pool's result channel. The registry is append-only: chunks
/// that fall out of the window are hidden, not freed, so revisiting an area
/// reuses everything already built.
pub struct StreamingManager {
    config: Arc<WorldConfig>,
    max_view_distance: f32,
    window_radius: i32,
    sq_move_threshold: f32,
    chunks: HashMap<ChunkCoord, TerrainChunk>,
    visible: Vec<ChunkCoord>,
    last_refresh: Option<Vec2>,
}

impl StreamingManager {
    pub fn new(config: Arc<WorldConfig>) -> Self {
        let max_view_distance = config.max_view_distance();
        let window_radius = (max_view_distance / config.chunk_size).ceil() as i32;
        Self {
            max_view_distance,
            window_radius,
            sq_move_threshold: config.viewer_move_threshold * config.viewer_move_threshold,
            config,
            chunks: HashMap::new(),
            visible: Vec::new(),
            last_refresh: None,
        }
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    /// Chunks marked visible by the most recent window refresh or drain.
    pub fn visible_coords(&self) -> &[ChunkCoord] {
        &self.visible
    }

    pub fn max_view_distance(&self) -> f32 {
        self.max_view_distance
    }

    pub fn window_radius(&self) -> i32 {
        self.window_radius
    }

    /// Recompute the visible window when the viewer has moved far enough
    /// since the last refresh. The first call always refreshes.
    pub fn update_viewer(
        &mut self,
        viewer: Vec2,
        pool: &ComputePool,
        backend: &mut dyn TerrainBackend,
    ) {
        let moved = match self.last_refresh {
            None => true,
            Some(previous) => previous.distance_squared(viewer) > self.sq_move_threshold,
        };
        if moved {
            self.last_refresh = Some(viewer);
            self.refresh(viewer, pool, backend);
        }
    }

    /// Apply every finished background result to the registry. Runs the
    /// same evaluation a viewer move would, so a completed build promotes
    /// its mesh immediately.
    pub fn drain_results(
        &mut self,
        viewer: Vec2,
        pool: &ComputePool,
        backend: &mut dyn TerrainBackend,
    ) {
        while let Some(result) = pool.try_recv() {
            self.apply_result(result, viewer, pool, backend);
        }
    }

    /// Hide everything from the previous window, then walk the coordinate
    /// window around the viewer, updating chunks that exist and creating
    /// the ones that do not. The window is rebuilt from scratch, so a
    /// teleport behaves the same as a small step.
    fn refresh(&mut self, viewer: Vec2, pool: &ComputePool, backend: &mut dyn TerrainBackend) {
        for coord in std::mem::take(&mut self.visible) {
            if let Some(chunk) = self.chunks.get_mut(&coord) {
                chunk.set_visible(false, backend);
            }
        }

        let center_x = (viewer.x / self.config.chunk_size).round() as i32;
        let center_y = (viewer.y / self.config.chunk_size).round() as i32;
        for cy in (center_y - self.window_radius)..=(center_y + self.window_radius) {
            for cx in (center_x - self.window_radius)..=(center_x + self.window_radius) {
                let coord = ChunkCoord { cx, cy };
                let visible = match self.chunks.entry(coord) {
                    Entry::Occupied(mut entry) => entry.get_mut().evaluate(viewer, pool, backend),
                    Entry::Vacant(entry) => {
                        entry.insert(TerrainChunk::new(coord, self.config.clone(), pool));
                        false
                    }
                };
                if visible {
                    self.visible.push(coord);
                }
            }
        }

        debug!(
            chunks = self.chunks.len(),
            visible = self.visible.len(),
            "visible window refreshed"
        );
    }

    pub(crate) fn apply_result(
        &mut self,
        result: ComputeResult,
        viewer: Vec2,
        pool: &ComputePool,
        backend: &mut dyn TerrainBackend,
    ) {
        match result {
            ComputeResult::HeightData { coord, heights } => {
                let visible = match self.chunks.get_mut(&coord) {
                    Some(chunk) => chunk.on_height_data(heights, viewer, pool, backend),
                    None => {
                        warn!(
                            cx = coord.cx,
                            cy = coord.cy,
                            "height data delivered for an unregistered chunk"
                        );
                        return;
                    }
                };
                self.note_visible(coord, visible);
            }
            ComputeResult::LodMesh {
                coord,
                lod_index,
                mesh,
            } => {
                let visible = match self.chunks.get_mut(&coord) {
                    Some(chunk) => {
                        chunk.on_mesh_built(lod_index, mesh);
                        chunk.evaluate(viewer, pool, backend)
                    }
                    None => {
                        warn!(
                            cx = coord.cx,
                            cy = coord.cy,
                            "mesh delivered for an unregistered chunk"
                        );
                        return;
                    }
                };
                self.note_visible(coord, visible);
            }
        }
    }

    fn note_visible(&mut self, coord: ChunkCoord, visible: bool) {
        if visible && !self.visible.contains(&coord) {
            self.visible.push(coord);
        }
    }
}
