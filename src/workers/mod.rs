use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;

use glam::Vec2;

use crate::heightmap::{HeightMap, HeightSource};
use crate::mesh::{MeshBuilder, RenderMesh};
use crate::streaming::ChunkCoord;

/// Work shipped to the worker pool. Requests carry everything the job
/// needs; workers never reach back into chunk or registry state.
pub enum ComputeRequest {
    HeightData {
        coord: ChunkCoord,
        origin: Vec2,
    },
    LodMesh {
        coord: ChunkCoord,
        lod_index: usize,
        lod: u8,
        heights: Arc<HeightMap>,
    },
}

/// Completed work, delivered back to the main timeline through the pool's
/// channel and applied there during the drain step.
pub enum ComputeResult {
    HeightData {
        coord: ChunkCoord,
        heights: HeightMap,
    },
    LodMesh {
        coord: ChunkCoord,
        lod_index: usize,
        mesh: RenderMesh,
    },
}

pub struct ComputePoolInfo {
    pub height_source: Arc<dyn HeightSource>,
    pub mesh_builder: Arc<dyn MeshBuilder>,
    pub grid_resolution: u32,
    pub sample_spacing: f32,
    /// Worker thread count; 0 lets the pool pick one per core.
    pub threads: usize,
}

/// Background compute context for height sampling and mesh builds. The
/// caller of [`ComputePool::submit`] never blocks; results surface through
/// [`ComputePool::try_recv`] on whichever thread owns the pool.
pub struct ComputePool {
    workers: rayon::ThreadPool,
    height_source: Arc<dyn HeightSource>,
    mesh_builder: Arc<dyn MeshBuilder>,
    grid_resolution: u32,
    sample_spacing: f32,
    results_tx: Sender<ComputeResult>,
    results_rx: Receiver<ComputeResult>,
}

impl ComputePool {
    pub fn new(info: ComputePoolInfo) -> Result<Self, rayon::ThreadPoolBuildError> {
        let workers = rayon::ThreadPoolBuilder::new()
            .num_threads(info.threads)
            .build()?;
        let (results_tx, results_rx) = channel();
        Ok(Self {
            workers,
            height_source: info.height_source,
            mesh_builder: info.mesh_builder,
            grid_resolution: info.grid_resolution,
            sample_spacing: info.sample_spacing,
            results_tx,
            results_rx,
        })
    }

    pub fn submit(&self, request: ComputeRequest) {
        let tx = self.results_tx.clone();
        match request {
            ComputeRequest::HeightData { coord, origin } => {
                let source = self.height_source.clone();
                let resolution = self.grid_resolution;
                let spacing = self.sample_spacing;
                self.workers.spawn(move || {
                    let heights = source.sample(origin, resolution, spacing);
                    let _ = tx.send(ComputeResult::HeightData { coord, heights });
                });
            }
            ComputeRequest::LodMesh {
                coord,
                lod_index,
                lod,
                heights,
            } => {
                let builder = self.mesh_builder.clone();
                self.workers.spawn(move || {
                    let mesh = builder.build(&heights, lod);
                    let _ = tx.send(ComputeResult::LodMesh {
                        coord,
                        lod_index,
                        mesh,
                    });
                });
            }
        }
    }

    /// Pull one finished result, if any. Never blocks.
    pub fn try_recv(&self) -> Option<ComputeResult> {
        self.results_rx.try_recv().ok()
    }
}
