use std::sync::Arc;

use tracing::warn;

use super::ChunkCoord;
use crate::heightmap::HeightMap;
use crate::mesh::RenderMesh;
use crate::workers::{ComputePool, ComputeRequest};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum LodMeshState {
    Idle,
    Requested,
    Ready,
}

/// Per-chunk, per-level mesh cache and request tracker. A tracker issues at
/// most one build over its lifetime: once `Requested` or `Ready`, further
/// requests are no-ops.
pub(crate) struct LodMesh {
    lod: u8,
    state: LodMeshState,
    mesh: Option<RenderMesh>,
}

impl LodMesh {
    pub fn new(lod: u8) -> Self {
        Self {
            lod,
            state: LodMeshState::Idle,
            mesh: None,
        }
    }

    /// Kick off the background build for this level. Returns whether a job
    /// was actually submitted.
    pub fn request(
        &mut self,
        coord: ChunkCoord,
        lod_index: usize,
        heights: Arc<HeightMap>,
        pool: &ComputePool,
    ) -> bool {
        if self.state != LodMeshState::Idle {
            return false;
        }
        self.state = LodMeshState::Requested;
        pool.submit(ComputeRequest::LodMesh {
            coord,
            lod_index,
            lod: self.lod,
            heights,
        });
        true
    }

    pub fn complete(&mut self, coord: ChunkCoord, mesh: RenderMesh) {
        if self.state != LodMeshState::Requested {
            warn!(
                cx = coord.cx,
                cy = coord.cy,
                lod = self.lod,
                "dropping mesh delivery for a tracker that never requested one"
            );
            return;
        }
        self.mesh = Some(mesh);
        self.state = LodMeshState::Ready;
    }

    pub fn is_ready(&self) -> bool {
        self.state == LodMeshState::Ready
    }

    pub fn ready_mesh(&self) -> Option<&RenderMesh> {
        match self.state {
            LodMeshState::Ready => self.mesh.as_ref(),
            _ => None,
        }
    }
}
