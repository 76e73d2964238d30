#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use glam::Vec2;
use relief::{
    ChunkCoord, GridMeshBuilder, HeightMap, HeightSource, LodLevel, MeshBuilder, NoiseConfig,
    RenderMesh, SurfaceRegion, TerrainBackend, TerrainEngine, WaterConfig, WorldConfig,
};

/// Every call the engine makes into the backend, in order. Mesh events
/// remember the vertex count so tests can tell detail levels apart.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    Terrain(ChunkCoord, usize),
    Collision(ChunkCoord, usize),
    Water(ChunkCoord, usize),
    Surface(ChunkCoord, String),
    Active(ChunkCoord, bool),
}

/// Backend that records everything it receives so tests can assert on call
/// ordering and coverage.
#[derive(Default)]
pub struct RecordingBackend {
    pub events: Vec<BackendEvent>,
}

impl RecordingBackend {
    pub fn terrain_meshes(&self) -> Vec<(ChunkCoord, usize)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BackendEvent::Terrain(coord, vertices) => Some((*coord, *vertices)),
                _ => None,
            })
            .collect()
    }

    pub fn collision_coords(&self) -> Vec<ChunkCoord> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BackendEvent::Collision(coord, _) => Some(*coord),
                _ => None,
            })
            .collect()
    }

    pub fn water_meshes(&self) -> Vec<(ChunkCoord, usize)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BackendEvent::Water(coord, vertices) => Some((*coord, *vertices)),
                _ => None,
            })
            .collect()
    }

    pub fn surfaces(&self) -> Vec<(ChunkCoord, String)> {
        self.events
            .iter()
            .filter_map(|event| match event {
                BackendEvent::Surface(coord, material) => Some((*coord, material.clone())),
                _ => None,
            })
            .collect()
    }
}

impl TerrainBackend for RecordingBackend {
    fn apply_terrain_mesh(&mut self, coord: ChunkCoord, mesh: &RenderMesh) {
        self.events
            .push(BackendEvent::Terrain(coord, mesh.positions.len()));
    }

    fn apply_collision_mesh(&mut self, coord: ChunkCoord, mesh: &RenderMesh) {
        self.events
            .push(BackendEvent::Collision(coord, mesh.positions.len()));
    }

    fn apply_water_mesh(&mut self, coord: ChunkCoord, mesh: &RenderMesh) {
        self.events
            .push(BackendEvent::Water(coord, mesh.positions.len()));
    }

    fn set_surface(&mut self, coord: ChunkCoord, region: &SurfaceRegion) {
        self.events
            .push(BackendEvent::Surface(coord, region.material.clone()));
    }

    fn set_active(&mut self, coord: ChunkCoord, active: bool) {
        self.events.push(BackendEvent::Active(coord, active));
    }
}

/// Height source returning the same value everywhere. Keeps classification
/// and water behavior fully deterministic in integration tests.
pub struct FlatSource(pub f32);

impl HeightSource for FlatSource {
    fn sample(&self, _origin: Vec2, resolution: u32, _spacing: f32) -> HeightMap {
        HeightMap::from_fn(resolution, |_, _| self.0)
    }
}

/// Mesh builder wrapper counting how many builds actually ran.
pub struct CountingBuilder {
    inner: GridMeshBuilder,
    calls: Arc<AtomicUsize>,
}

impl CountingBuilder {
    pub fn for_config(config: &WorldConfig) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: GridMeshBuilder {
                    chunk_size: config.chunk_size,
                    height_scale: config.height_scale,
                },
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl MeshBuilder for CountingBuilder {
    fn build(&self, heights: &HeightMap, lod: u8) -> RenderMesh {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.build(heights, lod)
    }
}

/// A small world: 5x5 sample grids so background work finishes quickly.
pub fn small_config() -> WorldConfig {
    WorldConfig {
        chunk_size: 240.0,
        grid_resolution: 5,
        height_scale: 1.0,
        viewer_move_threshold: 25.0,
        lod_levels: vec![
            LodLevel {
                lod: 0,
                visible_distance: 300.0,
                use_for_collision: true,
            },
            LodLevel {
                lod: 1,
                visible_distance: 600.0,
                use_for_collision: false,
            },
            LodLevel {
                lod: 2,
                visible_distance: 1000.0,
                use_for_collision: false,
            },
        ],
        regions: vec![
            SurfaceRegion {
                name: "rock".to_string(),
                height: 0.8,
                material: "rock".to_string(),
                layer: 11,
                walkable: false,
                friction: 1.0,
            },
            SurfaceRegion {
                name: "grass".to_string(),
                height: 0.5,
                material: "grass".to_string(),
                layer: 12,
                walkable: true,
                friction: 0.6,
            },
            SurfaceRegion {
                name: "sand".to_string(),
                height: 0.0,
                material: "sand".to_string(),
                layer: 13,
                walkable: true,
                friction: 0.4,
            },
        ],
        water: WaterConfig {
            enabled: true,
            material: "water".to_string(),
            layer: 4,
            level: 0.3,
        },
        noise: NoiseConfig {
            seed: 1,
            scale: 50.0,
            octaves: 2,
            persistence: 0.5,
            lacunarity: 2.0,
            offset: [0.0, 0.0],
        },
    }
}

/// Drive the engine at a fixed viewer position until `done` holds. Panics
/// if the background pipeline never settles.
pub fn pump_until(
    engine: &mut TerrainEngine,
    backend: &mut RecordingBackend,
    viewer: Vec2,
    mut done: impl FnMut(&TerrainEngine, &RecordingBackend) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(10);
    loop {
        engine.update(viewer, backend);
        if done(engine, backend) {
            return;
        }
        assert!(
            Instant::now() < deadline,
            "streaming never settled: {} chunks, {} events",
            engine.chunk_count(),
            backend.events.len()
        );
        thread::sleep(Duration::from_millis(2));
    }
}

/// Keep pumping until the window is populated and the backend has gone
/// quiet for a stretch of consecutive frames.
pub fn settle(engine: &mut TerrainEngine, backend: &mut RecordingBackend, viewer: Vec2) {
    pump_until(engine, backend, viewer, |engine, _| {
        engine.chunk_count() > 0 && !engine.visible_coords().is_empty()
    });

    let deadline = Instant::now() + Duration::from_secs(10);
    let mut quiet_frames = 0;
    while quiet_frames < 25 {
        let before = backend.events.len();
        engine.update(viewer, backend);
        if backend.events.len() == before {
            quiet_frames += 1;
        } else {
            quiet_frames = 0;
        }
        assert!(Instant::now() < deadline, "backend traffic never went quiet");
        thread::sleep(Duration::from_millis(2));
    }
}
