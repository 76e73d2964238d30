pub mod backend;
pub mod config;
pub mod heightmap;
pub mod mesh;
pub mod streaming;
pub mod surface;
pub mod workers;

use std::fmt;
use std::sync::Arc;

use glam::Vec2;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

pub use backend::{NullBackend, TerrainBackend};
pub use config::{Error as ConfigError, LodLevel, NoiseConfig, SurfaceRegion, WaterConfig, WorldConfig};
pub use heightmap::{HeightMap, HeightSource, NoiseHeightSampler};
pub use mesh::{GridMeshBuilder, MeshBuilder, RenderMesh};
pub use streaming::{ChunkCoord, StreamingManager};

use workers::{ComputePool, ComputePoolInfo};

#[derive(Debug)]
pub enum EngineError {
    Config(ConfigError),
    Workers(rayon::ThreadPoolBuildError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Config(err) => write!(f, "configuration error: {err}"),
            EngineError::Workers(err) => write!(f, "failed to start worker pool: {err}"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EngineError::Config(err) => Some(err),
            EngineError::Workers(err) => Some(err),
        }
    }
}

impl From<ConfigError> for EngineError {
    fn from(value: ConfigError) -> Self {
        EngineError::Config(value)
    }
}

impl From<rayon::ThreadPoolBuildError> for EngineError {
    fn from(value: rayon::ThreadPoolBuildError) -> Self {
        EngineError::Workers(value)
    }
}

/// Information used to create a [`TerrainEngine`].
///
/// Leaving `height_source` or `mesh_builder` unset selects the built-in fbm
/// sampler and grid triangulator configured from `config`.
pub struct TerrainEngineInfo {
    pub config: WorldConfig,
    pub height_source: Option<Arc<dyn HeightSource>>,
    pub mesh_builder: Option<Arc<dyn MeshBuilder>>,
    /// Worker thread count; 0 picks one per core.
    pub worker_threads: usize,
}

impl Default for TerrainEngineInfo {
    fn default() -> Self {
        Self {
            config: WorldConfig::default(),
            height_source: None,
            mesh_builder: None,
            worker_threads: 0,
        }
    }
}

/// The streaming session: owns the worker pool and the chunk registry, and
/// should be driven once per frame from a single thread.
pub struct TerrainEngine {
    config: Arc<WorldConfig>,
    workers: ComputePool,
    streaming: StreamingManager,
}

impl TerrainEngine {
    pub fn new(info: TerrainEngineInfo) -> Result<Self, EngineError> {
        info.config.validate()?;
        let config = Arc::new(info.config);

        let height_source = info
            .height_source
            .unwrap_or_else(|| Arc::new(NoiseHeightSampler::new(&config.noise)));
        let mesh_builder = info.mesh_builder.unwrap_or_else(|| {
            Arc::new(GridMeshBuilder {
                chunk_size: config.chunk_size,
                height_scale: config.height_scale,
            })
        });
        let workers = ComputePool::new(ComputePoolInfo {
            height_source,
            mesh_builder,
            grid_resolution: config.grid_resolution,
            sample_spacing: config.sample_spacing(),
            threads: info.worker_threads,
        })?;

        info!("--INITIALIZING TERRAIN STREAMER--");
        info!(
            chunk_size = config.chunk_size,
            grid_resolution = config.grid_resolution,
            lod_levels = config.lod_levels.len(),
            max_view_distance = config.max_view_distance(),
            "world configuration loaded"
        );

        Ok(Self {
            streaming: StreamingManager::new(config.clone()),
            workers,
            config,
        })
    }

    /// Advance the session by one frame: apply finished background work,
    /// then restream around the viewer if it moved far enough.
    pub fn update(&mut self, viewer: Vec2, backend: &mut dyn TerrainBackend) {
        self.streaming.drain_results(viewer, &self.workers, backend);
        self.streaming.update_viewer(viewer, &self.workers, backend);
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn chunk_count(&self) -> usize {
        self.streaming.chunk_count()
    }

    pub fn visible_coords(&self) -> &[ChunkCoord] {
        self.streaming.visible_coords()
    }

    pub fn streaming(&self) -> &StreamingManager {
        &self.streaming
    }
}

/// Install a stdout `tracing` subscriber. Meant for demos and tools
/// embedding the engine; call it once at startup.
pub fn init_tracing() {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");
}
