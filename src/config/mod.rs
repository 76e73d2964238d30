use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

mod error;
pub use error::{Error, Result};

/// One entry of the detail-level table. Levels are configured in ascending
/// `visible_distance` order; the last entry's distance is the maximum view
/// distance of the whole world.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq)]
pub struct LodLevel {
    /// Detail factor handed to the mesh builder. `0` is full resolution,
    /// higher values decimate the vertex grid.
    pub lod: u8,
    pub visible_distance: f32,
    /// Marks the level whose mesh doubles as the collision mesh. When more
    /// than one level is flagged, the last one wins.
    pub use_for_collision: bool,
}

/// A height band of the terrain. Regions are configured descending by
/// `height`; classification picks the first region at or below a sample.
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct SurfaceRegion {
    pub name: String,
    /// Minimum normalized height ([0,1]) for a sample to fall in this region.
    pub height: f32,
    pub material: String,
    /// Physical layer handed to the backend alongside the material.
    pub layer: u8,
    pub walkable: bool,
    pub friction: f32,
}

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct WaterConfig {
    pub enabled: bool,
    pub material: String,
    pub layer: u8,
    /// Normalized height at or below which a chunk grows a water plane.
    pub level: f32,
}

/// Parameters for the built-in fbm height sampler. Fixed for the lifetime of
/// a session so that every chunk samples the same continuous field.
#[derive(Deserialize, Serialize, Clone, Copy, Debug)]
pub struct NoiseConfig {
    pub seed: u64,
    pub scale: f32,
    pub octaves: u32,
    pub persistence: f32,
    pub lacunarity: f32,
    pub offset: [f32; 2],
}

/// Full configuration surface of the streaming world.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct WorldConfig {
    /// Edge length of one terrain chunk in world units.
    pub chunk_size: f32,
    /// Height samples per chunk side. Adjacent chunks share their edge
    /// sample positions, so meshes line up without skirts.
    pub grid_resolution: u32,
    /// Vertical scale applied when triangulating normalized heights.
    pub height_scale: f32,
    /// How far the viewer must move before the visible window is recomputed.
    pub viewer_move_threshold: f32,
    pub lod_levels: Vec<LodLevel>,
    pub regions: Vec<SurfaceRegion>,
    pub water: WaterConfig,
    pub noise: NoiseConfig,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            chunk_size: 240.0,
            grid_resolution: 241,
            height_scale: 40.0,
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
                    name: "snow".to_string(),
                    height: 0.85,
                    material: "snow".to_string(),
                    layer: 10,
                    walkable: true,
                    friction: 0.9,
                },
                SurfaceRegion {
                    name: "rock".to_string(),
                    height: 0.6,
                    material: "rock".to_string(),
                    layer: 11,
                    walkable: false,
                    friction: 1.0,
                },
                SurfaceRegion {
                    name: "grass".to_string(),
                    height: 0.3,
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
                octaves: 4,
                persistence: 0.5,
                lacunarity: 2.0,
                offset: [0.0, 0.0],
            },
        }
    }
}

impl WorldConfig {
    /// Load a configuration from a JSON file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let config: WorldConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// The last detail level's visible distance bounds the entire world.
    pub fn max_view_distance(&self) -> f32 {
        self.lod_levels
            .last()
            .map(|level| level.visible_distance)
            .unwrap_or(0.0)
    }

    /// Index into `lod_levels` of the level used for the collision mesh.
    pub fn collision_lod_index(&self) -> Option<usize> {
        self.lod_levels
            .iter()
            .rposition(|level| level.use_for_collision)
    }

    /// World distance between two adjacent height samples.
    pub fn sample_spacing(&self) -> f32 {
        self.chunk_size / (self.grid_resolution.max(2) - 1) as f32
    }

    /// Check every structural invariant the streaming engine relies on.
    /// Runs once at engine construction.
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size <= 0.0 {
            return Err(Error::InvalidField {
                field: "chunk_size",
            });
        }
        if self.grid_resolution < 2 {
            return Err(Error::InvalidField {
                field: "grid_resolution",
            });
        }
        if self.viewer_move_threshold < 0.0 {
            return Err(Error::InvalidField {
                field: "viewer_move_threshold",
            });
        }
        if self.noise.octaves < 1 {
            return Err(Error::InvalidField {
                field: "noise.octaves",
            });
        }
        if self.noise.scale <= 0.0 {
            return Err(Error::InvalidField {
                field: "noise.scale",
            });
        }

        if self.lod_levels.is_empty() {
            return Err(Error::EmptyLodLevels);
        }
        let quads = self.grid_resolution - 1;
        for (index, level) in self.lod_levels.iter().enumerate() {
            if index > 0 && level.visible_distance <= self.lod_levels[index - 1].visible_distance {
                return Err(Error::LodDistanceOrder { index });
            }
            let step = vertex_step(level.lod);
            if quads % step != 0 {
                return Err(Error::LodStep {
                    index,
                    lod: level.lod,
                });
            }
        }
        if self.collision_lod_index().is_none() {
            return Err(Error::MissingCollisionLod);
        }

        for (index, region) in self.regions.iter().enumerate() {
            if index > 0 && region.height > self.regions[index - 1].height {
                return Err(Error::RegionOrder { index });
            }
        }

        Ok(())
    }
}

/// Vertex stride through the sample grid for a detail factor.
pub fn vertex_step(lod: u8) -> u32 {
    if lod == 0 {
        1
    } else {
        2 * lod as u32
    }
}
