use std::thread;
use std::time::Duration;

use glam::Vec2;
use relief::{
    ChunkCoord, RenderMesh, SurfaceRegion, TerrainBackend, TerrainEngine, TerrainEngineInfo,
    WorldConfig,
};

/// Backend that just narrates what the engine pushes at it.
#[derive(Default)]
struct ConsoleBackend {
    meshes: usize,
    collisions: usize,
    water: usize,
}

impl TerrainBackend for ConsoleBackend {
    fn apply_terrain_mesh(&mut self, coord: ChunkCoord, mesh: &RenderMesh) {
        self.meshes += 1;
        println!(
            "terrain ({:>3},{:>3}) {} vertices / {} triangles",
            coord.cx,
            coord.cy,
            mesh.positions.len(),
            mesh.triangle_count()
        );
    }

    fn apply_collision_mesh(&mut self, coord: ChunkCoord, _mesh: &RenderMesh) {
        self.collisions += 1;
        println!("collision ({:>3},{:>3})", coord.cx, coord.cy);
    }

    fn apply_water_mesh(&mut self, coord: ChunkCoord, _mesh: &RenderMesh) {
        self.water += 1;
        println!("water ({:>3},{:>3})", coord.cx, coord.cy);
    }

    fn set_surface(&mut self, coord: ChunkCoord, region: &SurfaceRegion) {
        println!(
            "surface ({:>3},{:>3}) -> {} (layer {})",
            coord.cx, coord.cy, region.material, region.layer
        );
    }

    fn set_active(&mut self, _coord: ChunkCoord, _active: bool) {}
}

fn main() {
    relief::init_tracing();

    let config = WorldConfig {
        grid_resolution: 49,
        ..WorldConfig::default()
    };
    let mut engine = TerrainEngine::new(TerrainEngineInfo {
        config,
        ..Default::default()
    })
    .expect("failed to initialize terrain engine");
    let mut backend = ConsoleBackend::default();

    // Walk the viewer along the x axis and let the world stream in.
    let mut viewer = Vec2::ZERO;
    for frame in 0..600 {
        engine.update(viewer, &mut backend);
        viewer.x += 4.0;
        if frame % 100 == 0 {
            println!(
                "frame {:>3}: {} chunks, {} visible, {} meshes, {} collisions, {} water",
                frame,
                engine.chunk_count(),
                engine.visible_coords().len(),
                backend.meshes,
                backend.collisions,
                backend.water
            );
        }
        thread::sleep(Duration::from_millis(5));
    }
}
