/// Heightmap terrain scene
use std::io;
use std::path::Path;

use crossterm::event::KeyCode;
use glscene_core::{Heightmap, Mesh, TerrainConfig};
use log::info;

use crate::renderer::{AsciiRenderer, Tint};
use crate::scene::{FrameTime, Scene};

const GROUND_TINT: Tint = [0.45, 0.8, 0.35];
const CUBE_TINT: Tint = [1.0, 0.5, 0.5];

const TURN_STEP: f32 = 0.05;

/// Decode a heightmap image, sampling its red channel
pub fn load_heightmap(path: &Path) -> io::Result<Heightmap> {
    let image = image::open(path)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("{}: {e}", path.display())))?
        .to_rgba8();
    let (width, height) = image.dimensions();
    Ok(Heightmap::from_rgba(width as usize, height as usize, image.as_raw()))
}

pub struct TerrainScene {
    config: TerrainConfig,
    ground: Mesh,
    cube: Mesh,
    yaw: f32,
    time: f32,
}

impl TerrainScene {
    pub fn new(config: TerrainConfig, heightmap: &Heightmap) -> Self {
        let lit = config.build(heightmap).flatten();
        let ground = Mesh::from_arrays(&lit.position, Some(&lit.normal));
        info!(
            "terrain {}x{}: {} triangles",
            heightmap.width,
            heightmap.height,
            ground.triangles.len()
        );

        Self {
            cube: Mesh::cube(config.cube_size),
            config,
            ground,
            yaw: 0.0,
            time: 0.0,
        }
    }

    pub fn triangle_count(&self) -> usize {
        self.ground.triangles.len()
    }
}

impl Scene for TerrainScene {
    fn controls(&self) -> &'static str {
        "Left/Right=Turn Q=Quit"
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Left | KeyCode::Char('a') => self.yaw -= TURN_STEP,
            KeyCode::Right | KeyCode::Char('d') => self.yaw += TURN_STEP,
            _ => {}
        }
    }

    fn update(&mut self, time: FrameTime) {
        self.time = time.elapsed;
    }

    fn render(&self, renderer: &mut AsciiRenderer) {
        let mut camera = self.config.camera();
        renderer.fit_camera(&mut camera);
        renderer.set_light_direction(nalgebra::Vector3::new(0.5, 1.0, 0.3));

        renderer.render_mesh(&self.ground, &self.config.terrain_matrix(self.yaw), &camera, GROUND_TINT);
        renderer.render_mesh(&self.cube, &self.config.cube_matrix(self.time), &camera, CUBE_TINT);
    }

    fn status(&self) -> String {
        format!("Terrain: {} triangles | Yaw: {:.0}°", self.triangle_count(), self.yaw.to_degrees())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_from_heightmap() {
        let heightmap = Heightmap::new(3, 2, vec![0, 128, 255, 0, 128, 255]);
        let mut scene = TerrainScene::new(TerrainConfig::default(), &heightmap);
        assert_eq!(scene.triangle_count(), 8);

        scene.handle_key(KeyCode::Right);
        assert!(scene.status().contains("Yaw: 3°"));
    }

    #[test]
    fn test_missing_image_is_an_error() {
        let err = load_heightmap(Path::new("/nonexistent/heightmap.png")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
