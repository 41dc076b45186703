use glscene_core::{Heightmap, Mesh, TerrainConfig};
use log::info;
use nalgebra::Vector3;
use wasm_bindgen::prelude::*;

use crate::error;
use crate::gl::{GlContext, GpuMesh};

const GROUND_COLOR: [f32; 4] = [0.45, 0.75, 0.35, 1.0];
const CUBE_COLOR: [f32; 4] = [1.0, 0.5, 0.5, 1.0];

/// The heightmap terrain demo
#[wasm_bindgen]
pub struct TerrainApp {
    context: GlContext,
    config: TerrainConfig,
    ground: GpuMesh,
    cube: GpuMesh,
    yaw: f32,
}

#[wasm_bindgen]
impl TerrainApp {
    /// Build the terrain from RGBA pixels, e.g. `ImageData.data`; heights
    /// come from the red channel.
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str, width: usize, height: usize, rgba: Vec<u8>) -> Result<TerrainApp, JsValue> {
        if width < 2 || height < 2 || rgba.len() != width * height * 4 {
            return Err(error("heightmap needs at least 2x2 RGBA pixels"));
        }

        let context = GlContext::new(canvas_id)?;
        let config = TerrainConfig::default();

        let lit = config.build(&Heightmap::from_rgba(width, height, &rgba)).flatten();
        info!("terrain {width}x{height}: {} triangles", lit.position.len() / 9);
        let ground = context.upload_arrays(lit.position, lit.normal, GROUND_COLOR)?;
        let cube = context.upload_mesh(&Mesh::cube(config.cube_size), CUBE_COLOR)?;

        Ok(TerrainApp {
            context,
            config,
            ground,
            cube,
            yaw: 0.0,
        })
    }

    /// Turn the ground about the vertical axis, in radians
    #[wasm_bindgen(setter)]
    pub fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }

    pub fn frame(&mut self, time_ms: f64) {
        let mut camera = self.config.camera();
        self.context
            .begin_frame(&mut camera, Vector3::new(0.5, 1.0, 0.3), Vector3::repeat(0.1));

        self.context
            .draw(&self.ground, &self.config.terrain_matrix(self.yaw), [1.0; 4]);
        let time = (time_ms / 1000.0) as f32;
        self.context.draw(&self.cube, &self.config.cube_matrix(time), [1.0; 4]);
    }
}
