/// Textured-model showcase scene: up to three OBJ models placed around the
/// first one, viewed from a camera flying along a fixed path.
use crossterm::event::KeyCode;
use glscene_core::camera_path::SLIDER_MAX;
use glscene_core::{
    load_model, Attribute, Camera, CameraAnimation, CameraPath, Extents, FsAssetSource, Framing, LoadError, LoadedModel,
    Mesh, PrepareOptions, ShowcaseConfig,
};
use log::{info, warn};
use nalgebra::Matrix4;

use crate::renderer::{AsciiRenderer, Tint};
use crate::scene::{FrameTime, Scene};

/// Slider movement per scrub key press
const SCRUB_STEP: f64 = 10.0;
const DURATION_STEP_MS: f64 = 1000.0;

/// One model reduced to what the rasterizer draws
struct ModelMeshes {
    parts: Vec<(Mesh, Tint)>,
}

impl ModelMeshes {
    fn new(model: &LoadedModel) -> Self {
        let parts = model
            .parts(&PrepareOptions::default())
            .into_iter()
            .map(|part| {
                let normal = match &part.normal {
                    Attribute::Array { data, .. } => Some(data.as_slice()),
                    Attribute::Constant(_) => None,
                };
                let tint = part
                    .material
                    .diffuse
                    .map(|d| [d.x, d.y, d.z])
                    .unwrap_or([1.0, 1.0, 1.0]);
                (Mesh::from_arrays(&part.position, normal), tint)
            })
            .collect();
        Self { parts }
    }

    fn render(&self, renderer: &mut AsciiRenderer, model_matrix: &Matrix4<f32>, camera: &Camera) {
        for (mesh, tint) in &self.parts {
            renderer.render_mesh(mesh, model_matrix, camera, *tint);
        }
    }
}

/// Load the showcase models from the filesystem, house first
pub fn load_models(paths: &[String]) -> Result<Vec<LoadedModel>, LoadError> {
    let source = FsAssetSource::new("");
    paths.iter().map(|path| load_model(&source, path)).collect()
}

pub struct ShowcaseScene {
    config: ShowcaseConfig,
    path: CameraPath,
    animation: CameraAnimation,
    framing: Framing,
    models: Vec<ModelMeshes>,
    time: f32,
    slider: f64,
}

impl ShowcaseScene {
    pub fn new(config: ShowcaseConfig, models: &[LoadedModel], duration_ms: f64) -> Self {
        let extents = models.first().map(LoadedModel::extents).unwrap_or_else(Extents::empty);
        if extents.is_empty() {
            warn!("showcase: first model has no positions, framing a unit cube");
        }
        let framing = Framing::from_extents(&extents);
        info!(
            "showcase: {} models, framing radius {:.2}",
            models.len(),
            framing.radius
        );

        Self {
            config,
            path: CameraPath::default(),
            animation: CameraAnimation::new(duration_ms),
            framing,
            models: models.iter().map(ModelMeshes::new).collect(),
            time: 0.0,
            slider: 0.0,
        }
    }

    fn camera(&self) -> Camera {
        Camera::looking(
            self.animation.pose(&self.path),
            self.config.fov,
            self.framing.near,
            self.framing.far,
        )
    }

    fn scrub(&mut self, delta: f64) {
        self.animation.pause();
        self.slider = (self.slider + delta).clamp(0.0, SLIDER_MAX);
        self.animation.scrub(self.slider);
    }
}

impl Scene for ShowcaseScene {
    fn controls(&self) -> &'static str {
        "P=Play Space=Pause [/]=Scrub +/-=Duration Q=Quit"
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('p') => self.animation.play(),
            KeyCode::Char(' ') => self.animation.pause(),
            KeyCode::Char('[') | KeyCode::Left => self.scrub(-SCRUB_STEP),
            KeyCode::Char(']') | KeyCode::Right => self.scrub(SCRUB_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.animation.set_duration(self.animation.duration_ms + DURATION_STEP_MS)
            }
            KeyCode::Char('-') => {
                let shorter = (self.animation.duration_ms - DURATION_STEP_MS).max(DURATION_STEP_MS);
                self.animation.set_duration(shorter)
            }
            _ => {}
        }
    }

    fn update(&mut self, time: FrameTime) {
        self.time = time.elapsed;
        if let Some(slider) = self.animation.tick(time.elapsed as f64 * 1000.0) {
            self.slider = slider.min(SLIDER_MAX);
        }
    }

    fn render(&self, renderer: &mut AsciiRenderer) {
        let mut camera = self.camera();
        renderer.fit_camera(&mut camera);
        renderer.set_light_direction(self.config.light_direction);

        let placement = self.config.placement(self.framing.offset, self.time);
        let matrices = [placement.house, placement.statue, placement.figure];
        for (model, matrix) in self.models.iter().zip(matrices.iter()) {
            model.render(renderer, matrix, &camera);
        }
    }

    fn status(&self) -> String {
        let state = if self.animation.is_playing() { "playing" } else { "paused" };
        format!(
            "Camera: {state} {:.0}/{:.0} | Duration: {:.1}s",
            self.slider,
            SLIDER_MAX,
            self.animation.duration_ms / 1000.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glscene_core::loader::parse_obj_at;

    fn triangle_model() -> LoadedModel {
        let obj = parse_obj_at("tri.obj", "v 0 0 0\nv 1 0 0\nv 0 1 0\nusemtl red\nf 1 2 3").unwrap();
        LoadedModel::from_texts("tri.obj", obj, &["newmtl red\nKd 1 0 0".to_string()]).unwrap()
    }

    #[test]
    fn test_material_tints_parts() {
        let meshes = ModelMeshes::new(&triangle_model());
        assert_eq!(meshes.parts.len(), 1);
        assert_eq!(meshes.parts[0].1, [1.0, 0.0, 0.0]);
        assert_eq!(meshes.parts[0].0.triangles.len(), 1);
    }

    #[test]
    fn test_play_and_scrub() {
        let mut scene = ShowcaseScene::new(ShowcaseConfig::default(), &[triangle_model()], 10_000.0);
        scene.handle_key(KeyCode::Char('p'));
        scene.update(FrameTime::new(1.0, 0.016));
        scene.update(FrameTime::new(6.0, 0.016));
        assert!(scene.status().starts_with("Camera: playing 180/360"));

        scene.handle_key(KeyCode::Char(']'));
        assert!(scene.status().starts_with("Camera: paused 190/360"));
        assert!((scene.animation.time_ms - 190.0 / 360.0 * 10_000.0).abs() < 1e-6);
    }

    #[test]
    fn test_duration_keys() {
        let mut scene = ShowcaseScene::new(ShowcaseConfig::default(), &[], 2_000.0);
        scene.handle_key(KeyCode::Char('-'));
        scene.handle_key(KeyCode::Char('-'));
        assert!(scene.status().ends_with("Duration: 1.0s"));
        scene.handle_key(KeyCode::Char('+'));
        assert!(scene.status().ends_with("Duration: 2.0s"));
    }

    #[test]
    fn test_model_without_geometry_is_framed() {
        let obj = parse_obj_at("empty.obj", "mtllib empty.mtl").unwrap();
        let model = LoadedModel::from_texts("empty.obj", obj, &[String::new()]).unwrap();
        let scene = ShowcaseScene::new(ShowcaseConfig::default(), &[model], 10_000.0);
        assert!(scene.framing.near.is_finite() && scene.framing.near > 0.0);
        assert!(scene.framing.far.is_finite());
        assert!(scene.camera().view_projection().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_missing_model_file() {
        let err = load_models(&["/nonexistent/house.obj".to_string()]).unwrap_err();
        assert!(matches!(err, LoadError::Asset(_)));
    }
}
