use glscene_core::shooter::{ball_spin, steps, target_spin};
use glscene_core::{advance, FrameInput, Mesh, SceneEvent, ShooterConfig, ShooterState, Transform};
use log::{info, warn};
use nalgebra::Vector3;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::HtmlAudioElement;

use crate::gl::{GlContext, GpuMesh};

const TARGET_COLOR: [f32; 4] = [1.0, 0.5, 0.5, 1.0];
const BALL_COLOR: [f32; 4] = [0.5, 0.8, 1.0, 1.0];

/// Sound effects played on scene events
#[derive(Default)]
struct Sounds {
    swoosh: Option<HtmlAudioElement>,
    pop: Option<HtmlAudioElement>,
}

impl Sounds {
    fn play(&self, event: SceneEvent) {
        let sound = match event {
            SceneEvent::Launched => &self.swoosh,
            SceneEvent::TargetHit { .. } => &self.pop,
        };
        if let Some(audio) = sound {
            audio.set_current_time(0.0);
            match audio.play() {
                // Rejected when the page has not been interacted with yet
                Ok(playing) => spawn_local(async move {
                    if let Err(err) = JsFuture::from(playing).await {
                        warn!("sound blocked: {err:?}");
                    }
                }),
                Err(err) => warn!("could not play sound: {err:?}"),
            }
        }
    }
}

/// The ball-shooting demo
#[wasm_bindgen]
pub struct ShooterApp {
    context: GlContext,
    config: ShooterConfig,
    state: ShooterState,
    input: FrameInput,
    target_mesh: GpuMesh,
    ball_mesh: GpuMesh,
    sounds: Sounds,
    last_time_ms: Option<f64>,
}

#[wasm_bindgen]
impl ShooterApp {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<ShooterApp, JsValue> {
        let context = GlContext::new(canvas_id)?;
        let config = ShooterConfig::default();

        let target_mesh = context.upload_mesh(&Mesh::cube(config.target_size), TARGET_COLOR)?;
        let ball_mesh = context.upload_mesh(&Mesh::sphere(config.ball_radius, 24, 12), BALL_COLOR)?;

        Ok(ShooterApp {
            context,
            state: ShooterState::new(&config),
            config,
            input: FrameInput::default(),
            target_mesh,
            ball_mesh,
            sounds: Sounds::default(),
            last_time_ms: None,
        })
    }

    /// Sounds for launching the ball and hitting a target
    pub fn set_sounds(&mut self, swoosh_url: &str, pop_url: &str) -> Result<(), JsValue> {
        self.sounds = Sounds {
            swoosh: Some(HtmlAudioElement::new_with_src(swoosh_url)?),
            pop: Some(HtmlAudioElement::new_with_src(pop_url)?),
        };
        Ok(())
    }

    /// Launch a ball on the next frame
    pub fn shoot(&mut self) {
        self.input.shoot = true;
    }

    /// Turn the view, in radians
    pub fn look(&mut self, yaw: f32, pitch: f32) {
        self.input.yaw += yaw;
        self.input.pitch += pitch;
    }

    pub fn reset(&mut self) {
        self.state = ShooterState::new(&self.config);
    }

    #[wasm_bindgen(getter)]
    pub fn shots_left(&self) -> u32 {
        self.state.shots_left
    }

    #[wasm_bindgen(getter)]
    pub fn score(&self) -> u32 {
        self.state.score
    }

    #[wasm_bindgen(getter)]
    pub fn is_over(&self) -> bool {
        self.state.is_over()
    }

    /// Advance and draw one frame at `time_ms`, the animation-frame timestamp
    pub fn frame(&mut self, time_ms: f64) {
        let dt = match self.last_time_ms {
            Some(last) => steps(((time_ms - last) / 1000.0) as f32),
            None => 0.0,
        };
        self.last_time_ms = Some(time_ms);

        let input = std::mem::take(&mut self.input);
        let outcome = advance(&self.state, dt, &input, &self.config);
        self.state = outcome.state;
        for event in outcome.events {
            if let SceneEvent::TargetHit { index } = event {
                info!("target {index} hit, score {}", self.state.score);
            }
            self.sounds.play(event);
        }

        self.draw((time_ms / 1000.0) as f32);
    }
}

impl ShooterApp {
    fn draw(&self, time: f32) {
        let mut camera = self.config.camera_for(self.state.camera);
        self.context
            .begin_frame(&mut camera, Vector3::new(0.5, 0.7, 1.0), Vector3::repeat(0.0));

        let (x_rotation, y_rotation) = target_spin(time, &self.config);
        for target in self.state.visible_targets() {
            let world = Transform::model_matrix(target.position.coords, x_rotation, y_rotation, Vector3::repeat(1.0));
            self.context.draw(&self.target_mesh, &world, [1.0; 4]);
        }

        if self.state.ball.velocity != Vector3::zeros() {
            let (x_rotation, y_rotation) = ball_spin(time, &self.config);
            let world = Transform::model_matrix(
                self.state.ball.position.coords,
                x_rotation,
                y_rotation,
                Vector3::repeat(1.0),
            );
            self.context.draw(&self.ball_mesh, &world, [1.0; 4]);
        }
    }
}
