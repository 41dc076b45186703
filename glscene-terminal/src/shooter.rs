/// Ball-shooting scene
use crossterm::event::KeyCode;
use glscene_core::shooter::{ball_spin, target_spin};
use glscene_core::{advance, FrameInput, Mesh, SceneEvent, ShooterConfig, ShooterState, Transform};
use log::info;
use nalgebra::Vector3;

use crate::renderer::{AsciiRenderer, Tint};
use crate::scene::{FrameTime, Scene};

const TARGET_TINT: Tint = [1.0, 0.55, 0.1];
const BALL_TINT: Tint = [0.3, 0.8, 1.0];

/// Look rotation per key press, radians
const LOOK_STEP: f32 = 0.03;

pub struct ShooterScene {
    config: ShooterConfig,
    state: ShooterState,
    input: FrameInput,
    target_mesh: Mesh,
    ball_mesh: Mesh,
    time: f32,
    message: String,
}

impl ShooterScene {
    pub fn new(config: ShooterConfig) -> Self {
        let state = ShooterState::new(&config);
        Self {
            target_mesh: Mesh::cube(config.target_size),
            ball_mesh: Mesh::sphere(config.ball_radius, 12, 8),
            config,
            state,
            input: FrameInput::default(),
            time: 0.0,
            message: String::new(),
        }
    }

    pub fn state(&self) -> &ShooterState {
        &self.state
    }

    fn report(&mut self, event: SceneEvent) {
        match event {
            SceneEvent::Launched => {
                info!("ball launched, {} shots left", self.state.shots_left);
                self.message = "swoosh!".to_string();
            }
            SceneEvent::TargetHit { index } => {
                info!("target {index} hit");
                self.message = format!("pop! target {} down", index + 1);
            }
        }
    }
}

impl Scene for ShooterScene {
    fn controls(&self) -> &'static str {
        "Space=Shoot Arrows=Aim R=Reset Q=Quit"
    }

    fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') => self.input.shoot = true,
            KeyCode::Left | KeyCode::Char('a') => self.input.yaw += LOOK_STEP,
            KeyCode::Right | KeyCode::Char('d') => self.input.yaw -= LOOK_STEP,
            KeyCode::Up | KeyCode::Char('w') => self.input.pitch += LOOK_STEP,
            KeyCode::Down | KeyCode::Char('s') => self.input.pitch -= LOOK_STEP,
            KeyCode::Char('r') => {
                self.state = ShooterState::new(&self.config);
                self.message = "reset".to_string();
            }
            _ => {}
        }
    }

    fn update(&mut self, time: FrameTime) {
        self.time = time.elapsed;

        let input = std::mem::take(&mut self.input);
        let outcome = advance(&self.state, time.dt, &input, &self.config);
        self.state = outcome.state;
        for event in outcome.events {
            self.report(event);
        }
    }

    fn render(&self, renderer: &mut AsciiRenderer) {
        let mut camera = self.config.camera_for(self.state.camera);
        renderer.fit_camera(&mut camera);

        let (x_rotation, y_rotation) = target_spin(self.time, &self.config);
        for target in self.state.visible_targets() {
            let model = Transform::model_matrix(target.position.coords, x_rotation, y_rotation, Vector3::repeat(1.0));
            renderer.render_mesh(&self.target_mesh, &model, &camera, TARGET_TINT);
        }

        if self.state.ball.velocity != Vector3::zeros() {
            let (x_rotation, y_rotation) = ball_spin(self.time, &self.config);
            let model = Transform::model_matrix(
                self.state.ball.position.coords,
                x_rotation,
                y_rotation,
                Vector3::repeat(1.0),
            );
            renderer.render_mesh(&self.ball_mesh, &model, &camera, BALL_TINT);
        }
    }

    fn status(&self) -> String {
        let total = self.state.targets.len();
        let standing = self.state.visible_targets().count();
        let mut status = format!(
            "Shots: {} | Targets: {}/{} | {}",
            self.state.shots_left, standing, total, self.message
        );
        if self.state.is_over() {
            status.push_str(" | Game over, R to restart");
        }
        status
    }
}
