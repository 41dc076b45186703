/// Scenes the terminal app can drive
use crossterm::event::KeyCode;
use glscene_core::shooter::steps;

use crate::renderer::AsciiRenderer;

/// Time since the previous frame, in the units scenes need
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    /// Seconds since the app started
    pub elapsed: f32,
    /// Reference-rate steps since the previous frame
    pub dt: f32,
}

impl FrameTime {
    pub fn new(elapsed: f32, frame_seconds: f32) -> Self {
        Self {
            elapsed,
            dt: steps(frame_seconds),
        }
    }
}

pub trait Scene {
    /// Key help shown in the status line
    fn controls(&self) -> &'static str;

    /// React to a key press. Quit keys are handled by the app.
    fn handle_key(&mut self, code: KeyCode);

    fn update(&mut self, time: FrameTime);

    fn render(&self, renderer: &mut AsciiRenderer);

    /// Scene-specific part of the status line
    fn status(&self) -> String;
}
