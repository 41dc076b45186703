/// Ball-shooting scene state.
///
/// A ball is launched from the camera towards the camera target and flies
/// until it passes close to a visible target cube, which then disappears.
/// State is a plain value; [`advance`] produces the next frame's state and
/// the events the frontend should react to (sound effects).
use nalgebra::{Point3, Rotation3, Unit, Vector3};

use crate::projection::{Camera, CameraPose};

/// Frame rate at which `dt = 1.0` is exactly one frame
pub const REFERENCE_FPS: f32 = 60.0;

/// Convert wall-clock seconds into `advance` steps
pub fn steps(seconds: f32) -> f32 {
    seconds * REFERENCE_FPS
}

/// Tunables of the shooting scene
#[derive(Debug, Clone)]
pub struct ShooterConfig {
    pub target_positions: Vec<Point3<f32>>,
    /// A target is hit when the ball is strictly closer than this
    pub hit_radius: f32,
    /// Ball speed along the aim direction, per step
    pub launch_speed: f32,
    /// Position advance per unit of `dt`, as a multiple of the velocity
    pub step_scale: f32,
    pub shots: u32,
    pub camera: CameraPose,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Cube spin in radians per second
    pub target_spin: f32,
    /// Ball spin in radians per second
    pub ball_spin: f32,
    pub target_size: f32,
    pub ball_radius: f32,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            target_positions: vec![
                Point3::new(10.0, -30.0, 100.0),
                Point3::new(-110.0, 0.0, -90.0),
                Point3::new(160.0, 50.0, -400.0),
                Point3::new(80.0, -70.0, -600.0),
                Point3::new(200.0, -20.0, -140.0),
                Point3::new(-80.0, -50.0, -400.0),
            ],
            hit_radius: 20.0,
            launch_speed: 2.0,
            step_scale: 2.0,
            shots: 10,
            camera: CameraPose::new(Point3::new(0.0, 0.0, 300.0), Point3::new(0.0, 0.0, 0.0)),
            fov: 60f32.to_radians(),
            near: 0.1,
            far: 2000.0,
            target_spin: 1.0,
            ball_spin: 20.0,
            target_size: 20.0,
            ball_radius: 10.0,
        }
    }
}

impl ShooterConfig {
    pub fn camera_for(&self, pose: CameraPose) -> Camera {
        Camera::looking(pose, self.fov, self.near, self.far)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ball {
    pub position: Point3<f32>,
    pub velocity: Vector3<f32>,
}

impl Ball {
    pub fn at_rest() -> Self {
        Self {
            position: Point3::origin(),
            velocity: Vector3::zeros(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Point3<f32>,
    pub visible: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShooterState {
    pub camera: CameraPose,
    pub ball: Ball,
    pub targets: Vec<Target>,
    pub shots_left: u32,
    pub score: u32,
}

impl ShooterState {
    pub fn new(config: &ShooterConfig) -> Self {
        Self {
            camera: config.camera,
            ball: Ball::at_rest(),
            targets: config
                .target_positions
                .iter()
                .map(|&position| Target {
                    position,
                    visible: true,
                })
                .collect(),
            shots_left: config.shots,
            score: 0,
        }
    }

    pub fn visible_targets(&self) -> impl Iterator<Item = &Target> {
        self.targets.iter().filter(|t| t.visible)
    }

    /// All targets are down or no shots remain and the ball is at rest
    pub fn is_over(&self) -> bool {
        self.visible_targets().next().is_none()
            || (self.shots_left == 0 && self.ball.velocity == Vector3::zeros())
    }
}

/// Player input gathered since the previous frame
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameInput {
    pub shoot: bool,
    /// Look rotation about the vertical axis, radians
    pub yaw: f32,
    /// Look rotation about the camera's right axis, radians
    pub pitch: f32,
}

/// Something the frontend should react to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    Launched,
    TargetHit { index: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    pub state: ShooterState,
    pub events: Vec<SceneEvent>,
}

/// Hide the first visible target strictly within `threshold` of `position`.
///
/// Returns the index of the hit target.
pub fn find_hit(targets: &mut [Target], position: &Point3<f32>, threshold: f32) -> Option<usize> {
    let index = targets
        .iter()
        .position(|t| t.visible && nalgebra::distance(position, &t.position) < threshold)?;
    targets[index].visible = false;
    Some(index)
}

/// Returns `true` when the ball hit (and hid) a target.
pub fn check_collision(targets: &mut [Target], position: &Point3<f32>, threshold: f32) -> bool {
    find_hit(targets, position, threshold).is_some()
}

fn rotate_look(pose: CameraPose, yaw: f32, pitch: f32) -> CameraPose {
    if yaw == 0.0 && pitch == 0.0 {
        return pose;
    }
    let offset = pose.target - pose.position;
    let up = Vector3::<f32>::y_axis();
    let right = offset.cross(&Vector3::y());

    let mut rotation = Rotation3::from_axis_angle(&up, yaw);
    if right.norm() > 1e-6 {
        rotation = rotation * Rotation3::from_axis_angle(&Unit::new_normalize(right), pitch);
    }
    CameraPose::new(pose.position, pose.position + rotation * offset)
}

/// Advance the scene by `dt` steps.
///
/// `dt = 1.0` is one animation frame at the reference rate. Longer frames
/// are split into steps of at most 1.0, each followed by a collision check.
pub fn advance(state: &ShooterState, dt: f32, input: &FrameInput, config: &ShooterConfig) -> FrameOutcome {
    let mut next = state.clone();
    let mut events = Vec::new();

    if input.shoot && next.shots_left > 0 {
        next.ball = Ball {
            position: next.camera.position,
            velocity: next.camera.direction() * config.launch_speed,
        };
        next.shots_left -= 1;
        events.push(SceneEvent::Launched);
    }

    next.camera = rotate_look(next.camera, input.yaw, input.pitch);

    // Move at most one reference step between collision checks
    let mut remaining = dt.max(0.0);
    loop {
        let step = remaining.min(1.0);
        next.ball.position += next.ball.velocity * config.step_scale * step;
        remaining -= step;

        if let Some(index) = find_hit(&mut next.targets, &next.ball.position, config.hit_radius) {
            next.score += 1;
            next.ball = Ball::at_rest();
            events.push(SceneEvent::TargetHit { index });
            break;
        }
        if remaining <= 0.0 || next.ball.velocity == Vector3::zeros() {
            break;
        }
    }

    FrameOutcome {
        state: next,
        events,
    }
}

/// Cube rotation `(x, y)` in radians at `time` seconds
pub fn target_spin(time: f32, config: &ShooterConfig) -> (f32, f32) {
    (-time * config.target_spin, time * config.target_spin)
}

/// Ball rotation `(x, y)` in radians at `time` seconds
pub fn ball_spin(time: f32, config: &ShooterConfig) -> (f32, f32) {
    (-time * config.ball_spin, time * config.ball_spin)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_target(at: Point3<f32>) -> Vec<Target> {
        vec![Target {
            position: at,
            visible: true,
        }]
    }

    #[test]
    fn test_steps_at_reference_rate() {
        assert!((steps(1.0 / 60.0) - 1.0).abs() < 1e-6);
        assert!((steps(0.5) - 30.0).abs() < 1e-4);
    }

    #[test]
    fn test_collision_threshold() {
        let mut near = single_target(Point3::new(19.0, 0.0, 0.0));
        assert!(check_collision(&mut near, &Point3::origin(), 20.0));
        assert!(!near[0].visible);

        let mut far = single_target(Point3::new(21.0, 0.0, 0.0));
        assert!(!check_collision(&mut far, &Point3::origin(), 20.0));
        assert!(far[0].visible);
    }

    #[test]
    fn test_hidden_targets_are_ignored() {
        let mut targets = single_target(Point3::new(5.0, 0.0, 0.0));
        targets[0].visible = false;
        assert!(!check_collision(&mut targets, &Point3::origin(), 20.0));
    }

    #[test]
    fn test_first_visible_target_wins() {
        let mut targets = vec![
            Target { position: Point3::new(10.0, 0.0, 0.0), visible: true },
            Target { position: Point3::new(1.0, 0.0, 0.0), visible: true },
        ];
        assert_eq!(find_hit(&mut targets, &Point3::origin(), 20.0), Some(0));
        assert!(targets[1].visible);
    }

    #[test]
    fn test_shoot_launches_from_camera() {
        let config = ShooterConfig::default();
        let state = ShooterState::new(&config);
        let input = FrameInput { shoot: true, ..FrameInput::default() };

        let outcome = advance(&state, 1.0, &input, &config);
        assert_eq!(outcome.events, vec![SceneEvent::Launched]);
        assert_eq!(outcome.state.shots_left, config.shots - 1);

        // Velocity 2 along -z, advanced by 2 * dt
        let ball = outcome.state.ball;
        assert!((ball.velocity - Vector3::new(0.0, 0.0, -2.0)).norm() < 1e-6);
        assert!((ball.position.z - 296.0).abs() < 1e-4);

        // The input state is untouched
        assert_eq!(state.shots_left, config.shots);
    }

    #[test]
    fn test_no_shots_left() {
        let config = ShooterConfig { shots: 0, ..ShooterConfig::default() };
        let state = ShooterState::new(&config);
        let input = FrameInput { shoot: true, ..FrameInput::default() };
        let outcome = advance(&state, 1.0, &input, &config);
        assert!(outcome.events.is_empty());
        assert_eq!(outcome.state.ball, Ball::at_rest());
    }

    #[test]
    fn test_hit_resets_ball_and_scores() {
        let config = ShooterConfig {
            target_positions: vec![Point3::new(0.0, 0.0, 0.0)],
            camera: CameraPose::new(Point3::new(0.0, 0.0, 50.0), Point3::origin()),
            ..ShooterConfig::default()
        };
        let mut state = ShooterState::new(&config);
        let shoot = FrameInput { shoot: true, ..FrameInput::default() };
        let idle = FrameInput::default();

        let mut outcome = advance(&state, 1.0, &shoot, &config);
        let mut frames = 0;
        while !outcome.events.iter().any(|e| matches!(e, SceneEvent::TargetHit { .. })) {
            state = outcome.state;
            outcome = advance(&state, 1.0, &idle, &config);
            frames += 1;
            assert!(frames < 100, "ball never reached the target");
        }

        assert_eq!(outcome.state.score, 1);
        assert_eq!(outcome.state.ball, Ball::at_rest());
        assert!(outcome.state.visible_targets().next().is_none());
        assert!(outcome.state.is_over());
    }

    #[test]
    fn test_slow_frame_still_hits() {
        let config = ShooterConfig {
            target_positions: vec![Point3::new(0.0, 0.0, 0.0)],
            camera: CameraPose::new(Point3::new(0.0, 0.0, 50.0), Point3::origin()),
            ..ShooterConfig::default()
        };
        let state = ShooterState::new(&config);
        let shoot = FrameInput { shoot: true, ..FrameInput::default() };

        // Half a second in one frame carries the ball 120 units
        let outcome = advance(&state, steps(0.5), &shoot, &config);
        assert_eq!(
            outcome.events,
            vec![SceneEvent::Launched, SceneEvent::TargetHit { index: 0 }]
        );
        assert_eq!(outcome.state.score, 1);
        assert_eq!(outcome.state.ball, Ball::at_rest());
    }

    #[test]
    fn test_yaw_keeps_camera_position() {
        let config = ShooterConfig::default();
        let state = ShooterState::new(&config);
        let input = FrameInput { yaw: std::f32::consts::FRAC_PI_2, ..FrameInput::default() };
        let outcome = advance(&state, 1.0, &input, &config);

        let camera = outcome.state.camera;
        assert_eq!(camera.position, config.camera.position);
        let distance = nalgebra::distance(&camera.position, &camera.target);
        assert!((distance - 300.0).abs() < 1e-3);
        assert!(camera.direction().z.abs() < 1e-5);
    }

    #[test]
    fn test_spin() {
        let config = ShooterConfig::default();
        assert_eq!(target_spin(2.0, &config), (-2.0, 2.0));
        assert_eq!(ball_spin(0.5, &config), (-10.0, 10.0));
    }
}
