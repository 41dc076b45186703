/// Camera fly-through along a control-point path.
///
/// Control points live in the ground plane as `(x, z)` pairs. The path is
/// densified with interpolated points, split into equal-time segments, and
/// each segment is walked with a linear Bézier.
use nalgebra::{Point2, Point3, Vector2};

use crate::projection::CameraPose;

/// Slider range used to scrub through the animation
pub const SLIDER_MAX: f64 = 360.0;

#[derive(Debug, Clone)]
pub struct CameraPath {
    control_points: Vec<Point2<f32>>,
    points: Vec<Point2<f32>>,
    /// Scale from path units to world units
    pub distance: f32,
    /// Horizontal swing angle, radians
    pub horizontal_angle: f32,
    /// Scale applied to the control-point centre to get the look target
    pub target_distance: f32,
}

impl Default for CameraPath {
    fn default() -> Self {
        Self::new(
            vec![
                Point2::new(2.036_021_6, -1.569_995_5),
                Point2::new(1.938_800_8, -0.204_666),
                Point2::new(1.113_800_8, 1.246_659_9),
            ],
            2,
        )
    }
}

/// Points strictly between `a` and `b`, `count - 1` of them evenly spaced
fn interpolate(a: Point2<f32>, b: Point2<f32>, count: usize) -> impl Iterator<Item = Point2<f32>> {
    (1..count).map(move |i| a + (b - a) * (i as f32 / count as f32))
}

/// Linear combination of control points with Bernstein weights, scaled by 1/3
fn bezier(points: &[Point2<f32>], t: f32) -> Point2<f32> {
    let n = points.len().saturating_sub(1);
    let mut value = Point2::origin();
    for (i, p) in points.iter().enumerate() {
        let weight = binomial(n, i) * t.powi(i as i32) * (1.0 - t).powi((n - i) as i32);
        value += p.coords / 3.0 * weight;
    }
    value
}

fn binomial(n: usize, k: usize) -> f32 {
    (0..k).fold(1.0, |acc, i| acc * (n - i) as f32 / (i + 1) as f32)
}

impl CameraPath {
    /// Path through `control_points`, with `subdivisions - 1` extra points
    /// inserted between each consecutive pair.
    pub fn new(control_points: Vec<Point2<f32>>, subdivisions: usize) -> Self {
        let mut points = Vec::new();
        for pair in control_points.windows(2) {
            points.push(pair[0]);
            points.extend(interpolate(pair[0], pair[1], subdivisions));
        }
        if let Some(&last) = control_points.last() {
            points.push(last);
        }

        Self {
            control_points,
            points,
            distance: 15.0,
            horizontal_angle: 0.25f32.to_radians(),
            target_distance: 2.0,
        }
    }

    /// Densified path points
    pub fn points(&self) -> &[Point2<f32>] {
        &self.points
    }

    /// Look target: the centre of the control points, pushed outwards
    pub fn target(&self) -> Point3<f32> {
        let count = self.control_points.len().max(1) as f32;
        let sum = self
            .control_points
            .iter()
            .fold(Vector2::zeros(), |acc, p| acc + p.coords);
        let center = sum / count;
        Point3::new(center.x * self.target_distance, 0.0, center.y * self.target_distance)
    }

    /// Camera pose `time_ms` into an animation lasting `duration_ms`
    pub fn pose_at(&self, time_ms: f64, duration_ms: f64) -> CameraPose {
        let target = self.target();
        if self.points.len() < 2 || duration_ms <= 0.0 {
            let p = self.points.first().copied().unwrap_or_else(Point2::origin);
            return CameraPose::new(self.place(bezier(&[p], 0.0)), target);
        }

        let t = (time_ms.rem_euclid(duration_ms) / duration_ms) as f32;
        let segments = self.points.len() - 1;
        let interval = 1.0 / segments as f32;
        let segment = ((t / interval) as usize).min(segments - 1);
        let local = (t % interval) / interval;

        let point = bezier(&self.points[segment..segment + 2], local);
        CameraPose::new(self.place(point), target)
    }

    fn place(&self, point: Point2<f32>) -> Point3<f32> {
        Point3::new(
            point.x * self.distance * self.horizontal_angle.sin(),
            0.0,
            point.y * self.distance * self.horizontal_angle.cos(),
        )
    }
}

/// Play/pause state of the camera fly-through, driven by frame timestamps
#[derive(Debug, Clone)]
pub struct CameraAnimation {
    pub duration_ms: f64,
    playing: bool,
    start: Option<f64>,
    /// Time of the last pose handed out
    pub time_ms: f64,
}

impl Default for CameraAnimation {
    fn default() -> Self {
        Self::new(10_000.0)
    }
}

impl CameraAnimation {
    pub fn new(duration_ms: f64) -> Self {
        Self {
            duration_ms,
            playing: false,
            start: None,
            time_ms: 0.0,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start from the beginning at the next tick
    pub fn play(&mut self) {
        self.playing = true;
        self.start = None;
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    pub fn set_duration(&mut self, duration_ms: f64) {
        self.duration_ms = duration_ms;
    }

    /// Advance to the frame timestamp. Returns the slider position while
    /// playing; stops once the full duration has elapsed.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<f64> {
        if !self.playing {
            return None;
        }
        let start = *self.start.get_or_insert(timestamp_ms);
        let elapsed = timestamp_ms - start;
        let slider = elapsed / self.duration_ms * SLIDER_MAX;

        if elapsed >= self.duration_ms {
            self.playing = false;
            return Some(slider);
        }
        self.time_ms = elapsed;
        Some(slider)
    }

    /// Jump to a slider position in `[0, SLIDER_MAX]`
    pub fn scrub(&mut self, slider: f64) {
        self.time_ms = slider / SLIDER_MAX * self.duration_ms;
    }

    pub fn pose(&self, path: &CameraPath) -> CameraPose {
        path.pose_at(self.time_ms, self.duration_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_densified_points() {
        let path = CameraPath::default();
        assert_eq!(path.points().len(), 5);

        let mid = path.points()[1];
        assert!((mid.x - (2.036_021_6 + 1.938_800_8) / 2.0).abs() < 1e-5);
        assert_eq!(path.points()[2], Point2::new(1.938_800_8, -0.204_666));
    }

    #[test]
    fn test_pose_at_start() {
        let path = CameraPath::default();
        let pose = path.pose_at(0.0, 10_000.0);
        let first = path.points()[0];
        let angle = 0.25f32.to_radians();
        assert!((pose.position.x - first.x / 3.0 * 15.0 * angle.sin()).abs() < 1e-5);
        assert!((pose.position.z - first.y / 3.0 * 15.0 * angle.cos()).abs() < 1e-5);
        assert_eq!(pose.position.y, 0.0);
    }

    #[test]
    fn test_pose_wraps_around() {
        let path = CameraPath::default();
        let a = path.pose_at(2_500.0, 10_000.0);
        let b = path.pose_at(12_500.0, 10_000.0);
        assert!((a.position - b.position).norm() < 1e-5);
    }

    #[test]
    fn test_segment_boundary() {
        let path = CameraPath::default();
        // A quarter of the way through starts the second segment
        let pose = path.pose_at(2_500.0, 10_000.0);
        let p = path.points()[1];
        let angle = 0.25f32.to_radians();
        assert!((pose.position.z - p.y / 3.0 * 15.0 * angle.cos()).abs() < 1e-4);
    }

    #[test]
    fn test_target_is_scaled_centre() {
        let path = CameraPath::new(vec![Point2::new(1.0, 2.0), Point2::new(3.0, 4.0)], 2);
        assert_eq!(path.target(), Point3::new(4.0, 0.0, 6.0));
    }

    #[test]
    fn test_animation_runs_once() {
        let mut animation = CameraAnimation::new(1_000.0);
        assert_eq!(animation.tick(5.0), None);

        animation.play();
        assert_eq!(animation.tick(100.0), Some(0.0));
        assert_eq!(animation.tick(600.0), Some(180.0));
        assert_eq!(animation.time_ms, 500.0);

        assert_eq!(animation.tick(1_100.0), Some(360.0));
        assert!(!animation.is_playing());
        assert_eq!(animation.tick(1_200.0), None);
    }

    #[test]
    fn test_pause_and_scrub() {
        let mut animation = CameraAnimation::new(8_000.0);
        animation.play();
        animation.tick(0.0);
        animation.pause();
        assert_eq!(animation.tick(50.0), None);

        animation.scrub(90.0);
        assert_eq!(animation.time_ms, 2_000.0);
    }
}
