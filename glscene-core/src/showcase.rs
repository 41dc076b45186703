/// Layout of the textured-model showcase: bounding extents, camera framing
/// and the per-frame placement of the three models.
use std::f32::consts::PI;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::obj::Geometry;
use crate::transform::Transform;

/// Axis-aligned bounds of a set of positions
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extents {
    pub min: Vector3<f32>,
    pub max: Vector3<f32>,
}

impl Extents {
    /// Inverted bounds that any point will grow
    pub fn empty() -> Self {
        Self {
            min: Vector3::repeat(f32::INFINITY),
            max: Vector3::repeat(f32::NEG_INFINITY),
        }
    }

    /// The cube from `-1` to `1` on every axis
    pub fn unit() -> Self {
        Self {
            min: Vector3::repeat(-1.0),
            max: Vector3::repeat(1.0),
        }
    }

    /// No point has been added
    pub fn is_empty(&self) -> bool {
        self.min.iter().zip(self.max.iter()).any(|(lo, hi)| lo > hi)
    }

    pub fn of_positions(position: &[f32]) -> Self {
        position.chunks_exact(3).fold(Self::empty(), |acc, p| {
            let v = Vector3::new(p[0], p[1], p[2]);
            Self {
                min: acc.min.inf(&v),
                max: acc.max.sup(&v),
            }
        })
    }

    pub fn of_geometries(geometries: &[Geometry]) -> Self {
        geometries
            .iter()
            .filter_map(|g| g.data.position.as_deref())
            .map(Self::of_positions)
            .fold(Self::empty(), |acc, e| acc.union(&e))
    }

    pub fn union(&self, other: &Extents) -> Extents {
        Extents {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    pub fn range(&self) -> Vector3<f32> {
        self.max - self.min
    }

    pub fn center(&self) -> Vector3<f32> {
        self.min + self.range() * 0.5
    }
}

/// Camera placement that fits a model into view
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Framing {
    /// Translation that centres the model on the origin
    pub offset: Vector3<f32>,
    pub radius: f32,
    pub camera_position: Point3<f32>,
    pub camera_target: Point3<f32>,
    pub near: f32,
    pub far: f32,
}

impl Framing {
    /// Frame `extents`; empty extents are framed like [`Extents::unit`].
    pub fn from_extents(extents: &Extents) -> Self {
        let extents = if extents.is_empty() { Extents::unit() } else { *extents };
        let radius = extents.range().norm() * 0.5 / 30f32.to_radians().tan();
        let camera_target = Point3::origin();
        Self {
            offset: -extents.center(),
            radius,
            camera_position: camera_target + Vector3::new(1.0, 1.0, radius),
            camera_target,
            near: radius / 1000.0,
            far: radius * 100.0,
        }
    }
}

/// Scene tunables of the showcase
#[derive(Debug, Clone)]
pub struct ShowcaseConfig {
    pub fov: f32,
    pub light_direction: Vector3<f32>,
    pub house_offset: Vector3<f32>,
    pub statue_scale: f32,
    pub statue_position: Vector3<f32>,
    pub statue_turn: f32,
    /// Statue stops walking once it is this far past its start
    pub statue_walk_limit: f32,
    pub figure_scale: f32,
    pub figure_position: Vector3<f32>,
    pub figure_tilt: f32,
    pub jump_amplitude: f32,
    /// Seconds per jump
    pub jump_period: f32,
}

impl Default for ShowcaseConfig {
    fn default() -> Self {
        Self {
            fov: 80f32.to_radians(),
            light_direction: Vector3::new(2.0, 1.0, 5.0).normalize(),
            house_offset: Vector3::new(7.0, 9.0, 6.0),
            statue_scale: 0.2,
            statue_position: Vector3::new(27.5, 44.4, 59.0),
            statue_turn: PI + 1.2,
            statue_walk_limit: 10.0,
            figure_scale: 4.0,
            figure_position: Vector3::new(1.7, 3.5, 0.92),
            figure_tilt: PI * 2.0 + 0.2,
            jump_amplitude: 0.2,
            jump_period: 0.8,
        }
    }
}

/// World matrices of the three showcase models at one instant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub house: Matrix4<f32>,
    pub statue: Matrix4<f32>,
    pub figure: Matrix4<f32>,
}

impl ShowcaseConfig {
    /// How far the statue has walked after `time` seconds
    pub fn statue_walk(&self, time: f32) -> f32 {
        let start = self.statue_position.z;
        if start - time >= -self.statue_walk_limit {
            time * 2.0
        } else {
            start + 80.0
        }
    }

    /// Vertical hop of the figure after `time` seconds
    pub fn jump_offset(&self, time: f32) -> f32 {
        let phase = time.rem_euclid(self.jump_period);
        self.jump_amplitude * (2.0 * PI / self.jump_period * phase).sin()
    }

    /// Place the models `time` seconds in, with `offset` centring the house
    pub fn placement(&self, offset: Vector3<f32>, time: f32) -> Placement {
        let world = Transform::y_rotation(PI * 0.5) * Transform::translation(offset);

        let house = world * Transform::translation(self.house_offset);

        let walked = self.statue_position - Vector3::new(0.0, 0.0, self.statue_walk(time));
        let statue = Transform::y_rotation(self.statue_turn)
            * world
            * Transform::scale(Vector3::repeat(self.statue_scale))
            * Transform::translation(walked);

        let hopped = self.figure_position + Vector3::new(0.0, self.jump_offset(time), 0.0);
        let figure = Transform::y_rotation(PI * 2.0)
            * Transform::z_rotation(self.figure_tilt)
            * world
            * Transform::scale(Vector3::repeat(self.figure_scale))
            * Transform::translation(hopped);

        Placement {
            house,
            statue,
            figure,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::obj::parse_obj;

    #[test]
    fn test_extents_of_geometries() {
        let obj = parse_obj(
            "v -1 0 0\nv 1 2 0\nv 0 0 3\nf 1 2 3\nusemtl b\nv 5 -4 0\nf 1 2 4",
        )
        .unwrap();
        let extents = Extents::of_geometries(&obj.geometries);
        assert_eq!(extents.min, Vector3::new(-1.0, -4.0, 0.0));
        assert_eq!(extents.max, Vector3::new(5.0, 2.0, 3.0));
        assert_eq!(extents.center(), Vector3::new(2.0, -1.0, 1.5));
    }

    #[test]
    fn test_framing() {
        let extents = Extents {
            min: Vector3::new(-1.0, -1.0, -1.0),
            max: Vector3::new(3.0, 1.0, 1.0),
        };
        let framing = Framing::from_extents(&extents);
        assert_eq!(framing.offset, Vector3::new(-1.0, 0.0, 0.0));

        let expected = extents.range().norm() * 0.5 / 30f32.to_radians().tan();
        assert!((framing.radius - expected).abs() < 1e-5);
        assert!((framing.near - expected / 1000.0).abs() < 1e-6);
        assert!((framing.camera_position.z - expected).abs() < 1e-5);
    }

    #[test]
    fn test_framing_without_geometry() {
        let obj = parse_obj("mtllib scene.mtl").unwrap();
        let extents = Extents::of_geometries(&obj.geometries);
        assert!(extents.is_empty());

        let framing = Framing::from_extents(&extents);
        assert_eq!(framing, Framing::from_extents(&Extents::unit()));
        assert_eq!(framing.offset, Vector3::zeros());
        assert!(framing.radius.is_finite() && framing.radius > 0.0);
        assert!(framing.near.is_finite() && framing.far.is_finite());
    }

    #[test]
    fn test_statue_walk() {
        let config = ShowcaseConfig::default();
        assert_eq!(config.statue_walk(10.0), 20.0);
        assert_eq!(config.statue_walk(69.0), 138.0);
        assert_eq!(config.statue_walk(70.0), 139.0);
    }

    #[test]
    fn test_jump_is_periodic() {
        let config = ShowcaseConfig::default();
        assert!(config.jump_offset(0.0).abs() < 1e-6);
        assert!((config.jump_offset(0.2) - 0.2).abs() < 1e-5);
        assert!((config.jump_offset(1.0) - config.jump_offset(0.2)).abs() < 1e-5);
    }

    #[test]
    fn test_house_placement() {
        let config = ShowcaseConfig::default();
        let placement = config.placement(Vector3::zeros(), 0.0);
        let origin = placement.house.transform_point(&Point3::origin());
        // (7, 9, 6) turned a quarter about y
        assert!((origin.x - 6.0).abs() < 1e-5);
        assert!((origin.y - 9.0).abs() < 1e-5);
        assert!((origin.z + 7.0).abs() < 1e-5);
    }
}
