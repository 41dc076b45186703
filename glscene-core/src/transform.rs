/// Model matrix builders
use nalgebra::{Matrix4, Vector3};

/// Transform builder for 3D transformations
pub struct Transform;

impl Transform {
    /// Rotation about the x axis
    pub fn x_rotation(angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(angle, 0.0, 0.0))
    }

    /// Rotation about the y axis
    pub fn y_rotation(angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, angle, 0.0))
    }

    /// Rotation about the z axis
    pub fn z_rotation(angle: f32) -> Matrix4<f32> {
        Matrix4::new_rotation(Vector3::new(0.0, 0.0, angle))
    }

    /// Create a translation matrix
    pub fn translation(v: Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_translation(&v)
    }

    /// Create a scale matrix
    pub fn scale(v: Vector3<f32>) -> Matrix4<f32> {
        Matrix4::new_nonuniform_scaling(&v)
    }

    /// Place a spinning object: translate, then rotate about x and y, then
    /// scale (applied to the vertex in reverse order).
    pub fn model_matrix(
        translation: Vector3<f32>,
        x_rotation: f32,
        y_rotation: f32,
        scale: Vector3<f32>,
    ) -> Matrix4<f32> {
        Self::translation(translation)
            * Self::x_rotation(x_rotation)
            * Self::y_rotation(y_rotation)
            * Self::scale(scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn test_identity_model() {
        let matrix = Transform::model_matrix(Vector3::zeros(), 0.0, 0.0, Vector3::repeat(1.0));
        assert!((matrix - Matrix4::identity()).norm() < 1e-6);
    }

    #[test]
    fn test_translation_applies_last() {
        let matrix = Transform::model_matrix(
            Vector3::new(10.0, 0.0, 0.0),
            0.0,
            std::f32::consts::FRAC_PI_2,
            Vector3::repeat(2.0),
        );
        // (1,0,0) scaled to (2,0,0), rotated about y to (0,0,-2), then moved
        let p = matrix.transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!((p.x - 10.0).abs() < 1e-5);
        assert!((p.z + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_z_rotation() {
        let p = Transform::z_rotation(std::f32::consts::FRAC_PI_2)
            .transform_point(&Point3::new(1.0, 0.0, 0.0));
        assert!(p.x.abs() < 1e-6);
        assert!((p.y - 1.0).abs() < 1e-6);
    }
}
