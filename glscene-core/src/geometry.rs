/// Triangle meshes built from flat attribute arrays and simple primitives
use nalgebra::{Point3, Vector3};

use crate::obj::GeometryData;

/// A 3D vertex with position and normal
#[derive(Debug, Clone, Copy)]
pub struct Vertex {
    pub position: Point3<f32>,
    pub normal: Vector3<f32>,
}

impl Vertex {
    pub fn new(x: f32, y: f32, z: f32, nx: f32, ny: f32, nz: f32) -> Self {
        Self {
            position: Point3::new(x, y, z),
            normal: Vector3::new(nx, ny, nz),
        }
    }
}

/// A triangle face defined by three vertices
#[derive(Debug, Clone)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    pub fn new(v0: Vertex, v1: Vertex, v2: Vertex) -> Self {
        Self {
            vertices: [v0, v1, v2],
        }
    }

    /// Calculate the face normal from the triangle's vertices
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let v0 = self.vertices[0].position;
        let v1 = self.vertices[1].position;
        let v2 = self.vertices[2].position;

        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1.cross(&edge2).normalize()
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self {
            triangles: Vec::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Build from non-indexed arrays (3 floats per vertex). Without normals
    /// every vertex takes its face normal.
    pub fn from_arrays(position: &[f32], normal: Option<&[f32]>) -> Self {
        let mut mesh = Self::with_capacity(position.len() / 9);

        for (t, corners) in position.chunks_exact(9).enumerate() {
            let mut vertices = [Vertex::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0); 3];
            for (k, vertex) in vertices.iter_mut().enumerate() {
                let p = &corners[k * 3..k * 3 + 3];
                let n = normal
                    .and_then(|n| n.get(t * 9 + k * 3..t * 9 + k * 3 + 3))
                    .unwrap_or(&[0.0, 0.0, 0.0]);
                *vertex = Vertex::new(p[0], p[1], p[2], n[0], n[1], n[2]);
            }

            let mut triangle = Triangle::new(vertices[0], vertices[1], vertices[2]);
            if normal.is_none() {
                let face = triangle.calculate_normal();
                for vertex in &mut triangle.vertices {
                    vertex.normal = face;
                }
            }
            mesh.add_triangle(triangle);
        }

        mesh
    }

    /// Build from parsed OBJ geometry data
    pub fn from_geometry(data: &GeometryData) -> Self {
        match &data.position {
            Some(position) => Self::from_arrays(position, data.normal.as_deref()),
            None => Self::new(),
        }
    }

    /// Flatten into `(position, normal)` arrays, 3 floats per vertex each
    pub fn to_arrays(&self) -> (Vec<f32>, Vec<f32>) {
        let mut position = Vec::with_capacity(self.triangles.len() * 9);
        let mut normal = Vec::with_capacity(self.triangles.len() * 9);
        for triangle in &self.triangles {
            for vertex in &triangle.vertices {
                position.extend_from_slice(vertex.position.coords.as_slice());
                normal.extend_from_slice(vertex.normal.as_slice());
            }
        }
        (position, normal)
    }

    /// Axis-aligned cube centred on the origin
    pub fn cube(size: f32) -> Self {
        let h = size / 2.0;
        let mut mesh = Self::with_capacity(12);

        // (normal, u axis, v axis) per face; corners are n*h ± u*h ± v*h
        let faces = [
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), Vector3::y(), Vector3::x()),
            (Vector3::y(), Vector3::z(), Vector3::x()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::x(), Vector3::y(), Vector3::z()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
        ];

        for (n, u, v) in faces {
            let corner = |su: f32, sv: f32| {
                let p = (n + u * su + v * sv) * h;
                Vertex::new(p.x, p.y, p.z, n.x, n.y, n.z)
            };
            let (a, b, c, d) = (corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0));
            mesh.add_triangle(Triangle::new(a, b, c));
            mesh.add_triangle(Triangle::new(a, c, d));
        }

        mesh
    }

    /// UV sphere centred on the origin
    pub fn sphere(radius: f32, subdivisions_axis: usize, subdivisions_height: usize) -> Self {
        use std::f32::consts::PI;

        let axis = subdivisions_axis.max(3);
        let height = subdivisions_height.max(2);
        let point = |x: usize, y: usize| {
            let theta = y as f32 / height as f32 * PI;
            let phi = x as f32 / axis as f32 * 2.0 * PI;
            let n = Vector3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin());
            Vertex::new(n.x * radius, n.y * radius, n.z * radius, n.x, n.y, n.z)
        };

        let mut mesh = Self::with_capacity(axis * height * 2);
        for y in 0..height {
            for x in 0..axis {
                let (a, b) = (point(x, y), point(x + 1, y));
                let (c, d) = (point(x, y + 1), point(x + 1, y + 1));
                if y > 0 {
                    mesh.add_triangle(Triangle::new(a, b, c));
                }
                if y + 1 < height {
                    mesh.add_triangle(Triangle::new(b, d, c));
                }
            }
        }

        mesh
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cube_faces_point_outwards() {
        let cube = Mesh::cube(2.0);
        assert_eq!(cube.triangles.len(), 12);
        for triangle in &cube.triangles {
            let face = triangle.calculate_normal();
            let stored = triangle.vertices[0].normal;
            assert!((face - stored).norm() < 1e-5, "winding disagrees with normal");
            for vertex in &triangle.vertices {
                assert!((vertex.position.coords.abs().max() - 1.0).abs() < 1e-6);
            }
        }
    }

    #[test]
    fn test_sphere_vertices_on_surface() {
        let sphere = Mesh::sphere(10.0, 12, 6);
        assert_eq!(sphere.triangles.len(), 12 * 6 * 2 - 2 * 12);
        for triangle in &sphere.triangles {
            for vertex in &triangle.vertices {
                assert!((vertex.position.coords.norm() - 10.0).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_from_arrays_without_normals() {
        let position = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mesh = Mesh::from_arrays(&position, None);
        assert_eq!(mesh.triangles.len(), 1);
        assert!((mesh.triangles[0].vertices[2].normal.z - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_to_arrays() {
        let (position, normal) = Mesh::cube(1.0).to_arrays();
        assert_eq!(position.len(), 12 * 9);
        assert_eq!(normal.len(), position.len());
    }
}
