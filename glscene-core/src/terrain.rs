/// Heightmap terrain mesh generation.
///
/// Each heightmap cell becomes five vertices (four corners and a centre at
/// the mean height) and four triangles meeting at the centre:
///
/// ```text
///  0----1
///  |\  /|
///  | \/4|
///  | /\ |
///  |/  \|
///  2----3
/// ```
use std::collections::HashMap;

use nalgebra::{Matrix4, Point3, Vector3};

use crate::projection::{Camera, CameraPose};
use crate::tangent::normalize_or_zero;
use crate::transform::Transform;

/// Maximum terrain height, reached by a full-intensity sample
pub const MAX_HEIGHT: f32 = 10.0;

/// Camera and placement of the terrain scene
#[derive(Debug, Clone)]
pub struct TerrainConfig {
    pub camera: CameraPose,
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Offset applied to the terrain in view space
    pub offset: Vector3<f32>,
    /// Normals of faces further apart than this are not smoothed together
    pub max_smoothing_angle: f32,
    pub cube_size: f32,
    /// Spin rate of the marker cube, radians per second
    pub cube_spin: f32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            camera: CameraPose::new(Point3::new(0.0, 50.0, 100.0), Point3::origin()),
            fov: 60f32.to_radians(),
            near: 1.0,
            far: 2000.0,
            offset: Vector3::new(0.0, -1.0, 0.0),
            max_smoothing_angle: 2f32.to_radians(),
            cube_size: 20.0,
            cube_spin: 0.5,
        }
    }
}

impl TerrainConfig {
    pub fn camera(&self) -> Camera {
        Camera::looking(self.camera, self.fov, self.near, self.far)
    }

    /// Terrain placement with the ground turned `yaw` radians about y
    pub fn terrain_matrix(&self, yaw: f32) -> Matrix4<f32> {
        Transform::y_rotation(yaw) * Transform::translation(self.offset)
    }

    /// Marker cube placement at `time` seconds
    pub fn cube_matrix(&self, time: f32) -> Matrix4<f32> {
        let angle = time * self.cube_spin;
        Transform::model_matrix(Vector3::zeros(), -angle, angle, Vector3::repeat(1.0))
    }

    /// Build the lit terrain mesh for a heightmap
    pub fn build(&self, heightmap: &Heightmap) -> IndexedMesh {
        generate_normals(&build_terrain(heightmap), self.max_smoothing_angle)
    }
}

/// Grayscale height samples in row-major order
#[derive(Debug, Clone)]
pub struct Heightmap {
    pub width: usize,
    pub height: usize,
    pub samples: Vec<u8>,
}

impl Heightmap {
    pub fn new(width: usize, height: usize, samples: Vec<u8>) -> Self {
        assert_eq!(samples.len(), width * height, "sample count must match dimensions");
        Self {
            width,
            height,
            samples,
        }
    }

    /// Build from RGBA pixels, sampling the red channel.
    pub fn from_rgba(width: usize, height: usize, rgba: &[u8]) -> Self {
        let samples = rgba.chunks_exact(4).map(|px| px[0]).collect();
        Self::new(width, height, samples)
    }

    /// Height at a linear sample offset
    pub fn height_at(&self, offset: usize) -> f32 {
        self.samples[offset] as f32 * MAX_HEIGHT / 255.0
    }
}

/// Indexed triangle mesh with positions, texcoords and normals
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IndexedMesh {
    pub position: Vec<f32>,
    pub texcoord: Vec<f32>,
    pub normal: Vec<f32>,
    pub indices: Vec<u32>,
}

impl IndexedMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Expand to non-indexed arrays, one vertex per face corner.
    pub fn flatten(&self) -> IndexedMesh {
        let mut out = IndexedMesh::default();
        for &index in &self.indices {
            let i = index as usize;
            out.position.extend_from_slice(&self.position[i * 3..i * 3 + 3]);
            if !self.texcoord.is_empty() {
                out.texcoord.extend_from_slice(&self.texcoord[i * 2..i * 2 + 2]);
            }
            if !self.normal.is_empty() {
                out.normal.extend_from_slice(&self.normal[i * 3..i * 3 + 3]);
            }
        }
        out
    }
}

/// Build the terrain grid for a heightmap. Normals are left empty.
pub fn build_terrain(heightmap: &Heightmap) -> IndexedMesh {
    let mut mesh = IndexedMesh::default();
    if heightmap.width < 2 || heightmap.height < 2 {
        return mesh;
    }

    let cells_across = heightmap.width - 1;
    let cells_deep = heightmap.height - 1;

    for z in 0..cells_deep {
        for x in 0..cells_across {
            let base0 = z * heightmap.width + x;
            let base1 = base0 + heightmap.width;

            let h00 = heightmap.height_at(base0);
            let h01 = heightmap.height_at(base0 + 1);
            let h10 = heightmap.height_at(base1);
            let h11 = heightmap.height_at(base1 + 1);
            let hm = (h00 + h01 + h10 + h11) / 4.0;

            let (x0, x1) = (x as f32, (x + 1) as f32);
            let (z0, z1) = (z as f32, (z + 1) as f32);

            let ndx = (mesh.position.len() / 3) as u32;
            mesh.position.extend_from_slice(&[
                x0, h00, z0,
                x1, h01, z0,
                x0, h10, z1,
                x1, h11, z1,
                (x0 + x1) / 2.0, hm, (z0 + z1) / 2.0,
            ]);

            let u0 = x as f32 / cells_across as f32;
            let v0 = z as f32 / cells_deep as f32;
            let u1 = (x + 1) as f32 / cells_across as f32;
            let v1 = (z + 1) as f32 / cells_deep as f32;
            mesh.texcoord.extend_from_slice(&[
                u0, v0,
                u1, v0,
                u0, v1,
                u1, v1,
                (u0 + u1) / 2.0, (v0 + v1) / 2.0,
            ]);

            mesh.indices.extend_from_slice(&[
                ndx, ndx + 4, ndx + 1,
                ndx, ndx + 2, ndx + 4,
                ndx + 2, ndx + 3, ndx + 4,
                ndx + 1, ndx + 4, ndx + 3,
            ]);
        }
    }

    mesh
}

fn vertex(data: &[f32], index: usize) -> Vector3<f32> {
    Vector3::new(data[index * 3], data[index * 3 + 1], data[index * 3 + 2])
}

fn position_key(p: &Vector3<f32>) -> [u32; 3] {
    [p.x.to_bits(), p.y.to_bits(), p.z.to_bits()]
}

/// Compute vertex normals, smoothing only across faces whose normals differ
/// by less than `max_angle` radians.
///
/// Vertices are considered shared when their positions match exactly. The
/// output is re-indexed: vertices with identical position, normal and
/// texcoord are merged.
pub fn generate_normals(mesh: &IndexedMesh, max_angle: f32) -> IndexedMesh {
    let indices: Vec<usize> = mesh.indices.iter().map(|&i| i as usize).collect();
    let has_texcoords = !mesh.texcoord.is_empty();

    let face_normals: Vec<Vector3<f32>> = indices
        .chunks_exact(3)
        .map(|tri| {
            let v1 = vertex(&mesh.position, tri[0]);
            let v2 = vertex(&mesh.position, tri[1]);
            let v3 = vertex(&mesh.position, tri[2]);
            normalize_or_zero((v1 - v2).cross(&(v3 - v2)))
        })
        .collect();

    // Map every input vertex to a shared id by exact position.
    let mut shared_ids: HashMap<[u32; 3], usize> = HashMap::new();
    let vertex_count = mesh.position.len() / 3;
    let shared: Vec<usize> = (0..vertex_count)
        .map(|i| {
            let next = shared_ids.len();
            *shared_ids.entry(position_key(&vertex(&mesh.position, i))).or_insert(next)
        })
        .collect();

    let mut faces_of: Vec<Vec<usize>> = vec![Vec::new(); shared_ids.len()];
    for (face, tri) in indices.chunks_exact(3).enumerate() {
        for &i in tri {
            faces_of[shared[i]].push(face);
        }
    }

    let max_angle_cos = max_angle.cos();
    let mut out = IndexedMesh::default();
    let mut merged: HashMap<[u32; 8], u32> = HashMap::new();

    for (face, tri) in indices.chunks_exact(3).enumerate() {
        let this_normal = face_normals[face];
        for &i in tri {
            let sum = faces_of[shared[i]]
                .iter()
                .map(|&other| face_normals[other])
                .filter(|other| this_normal.dot(other) > max_angle_cos)
                .fold(Vector3::zeros(), |acc, n| acc + n);
            let normal = normalize_or_zero(sum);

            let p = vertex(&mesh.position, i);
            let uv = if has_texcoords {
                [mesh.texcoord[i * 2], mesh.texcoord[i * 2 + 1]]
            } else {
                [0.0, 0.0]
            };

            let key = [
                p.x.to_bits(),
                p.y.to_bits(),
                p.z.to_bits(),
                normal.x.to_bits(),
                normal.y.to_bits(),
                normal.z.to_bits(),
                uv[0].to_bits(),
                uv[1].to_bits(),
            ];
            let index = *merged.entry(key).or_insert_with(|| {
                out.position.extend_from_slice(p.as_slice());
                out.normal.extend_from_slice(normal.as_slice());
                if has_texcoords {
                    out.texcoord.extend_from_slice(&uv);
                }
                (out.position.len() / 3 - 1) as u32
            });
            out.indices.push(index);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_places_terrain_below_origin() {
        let config = TerrainConfig::default();
        let p = config.terrain_matrix(0.0).transform_point(&Point3::new(3.0, 2.0, 1.0));
        assert_eq!(p, Point3::new(3.0, 1.0, 1.0));

        let camera = config.camera();
        assert_eq!(camera.position, Point3::new(0.0, 50.0, 100.0));
        assert_eq!(config.cube_matrix(0.0), Matrix4::identity());
    }

    #[test]
    fn test_config_build_has_normals() {
        let config = TerrainConfig::default();
        let mesh = config.build(&Heightmap::new(3, 3, vec![0, 40, 0, 40, 200, 40, 0, 40, 0]));
        assert_eq!(mesh.normal.len(), mesh.position.len());
        assert_eq!(mesh.triangle_count(), 16);
    }

    #[test]
    fn test_heightmap_from_rgba() {
        let rgba = [255, 0, 0, 255, 0, 9, 9, 255];
        let heightmap = Heightmap::from_rgba(2, 1, &rgba);
        assert_eq!(heightmap.samples, vec![255, 0]);
        assert!((heightmap.height_at(0) - 10.0).abs() < 1e-6);
        assert_eq!(heightmap.height_at(1), 0.0);
    }

    #[test]
    fn test_single_cell() {
        let heightmap = Heightmap::new(2, 2, vec![0, 255, 0, 255]);
        let mesh = build_terrain(&heightmap);
        assert_eq!(mesh.position.len(), 15);
        assert_eq!(mesh.texcoord.len(), 10);
        assert_eq!(mesh.triangle_count(), 4);

        // Centre vertex sits at the mean height
        assert!((mesh.position[13] - 5.0).abs() < 1e-5);
        assert_eq!(&mesh.texcoord[8..10], &[0.5, 0.5]);
        assert_eq!(&mesh.indices[0..3], &[0, 4, 1]);
    }

    #[test]
    fn test_grid_size() {
        let heightmap = Heightmap::new(4, 3, vec![0; 12]);
        let mesh = build_terrain(&heightmap);
        assert_eq!(mesh.triangle_count(), 3 * 2 * 4);
        assert_eq!(mesh.position.len() / 3, 3 * 2 * 5);
    }

    #[test]
    fn test_flat_terrain_normals_point_up() {
        let heightmap = Heightmap::new(3, 3, vec![0; 9]);
        let mesh = generate_normals(&build_terrain(&heightmap), 2.0_f32.to_radians());

        let first_y = mesh.normal[1];
        for normal in mesh.normal.chunks(3) {
            assert!(normal[0].abs() < 1e-6);
            assert!((normal[1].abs() - 1.0).abs() < 1e-6);
            assert_eq!(normal[1], first_y);
            assert!(normal[2].abs() < 1e-6);
        }
        // Shared corners collapse to one vertex each
        assert_eq!(mesh.position.len() / 3, 9 + 4);
        assert_eq!(mesh.triangle_count(), 16);
    }

    #[test]
    fn test_sharp_edges_stay_faceted() {
        // Two triangles folded at 90 degrees along the x axis
        let mesh = IndexedMesh {
            position: vec![
                0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 1.0,
                0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0,
            ],
            texcoord: Vec::new(),
            normal: Vec::new(),
            indices: vec![0, 1, 2, 3, 4, 5],
        };
        let out = generate_normals(&mesh, 2.0_f32.to_radians());
        // No vertices merge because each face keeps its own normal
        assert_eq!(out.position.len() / 3, 6);

        let smooth = generate_normals(&mesh, 100.0_f32.to_radians());
        // Shared edge vertices now average both faces
        assert_eq!(smooth.position.len() / 3, 4);
    }

    #[test]
    fn test_flatten() {
        let heightmap = Heightmap::new(2, 2, vec![0; 4]);
        let mesh = build_terrain(&heightmap).flatten();
        assert_eq!(mesh.position.len(), 4 * 9);
        assert_eq!(mesh.texcoord.len(), 4 * 6);
        assert!(mesh.indices.is_empty());
    }
}
