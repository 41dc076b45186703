/// Per-vertex tangents for normal mapping
use nalgebra::{Vector2, Vector3};

const FALLBACK_TANGENT: [f32; 3] = [1.0, 0.0, 0.0];

fn vec3_at(data: &[f32], index: usize) -> Option<Vector3<f32>> {
    let i = index * 3;
    data.get(i..i + 3).map(Vector3::from_column_slice)
}

fn vec2_at(data: &[f32], index: usize) -> Option<Vector2<f32>> {
    let i = index * 2;
    data.get(i..i + 2).map(Vector2::from_column_slice)
}

/// Positions and texcoords of one triangle, if every corner has both
fn corners(
    position: &[f32],
    texcoord: &[f32],
    triangle: &[usize],
) -> Option<([Vector3<f32>; 3], [Vector2<f32>; 3])> {
    let p = [
        vec3_at(position, triangle[0])?,
        vec3_at(position, triangle[1])?,
        vec3_at(position, triangle[2])?,
    ];
    let uv = [
        vec2_at(texcoord, triangle[0])?,
        vec2_at(texcoord, triangle[1])?,
        vec2_at(texcoord, triangle[2])?,
    ];
    Some((p, uv))
}

/// Normalize, mapping (near) zero-length vectors to zero instead of NaN.
pub(crate) fn normalize_or_zero(v: Vector3<f32>) -> Vector3<f32> {
    let length = v.norm();
    if length > 1e-5 {
        v / length
    } else {
        Vector3::zeros()
    }
}

/// Tangent of a single triangle from its positions and texture coordinates
pub fn triangle_tangent(p: [Vector3<f32>; 3], uv: [Vector2<f32>; 3]) -> Vector3<f32> {
    let dp12 = p[1] - p[0];
    let dp13 = p[2] - p[0];
    let duv12 = uv[1] - uv[0];
    let duv13 = uv[2] - uv[0];

    let f = 1.0 / (duv12.x * duv13.y - duv13.x * duv12.y);
    if !f.is_finite() {
        return Vector3::from(FALLBACK_TANGENT);
    }
    normalize_or_zero((dp12 * duv13.y - dp13 * duv12.y) * f)
}

/// Generate one tangent per face vertex.
///
/// Triangles are read three indices at a time from `indices`, or three
/// consecutive vertices at a time when unindexed. Each triangle's tangent is
/// repeated for its three vertices, so the result holds `9 * triangles`
/// floats. Triangles missing a position or texcoord get the fallback
/// tangent `[1, 0, 0]`.
pub fn generate_tangents(position: &[f32], texcoord: &[f32], indices: Option<&[u32]>) -> Vec<f32> {
    let face_vertices: Vec<usize> = match indices {
        Some(indices) => indices.iter().map(|&i| i as usize).collect(),
        None => (0..position.len() / 3).collect(),
    };

    let mut tangents = Vec::with_capacity(face_vertices.len() * 3);
    for triangle in face_vertices.chunks_exact(3) {
        let tangent = match corners(position, texcoord, triangle) {
            Some((p, uv)) => triangle_tangent(p, uv),
            None => Vector3::from(FALLBACK_TANGENT),
        };
        for _ in 0..3 {
            tangents.extend_from_slice(tangent.as_slice());
        }
    }
    tangents
}
