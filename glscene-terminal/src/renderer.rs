/// ASCII rasterizer for terminal rendering
use crossterm::{
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use glscene_core::{Camera, Mesh, Triangle};
use nalgebra::{Matrix4, Vector3};
use std::io::Write;

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Light that reaches faces turned away from the light direction
const AMBIENT: f32 = 0.15;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Cell {
    character: char,
    color: Color,
}

const BLANK: Cell = Cell {
    character: ' ',
    color: Color::Reset,
};

/// Base color of a mesh, RGB in `[0, 1]`
pub type Tint = [f32; 3];

/// ASCII renderer that converts 3D meshes to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    cells: Vec<Cell>,
    light_direction: Vector3<f32>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            cells: vec![BLANK; size],
            light_direction: Vector3::z(),
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self {
            light_direction: self.light_direction,
            ..Self::new(width, height)
        };
    }

    /// Direction towards the light, in world space
    pub fn set_light_direction(&mut self, direction: Vector3<f32>) {
        self.light_direction = direction.try_normalize(1e-6).unwrap_or_else(Vector3::z);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.cells.fill(BLANK);
    }

    /// Camera matching the character grid; cells are about twice as tall as
    /// they are wide.
    pub fn fit_camera(&self, camera: &mut Camera) {
        camera.set_viewport(self.width as u32, self.height as u32 * 2);
    }

    pub fn render_mesh(&mut self, mesh: &Mesh, model_matrix: &Matrix4<f32>, camera: &Camera, tint: Tint) {
        for triangle in &mesh.triangles {
            self.render_triangle(triangle, model_matrix, camera, tint);
        }
    }

    fn render_triangle(&mut self, triangle: &Triangle, model_matrix: &Matrix4<f32>, camera: &Camera, tint: Tint) {
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (slot, vertex) in screen_coords.iter_mut().zip(&triangle.vertices) {
            match camera.project_to_screen(
                &vertex.position,
                model_matrix,
                self.width as u32,
                self.height as u32,
            ) {
                Some(coords) => *slot = coords,
                None => return, // Triangle is clipped
            }
        }

        let brightness = self.brightness(triangle, model_matrix);
        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        let cell = Cell {
            character: LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)],
            color: shade(tint, brightness),
        };

        self.rasterize_triangle(&screen_coords, cell);
    }

    /// Two-sided diffuse lighting of a triangle, in `[AMBIENT, 1]`
    fn brightness(&self, triangle: &Triangle, model_matrix: &Matrix4<f32>) -> f32 {
        let vertex_normal: Vector3<f32> = triangle.vertices.iter().map(|v| v.normal).sum();
        let normal = if vertex_normal.norm() > 1e-6 {
            vertex_normal
        } else {
            triangle.calculate_normal()
        };

        let world_normal = model_matrix.transform_vector(&normal);
        match world_normal.try_normalize(1e-6) {
            Some(n) => AMBIENT + (1.0 - AMBIENT) * n.dot(&self.light_direction).abs(),
            None => AMBIENT,
        }
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], cell: Cell) {
        let (v0, v1, v2) = (coords[0], coords[1], coords[2]);

        // Bounding box, clipped to the screen
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = (x as f32 + 0.5, y as f32 + 0.5);

                let Some((w0, w1, w2)) = barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), p) else {
                    continue;
                };
                if w0 < 0.0 || w1 < 0.0 || w2 < 0.0 {
                    continue;
                }

                let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                let idx = y as usize * self.width + x as usize;
                if depth < self.depth_buffer[idx] {
                    self.depth_buffer[idx] = depth;
                    self.cells[idx] = cell;
                }
            }
        }
    }

    /// Character at a cell, for inspection
    pub fn char_at(&self, x: usize, y: usize) -> char {
        self.cells[y * self.width + x].character
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut current = None;
        for row in self.cells.chunks(self.width.max(1)) {
            for cell in row {
                if current != Some(cell.color) {
                    writer.queue(SetForegroundColor(cell.color))?;
                    current = Some(cell.color);
                }
                writer.queue(Print(cell.character))?;
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn shade(tint: Tint, brightness: f32) -> Color {
    let channel = |c: f32| (c.clamp(0.0, 1.0) * brightness * 255.0).round() as u8;
    Color::Rgb {
        r: channel(tint[0]),
        g: channel(tint[1]),
        b: channel(tint[2]),
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

#[cfg(test)]
mod tests {
    use super::*;
    use glscene_core::CameraPose;
    use nalgebra::Point3;

    fn camera() -> Camera {
        Camera::looking(
            CameraPose::new(Point3::new(0.0, 0.0, 5.0), Point3::origin()),
            60f32.to_radians(),
            0.1,
            100.0,
        )
    }

    #[test]
    fn test_barycentric_inside_and_degenerate() {
        let (w0, w1, w2) = barycentric((0.0, 0.0), (4.0, 0.0), (0.0, 4.0), (1.0, 1.0)).unwrap();
        assert!(w0 > 0.0 && w1 > 0.0 && w2 > 0.0);
        assert!((w0 + w1 + w2 - 1.0).abs() < 1e-6);

        assert!(barycentric((0.0, 0.0), (1.0, 1.0), (2.0, 2.0), (1.0, 1.0)).is_none());
    }

    #[test]
    fn test_cube_covers_center() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let mut camera = camera();
        renderer.fit_camera(&mut camera);
        renderer.render_mesh(&Mesh::cube(2.0), &Matrix4::identity(), &camera, [1.0, 1.0, 1.0]);

        assert_ne!(renderer.char_at(20, 10), ' ');
        assert_eq!(renderer.char_at(0, 0), ' ');
    }

    #[test]
    fn test_facing_light_is_brightest() {
        let mut renderer = AsciiRenderer::new(40, 20);
        let mut camera = camera();
        renderer.fit_camera(&mut camera);
        renderer.render_mesh(&Mesh::cube(2.0), &Matrix4::identity(), &camera, [1.0, 1.0, 1.0]);
        assert_eq!(renderer.char_at(20, 10), '@');

        // Light from the side leaves the front face at ambient level.
        renderer.clear();
        renderer.set_light_direction(Vector3::x());
        renderer.render_mesh(&Mesh::cube(2.0), &Matrix4::identity(), &camera, [1.0, 1.0, 1.0]);
        assert_eq!(renderer.char_at(20, 10), ':');
    }

    #[test]
    fn test_shade_scales_tint() {
        assert_eq!(shade([1.0, 0.5, 0.0], 1.0), Color::Rgb { r: 255, g: 128, b: 0 });
        assert_eq!(shade([1.0, 1.0, 1.0], 0.0), Color::Rgb { r: 0, g: 0, b: 0 });
    }
}
