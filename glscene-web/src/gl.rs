/// WebGL2 plumbing shared by the demo apps: one lit program, meshes kept in
/// vertex array objects, and per-draw material uniforms.
use glscene_core::{Attribute, Camera, Material, Mesh, MeshPart};
use js_sys::Float32Array;
use nalgebra::{Matrix4, Vector3};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    HtmlCanvasElement, WebGl2RenderingContext as Gl, WebGlProgram, WebGlShader, WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use crate::error;

const VERTEX_SHADER: &str = r#"#version 300 es
in vec4 a_position;
in vec3 a_normal;
in vec4 a_color;

uniform mat4 u_projection;
uniform mat4 u_view;
uniform mat4 u_world;
uniform vec3 u_viewWorldPosition;

out vec3 v_normal;
out vec3 v_surfaceToView;
out vec4 v_color;

void main() {
    vec4 worldPosition = u_world * a_position;
    gl_Position = u_projection * u_view * worldPosition;
    v_surfaceToView = u_viewWorldPosition - worldPosition.xyz;
    v_normal = mat3(u_world) * a_normal;
    v_color = a_color;
}
"#;

const FRAGMENT_SHADER: &str = r#"#version 300 es
precision highp float;

in vec3 v_normal;
in vec3 v_surfaceToView;
in vec4 v_color;

uniform vec3 u_diffuse;
uniform vec3 u_ambient;
uniform vec3 u_emissive;
uniform vec3 u_specular;
uniform float u_shininess;
uniform float u_opacity;
uniform vec3 u_lightDirection;
uniform vec3 u_ambientLight;
uniform vec4 u_colorMult;

out vec4 outColor;

void main() {
    vec3 normal = normalize(v_normal);
    vec3 surfaceToViewDirection = normalize(v_surfaceToView);
    vec3 halfVector = normalize(u_lightDirection + surfaceToViewDirection);

    float fakeLight = dot(u_lightDirection, normal) * .5 + .5;
    float specularLight = clamp(dot(normal, halfVector), 0.0, 1.0);

    vec3 effectiveDiffuse = u_diffuse * v_color.rgb * u_colorMult.rgb;
    float effectiveOpacity = u_opacity * v_color.a * u_colorMult.a;

    outColor = vec4(
        u_emissive +
        u_ambient * u_ambientLight +
        effectiveDiffuse * fakeLight +
        u_specular * pow(specularLight, u_shininess),
        effectiveOpacity);
}
"#;

const UNIFORMS: &[&str] = &[
    "u_projection",
    "u_view",
    "u_world",
    "u_viewWorldPosition",
    "u_diffuse",
    "u_ambient",
    "u_emissive",
    "u_specular",
    "u_shininess",
    "u_opacity",
    "u_lightDirection",
    "u_ambientLight",
    "u_colorMult",
];

/// A mesh uploaded to the GPU
pub struct GpuMesh {
    vao: WebGlVertexArrayObject,
    count: i32,
    /// Attributes without an array, set before each draw
    constants: Vec<(u32, [f32; 4])>,
    pub material: Material,
}

/// Per-frame scene inputs common to every draw
struct FrameUniforms<'a> {
    camera: &'a Camera,
    light_direction: Vector3<f32>,
    ambient_light: Vector3<f32>,
}

pub struct GlContext {
    gl: Gl,
    canvas: HtmlCanvasElement,
    program: WebGlProgram,
    uniforms: Vec<Option<WebGlUniformLocation>>,
}

impl GlContext {
    /// Set up WebGL2 on the canvas with id `canvas_id`
    pub fn new(canvas_id: &str) -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| error("missing window"))?;
        let document = window.document().ok_or_else(|| error("missing document"))?;
        let canvas = document
            .get_element_by_id(canvas_id)
            .ok_or_else(|| error("canvas not found"))?
            .dyn_into::<HtmlCanvasElement>()?;

        let gl: Gl = canvas
            .get_context("webgl2")?
            .ok_or_else(|| error("webgl2 context unavailable"))?
            .dyn_into()?;

        let vert_shader = compile_shader(&gl, Gl::VERTEX_SHADER, VERTEX_SHADER)?;
        let frag_shader = compile_shader(&gl, Gl::FRAGMENT_SHADER, FRAGMENT_SHADER)?;
        let program = link_program(&gl, &vert_shader, &frag_shader)?;

        let uniforms = UNIFORMS
            .iter()
            .map(|name| gl.get_uniform_location(&program, name))
            .collect();

        Ok(Self {
            gl,
            canvas,
            program,
            uniforms,
        })
    }

    fn uniform(&self, name: &str) -> Option<&WebGlUniformLocation> {
        let index = UNIFORMS.iter().position(|u| *u == name)?;
        self.uniforms[index].as_ref()
    }

    /// Upload a prepared model part
    pub fn upload_part(&self, part: &MeshPart) -> Result<GpuMesh, JsValue> {
        let position = Attribute::Array {
            components: 3,
            data: part.position.clone(),
        };
        self.upload(
            &[
                ("a_position", &position),
                ("a_normal", &part.normal),
                ("a_color", &part.color),
            ],
            part.vertex_count(),
            part.material.clone(),
        )
    }

    /// Upload a mesh drawn in a single color
    pub fn upload_mesh(&self, mesh: &Mesh, color: [f32; 4]) -> Result<GpuMesh, JsValue> {
        let (position, normal) = mesh.to_arrays();
        self.upload_arrays(position, normal, color)
    }

    /// Upload non-indexed position and normal arrays drawn in a single color
    pub fn upload_arrays(&self, position: Vec<f32>, normal: Vec<f32>, color: [f32; 4]) -> Result<GpuMesh, JsValue> {
        let count = position.len() / 3;
        self.upload(
            &[
                ("a_position", &Attribute::Array { components: 3, data: position }),
                ("a_normal", &Attribute::Array { components: 3, data: normal }),
                ("a_color", &Attribute::Constant(color.to_vec())),
            ],
            count,
            Material::surface_defaults(),
        )
    }

    fn upload(&self, attributes: &[(&str, &Attribute)], count: usize, material: Material) -> Result<GpuMesh, JsValue> {
        let gl = &self.gl;
        let vao = gl
            .create_vertex_array()
            .ok_or_else(|| error("failed to create vertex array"))?;
        gl.bind_vertex_array(Some(&vao));

        let mut constants = Vec::new();
        for (name, attribute) in attributes {
            // Attributes the shader does not read are optimised out.
            let Ok(location) = u32::try_from(gl.get_attrib_location(&self.program, name)) else {
                continue;
            };

            match attribute {
                Attribute::Array { components, data } => {
                    let buffer = gl.create_buffer().ok_or_else(|| error("failed to create buffer"))?;
                    gl.bind_buffer(Gl::ARRAY_BUFFER, Some(&buffer));
                    let array = Float32Array::from(data.as_slice());
                    gl.buffer_data_with_array_buffer_view(Gl::ARRAY_BUFFER, &array, Gl::STATIC_DRAW);
                    gl.enable_vertex_attrib_array(location);
                    gl.vertex_attrib_pointer_with_i32(location, *components as i32, Gl::FLOAT, false, 0, 0);
                }
                Attribute::Constant(value) => {
                    gl.disable_vertex_attrib_array(location);
                    constants.push((location, pad4(value)));
                }
            }
        }

        gl.bind_vertex_array(None);
        Ok(GpuMesh {
            vao,
            count: count as i32,
            constants,
            material,
        })
    }

    /// Match the drawing buffer to the displayed canvas size
    fn resize_to_display(&self) {
        let width = self.canvas.client_width().max(1) as u32;
        let height = self.canvas.client_height().max(1) as u32;
        if self.canvas.width() != width || self.canvas.height() != height {
            self.canvas.set_width(width);
            self.canvas.set_height(height);
        }
    }

    /// Clear the canvas and set the camera and light for this frame.
    ///
    /// Updates the camera's aspect ratio to the canvas.
    pub fn begin_frame(&self, camera: &mut Camera, light_direction: Vector3<f32>, ambient_light: Vector3<f32>) {
        self.resize_to_display();
        let (width, height) = (self.canvas.width(), self.canvas.height());
        camera.set_viewport(width, height);

        let gl = &self.gl;
        gl.viewport(0, 0, width as i32, height as i32);
        gl.enable(Gl::DEPTH_TEST);
        gl.clear_color(0.0, 0.0, 0.0, 1.0);
        gl.clear(Gl::COLOR_BUFFER_BIT | Gl::DEPTH_BUFFER_BIT);
        gl.use_program(Some(&self.program));

        let frame = FrameUniforms {
            camera,
            light_direction: light_direction.try_normalize(1e-6).unwrap_or_else(Vector3::z),
            ambient_light,
        };
        self.set_frame_uniforms(&frame);
    }

    fn set_frame_uniforms(&self, frame: &FrameUniforms) {
        let gl = &self.gl;
        gl.uniform_matrix4fv_with_f32_array(
            self.uniform("u_projection"),
            false,
            frame.camera.projection_matrix().as_slice(),
        );
        gl.uniform_matrix4fv_with_f32_array(self.uniform("u_view"), false, frame.camera.view_matrix().as_slice());
        gl.uniform3fv_with_f32_array(
            self.uniform("u_viewWorldPosition"),
            frame.camera.position.coords.as_slice(),
        );
        gl.uniform3fv_with_f32_array(self.uniform("u_lightDirection"), frame.light_direction.as_slice());
        gl.uniform3fv_with_f32_array(self.uniform("u_ambientLight"), frame.ambient_light.as_slice());
    }

    fn set_material(&self, material: &Material) {
        let defaults = Material::surface_defaults();
        let material = material.merged_over(&defaults);
        let gl = &self.gl;
        let vec3 = |v: Option<Vector3<f32>>| v.unwrap_or_else(Vector3::zeros);

        gl.uniform3fv_with_f32_array(self.uniform("u_diffuse"), vec3(material.diffuse).as_slice());
        gl.uniform3fv_with_f32_array(self.uniform("u_ambient"), vec3(material.ambient).as_slice());
        gl.uniform3fv_with_f32_array(self.uniform("u_emissive"), vec3(material.emissive).as_slice());
        gl.uniform3fv_with_f32_array(self.uniform("u_specular"), vec3(material.specular).as_slice());
        gl.uniform1f(self.uniform("u_shininess"), material.shininess.unwrap_or(100.0));
        gl.uniform1f(self.uniform("u_opacity"), material.opacity.unwrap_or(1.0));
    }

    /// Draw a mesh placed by `world`, tinted by `color_mult`
    pub fn draw(&self, mesh: &GpuMesh, world: &Matrix4<f32>, color_mult: [f32; 4]) {
        let gl = &self.gl;
        self.set_material(&mesh.material);
        gl.uniform_matrix4fv_with_f32_array(self.uniform("u_world"), false, world.as_slice());
        gl.uniform4fv_with_f32_array(self.uniform("u_colorMult"), &color_mult);

        gl.bind_vertex_array(Some(&mesh.vao));
        for (location, [x, y, z, w]) in &mesh.constants {
            gl.vertex_attrib4f(*location, *x, *y, *z, *w);
        }
        gl.draw_arrays(Gl::TRIANGLES, 0, mesh.count);
        gl.bind_vertex_array(None);
    }
}

/// Constant attribute value in the `(0, 0, 0, 1)` default layout
fn pad4(value: &[f32]) -> [f32; 4] {
    let mut out = [0.0, 0.0, 0.0, 1.0];
    for (slot, v) in out.iter_mut().zip(value) {
        *slot = *v;
    }
    out
}

fn compile_shader(gl: &Gl, shader_type: u32, source: &str) -> Result<WebGlShader, JsValue> {
    let shader = gl
        .create_shader(shader_type)
        .ok_or_else(|| error("unable to create shader object"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    if gl
        .get_shader_parameter(&shader, Gl::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(shader)
    } else {
        let log = gl
            .get_shader_info_log(&shader)
            .unwrap_or_else(|| "unknown error creating shader".into());
        gl.delete_shader(Some(&shader));
        Err(error(&log))
    }
}

fn link_program(gl: &Gl, vert_shader: &WebGlShader, frag_shader: &WebGlShader) -> Result<WebGlProgram, JsValue> {
    let program = gl
        .create_program()
        .ok_or_else(|| error("unable to create shader program"))?;
    gl.attach_shader(&program, vert_shader);
    gl.attach_shader(&program, frag_shader);
    gl.link_program(&program);

    if gl
        .get_program_parameter(&program, Gl::LINK_STATUS)
        .as_bool()
        .unwrap_or(false)
    {
        Ok(program)
    } else {
        let log = gl
            .get_program_info_log(&program)
            .unwrap_or_else(|| "unknown error linking program".into());
        gl.delete_program(Some(&program));
        Err(error(&log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad4() {
        assert_eq!(pad4(&[0.5, 0.25]), [0.5, 0.25, 0.0, 1.0]);
        assert_eq!(pad4(&[1.0, 1.0, 1.0, 0.5]), [1.0, 1.0, 1.0, 0.5]);
    }

    #[test]
    fn test_every_uniform_is_declared() {
        for name in UNIFORMS {
            let declared = VERTEX_SHADER.contains(name) || FRAGMENT_SHADER.contains(name);
            assert!(declared, "{name} missing from shaders");
        }
    }
}
