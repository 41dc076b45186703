/// Wavefront OBJ parser.
///
/// Produces one [`Geometry`] per run of faces sharing an object, group and
/// material, with flat per-vertex attribute arrays ready to upload. Faces
/// are fan-triangulated. This is not a full OBJ implementation: curves,
/// lines and smoothing groups are ignored.
use log::{debug, warn};

use crate::error::{ParseError, Table};
use crate::text::{directives, floats, leading_float, leading_int, Directive};

/// Flat vertex attribute arrays of one geometry.
///
/// An attribute that no face supplied is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GeometryData {
    /// 3 floats per vertex
    pub position: Option<Vec<f32>>,
    /// 2 floats per vertex
    pub texcoord: Option<Vec<f32>>,
    /// 3 floats per vertex
    pub normal: Option<Vec<f32>>,
    /// 3 or 4 floats per vertex
    pub color: Option<Vec<f32>>,
}

impl GeometryData {
    pub fn vertex_count(&self) -> usize {
        self.position.as_ref().map_or(0, |p| p.len() / 3)
    }

    pub fn triangle_count(&self) -> usize {
        self.vertex_count() / 3
    }
}

/// A mesh chunk sharing a single object, group list and material
#[derive(Debug, Clone, PartialEq)]
pub struct Geometry {
    pub object: String,
    pub groups: Vec<String>,
    pub material: String,
    pub data: GeometryData,
}

/// Result of parsing an OBJ document
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjData {
    pub geometries: Vec<Geometry>,
    /// Material library file names in `mtllib` order
    pub material_libs: Vec<String>,
}

impl ObjData {
    pub fn triangle_count(&self) -> usize {
        self.geometries.iter().map(|g| g.data.triangle_count()).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    Vertex,
    Texcoord,
    Normal,
    Face,
    Smoothing,
    MaterialLib,
    UseMaterial,
    Group,
    Object,
}

impl Keyword {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "v" => Keyword::Vertex,
            "vt" => Keyword::Texcoord,
            "vn" => Keyword::Normal,
            "f" => Keyword::Face,
            "s" => Keyword::Smoothing,
            "mtllib" => Keyword::MaterialLib,
            "usemtl" => Keyword::UseMaterial,
            "g" => Keyword::Group,
            "o" => Keyword::Object,
            _ => return None,
        })
    }
}

#[derive(Default)]
struct Accumulator {
    position: Vec<f32>,
    texcoord: Vec<f32>,
    normal: Vec<f32>,
    color: Vec<f32>,
}

impl Accumulator {
    fn finish(self) -> GeometryData {
        let keep = |values: Vec<f32>| (!values.is_empty()).then_some(values);
        GeometryData {
            position: keep(self.position),
            texcoord: keep(self.texcoord),
            normal: keep(self.normal),
            color: keep(self.color),
        }
    }
}

struct OpenGeometry {
    object: String,
    groups: Vec<String>,
    material: String,
    data: Accumulator,
}

struct ObjParser {
    // Index 0 of every table is a placeholder so 1-based indices line up.
    positions: Vec<[f32; 3]>,
    texcoords: Vec<[f32; 2]>,
    normals: Vec<[f32; 3]>,
    colors: Vec<Vec<f32>>,

    geometries: Vec<OpenGeometry>,
    current: Option<usize>,
    material_libs: Vec<String>,

    object: String,
    groups: Vec<String>,
    material: String,
}

impl ObjParser {
    fn new() -> Self {
        Self {
            positions: vec![[0.0; 3]],
            texcoords: vec![[0.0; 2]],
            normals: vec![[0.0; 3]],
            colors: vec![vec![0.0; 3]],
            geometries: Vec::new(),
            current: None,
            material_libs: Vec::new(),
            object: "default".to_string(),
            groups: vec!["default".to_string()],
            material: "default".to_string(),
        }
    }

    fn handle(&mut self, keyword: Keyword, directive: &Directive<'_>) -> Result<(), ParseError> {
        let parts = &directive.parts;
        match keyword {
            Keyword::Vertex => {
                self.positions.push(floats::<3>(parts));
                if parts.len() > 3 {
                    let color = parts[3..].iter().take(4).map(|t| leading_float(t)).collect();
                    self.colors.push(color);
                }
            }
            Keyword::Texcoord => self.texcoords.push(floats::<2>(parts)),
            Keyword::Normal => self.normals.push(floats::<3>(parts)),
            Keyword::Face => self.add_face(directive)?,
            Keyword::Smoothing => {}
            Keyword::MaterialLib => self.material_libs.push(parts.join(" ")),
            Keyword::UseMaterial => {
                self.material = directive.unparsed.to_string();
                self.close_geometry();
            }
            Keyword::Group => {
                self.groups = parts.iter().map(|s| s.to_string()).collect();
                self.close_geometry();
            }
            Keyword::Object => {
                self.object = directive.unparsed.to_string();
                self.close_geometry();
            }
        }
        Ok(())
    }

    /// Stop appending to the current geometry, unless it is still empty.
    fn close_geometry(&mut self) {
        if let Some(index) = self.current {
            if !self.geometries[index].data.position.is_empty() {
                self.current = None;
            }
        }
    }

    fn open_geometry(&mut self) -> usize {
        match self.current {
            Some(index) => index,
            None => {
                self.geometries.push(OpenGeometry {
                    object: self.object.clone(),
                    groups: self.groups.clone(),
                    material: self.material.clone(),
                    data: Accumulator::default(),
                });
                let index = self.geometries.len() - 1;
                self.current = Some(index);
                index
            }
        }
    }

    fn add_face(&mut self, directive: &Directive<'_>) -> Result<(), ParseError> {
        let refs = &directive.parts;
        if refs.len() < 3 {
            return Err(ParseError::DegenerateFace {
                line: directive.line,
                count: refs.len(),
            });
        }

        let geometry = self.open_geometry();
        for tri in 0..refs.len() - 2 {
            for vertex in [refs[0], refs[tri + 1], refs[tri + 2]] {
                self.add_vertex(geometry, vertex, directive)?;
            }
        }
        Ok(())
    }

    fn add_vertex(
        &mut self,
        geometry: usize,
        vertex: &str,
        directive: &Directive<'_>,
    ) -> Result<(), ParseError> {
        let has_colors = self.colors.len() > 1;

        for (component, token) in vertex.split('/').take(3).enumerate() {
            if token.is_empty() {
                continue;
            }
            let obj_index = leading_int(token).ok_or_else(|| ParseError::InvalidIndex {
                line: directive.line,
                keyword: directive.keyword.to_string(),
                token: token.to_string(),
            })?;

            let (table, len) = match component {
                0 => (Table::Position, self.positions.len()),
                1 => (Table::Texcoord, self.texcoords.len()),
                _ => (Table::Normal, self.normals.len()),
            };
            let index = resolve_index(obj_index, len, table, directive)?;

            let data = &mut self.geometries[geometry].data;
            match table {
                Table::Position => data.position.extend_from_slice(&self.positions[index]),
                Table::Texcoord => data.texcoord.extend_from_slice(&self.texcoords[index]),
                _ => data.normal.extend_from_slice(&self.normals[index]),
            }

            // Colors follow the position index whenever any `v` line had them.
            if table == Table::Position && has_colors {
                let color = self.colors.get(index).ok_or_else(|| ParseError::IndexOutOfRange {
                    line: directive.line,
                    keyword: directive.keyword.to_string(),
                    table: Table::Color,
                    index: index as i64,
                    len: self.colors.len(),
                })?;
                data.color.extend_from_slice(color);
            }
        }
        Ok(())
    }

    fn finish(self) -> ObjData {
        let geometries = self
            .geometries
            .into_iter()
            .map(|g| Geometry {
                object: g.object,
                groups: g.groups,
                material: g.material,
                data: g.data.finish(),
            })
            .collect();

        ObjData {
            geometries,
            material_libs: self.material_libs,
        }
    }
}

/// Turn a 1-based (or negative, relative) OBJ index into a table index.
fn resolve_index(
    obj_index: i64,
    len: usize,
    table: Table,
    directive: &Directive<'_>,
) -> Result<usize, ParseError> {
    let index = if obj_index >= 0 {
        obj_index
    } else {
        obj_index + len as i64
    };

    if index < 0 || index as usize >= len {
        return Err(ParseError::IndexOutOfRange {
            line: directive.line,
            keyword: directive.keyword.to_string(),
            table,
            index: obj_index,
            len,
        });
    }
    Ok(index as usize)
}

/// Parse an OBJ document.
pub fn parse_obj(text: &str) -> Result<ObjData, ParseError> {
    let mut parser = ObjParser::new();

    for directive in directives(text) {
        match Keyword::from_token(directive.keyword) {
            Some(keyword) => parser.handle(keyword, &directive)?,
            None => warn!("unhandled OBJ keyword `{}` on line {}", directive.keyword, directive.line),
        }
    }

    let data = parser.finish();
    debug!(
        "parsed OBJ: {} geometries, {} triangles, {} material libs",
        data.geometries.len(),
        data.triangle_count(),
        data.material_libs.len()
    );
    Ok(data)
}
