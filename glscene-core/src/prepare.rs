/// Turn parsed geometries into draw-ready vertex attributes.
///
/// Attributes a geometry lacks are replaced by a constant value so every part
/// can be drawn by the same shader.
///
/// Tangents are only generated on request through [`PrepareOptions`]. The
/// bundled frontends shade without normal maps, so they leave it off; the
/// `inspect_obj` example and library users that sample normal maps turn it
/// on.
use crate::mtl::{Material, MaterialLibrary};
use crate::obj::Geometry;
use crate::tangent::generate_tangents;

/// A vertex attribute backed by an array or a single constant value
#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Array { components: usize, data: Vec<f32> },
    Constant(Vec<f32>),
}

impl Attribute {
    fn array(components: usize, data: Vec<f32>) -> Self {
        Attribute::Array { components, data }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, Attribute::Constant(_))
    }
}

#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    /// Compute tangents for geometries that have both texcoords and normals
    pub generate_tangents: bool,
}

/// One drawable piece of a model
#[derive(Debug, Clone)]
pub struct MeshPart {
    pub material: Material,
    pub position: Vec<f32>,
    pub texcoord: Attribute,
    pub normal: Attribute,
    pub color: Attribute,
    pub tangent: Attribute,
}

impl MeshPart {
    pub fn vertex_count(&self) -> usize {
        self.position.len() / 3
    }
}

/// Build a mesh part, resolving its material against `materials`.
pub fn prepare_geometry(
    geometry: &Geometry,
    materials: &MaterialLibrary,
    options: &PrepareOptions,
) -> MeshPart {
    let data = &geometry.data;
    let position = data.position.clone().unwrap_or_default();

    let color = match &data.color {
        Some(color) => {
            let components = if color.len() == position.len() { 3 } else { 4 };
            Attribute::array(components, color.clone())
        }
        None => Attribute::Constant(vec![1.0, 1.0, 1.0, 1.0]),
    };

    let tangent = match (&data.texcoord, &data.normal) {
        (Some(texcoord), Some(_)) if options.generate_tangents => {
            Attribute::array(3, generate_tangents(&position, texcoord, None))
        }
        _ => Attribute::Constant(vec![1.0, 0.0, 0.0]),
    };

    let texcoord = match &data.texcoord {
        Some(texcoord) => Attribute::array(2, texcoord.clone()),
        None => Attribute::Constant(vec![0.0, 0.0]),
    };

    let normal = match &data.normal {
        Some(normal) => Attribute::array(3, normal.clone()),
        None => Attribute::Constant(vec![0.0, 0.0, 1.0]),
    };

    let defaults = Material::surface_defaults();
    let material = materials
        .get(&geometry.material)
        .map(|m| m.merged_over(&defaults))
        .unwrap_or(defaults);

    MeshPart {
        material,
        position,
        texcoord,
        normal,
        color,
        tangent,
    }
}

/// Prepare every geometry of a model
pub fn prepare_all(
    geometries: &[Geometry],
    materials: &MaterialLibrary,
    options: &PrepareOptions,
) -> Vec<MeshPart> {
    geometries
        .iter()
        .map(|g| prepare_geometry(g, materials, options))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mtl::parse_mtl;
    use crate::obj::parse_obj;

    const TEXTURED: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 1 0\nvt 0 1\nvn 0 0 1\n\
                            usemtl red\nf 1/1/1 2/2/1 3/3/1";

    #[test]
    fn test_bare_geometry_gets_constants() {
        let obj = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3").unwrap();
        let part = prepare_geometry(&obj.geometries[0], &MaterialLibrary::new(), &PrepareOptions::default());

        assert_eq!(part.vertex_count(), 3);
        assert_eq!(part.color, Attribute::Constant(vec![1.0, 1.0, 1.0, 1.0]));
        assert_eq!(part.texcoord, Attribute::Constant(vec![0.0, 0.0]));
        assert_eq!(part.normal, Attribute::Constant(vec![0.0, 0.0, 1.0]));
        assert_eq!(part.tangent, Attribute::Constant(vec![1.0, 0.0, 0.0]));
        assert_eq!(part.material, Material::surface_defaults());
    }

    #[test]
    fn test_tangents_when_requested() {
        let obj = parse_obj(TEXTURED).unwrap();
        let options = PrepareOptions { generate_tangents: true };
        let part = prepare_geometry(&obj.geometries[0], &MaterialLibrary::new(), &options);
        match part.tangent {
            Attribute::Array { components, data } => {
                assert_eq!(components, 3);
                assert_eq!(data.len(), 9);
            }
            Attribute::Constant(_) => panic!("expected generated tangents"),
        }

        let part = prepare_geometry(&obj.geometries[0], &MaterialLibrary::new(), &PrepareOptions::default());
        assert!(part.tangent.is_constant());
    }

    #[test]
    fn test_tangents_with_missing_texcoord_corner() {
        let obj = parse_obj("v 0 0 0\nv 1 0 0\nv 0 1 0\nvt 0 0\nvt 0 1\nvn 0 0 1\nf 1/1/1 2//1 3/2/1").unwrap();
        let options = PrepareOptions { generate_tangents: true };
        let part = prepare_geometry(&obj.geometries[0], &MaterialLibrary::new(), &options);
        match part.tangent {
            Attribute::Array { data, .. } => {
                assert_eq!(data, vec![1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
            }
            Attribute::Constant(_) => panic!("expected generated tangents"),
        }
    }

    #[test]
    fn test_color_components() {
        let rgb = parse_obj("v 0 0 0 1 0 0\nv 1 0 0 0 1 0\nv 0 1 0 0 0 1\nf 1 2 3").unwrap();
        let part = prepare_geometry(&rgb.geometries[0], &MaterialLibrary::new(), &PrepareOptions::default());
        assert!(matches!(part.color, Attribute::Array { components: 3, .. }));

        let rgba = parse_obj("v 0 0 0 1 0 0 1\nv 1 0 0 0 1 0 1\nv 0 1 0 0 0 1 1\nf 1 2 3").unwrap();
        let part = prepare_geometry(&rgba.geometries[0], &MaterialLibrary::new(), &PrepareOptions::default());
        assert!(matches!(part.color, Attribute::Array { components: 4, .. }));
    }

    #[test]
    fn test_material_is_merged() {
        let obj = parse_obj(TEXTURED).unwrap();
        let materials = parse_mtl("newmtl red\nKd 1 0 0\nNs 5").unwrap();
        let parts = prepare_all(&obj.geometries, &materials, &PrepareOptions::default());
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].material.shininess, Some(5.0));
        assert_eq!(parts[0].material.opacity, Some(1.0));
    }
}
