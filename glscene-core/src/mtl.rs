/// Wavefront MTL material library parser.
use std::collections::HashMap;

use log::{debug, warn};
use nalgebra::Vector3;

use crate::error::ParseError;
use crate::text::{directives, floats, leading_float, leading_int, Directive};

/// Texture map kinds a material can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureSlot {
    Diffuse,
    Specular,
    Normal,
}

/// Reflectance properties and texture references of one material.
///
/// Every field is optional; unset fields are filled from a fallback with
/// [`Material::merged_over`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Material {
    pub ambient: Option<Vector3<f32>>,
    pub diffuse: Option<Vector3<f32>>,
    pub specular: Option<Vector3<f32>>,
    pub emissive: Option<Vector3<f32>>,
    pub shininess: Option<f32>,
    pub optical_density: Option<f32>,
    pub opacity: Option<f32>,
    pub illum: Option<i32>,
    pub diffuse_map: Option<String>,
    pub specular_map: Option<String>,
    pub normal_map: Option<String>,
}

impl Material {
    /// Fallback surface used for geometries whose material is unknown
    pub fn surface_defaults() -> Self {
        Self {
            ambient: Some(Vector3::zeros()),
            diffuse: Some(Vector3::new(1.0, 1.0, 1.0)),
            specular: Some(Vector3::new(1.0, 1.0, 1.0)),
            shininess: Some(100.0),
            opacity: Some(1.0),
            ..Self::default()
        }
    }

    /// Fill every unset field from `fallback`.
    pub fn merged_over(&self, fallback: &Material) -> Material {
        Material {
            ambient: self.ambient.or(fallback.ambient),
            diffuse: self.diffuse.or(fallback.diffuse),
            specular: self.specular.or(fallback.specular),
            emissive: self.emissive.or(fallback.emissive),
            shininess: self.shininess.or(fallback.shininess),
            optical_density: self.optical_density.or(fallback.optical_density),
            opacity: self.opacity.or(fallback.opacity),
            illum: self.illum.or(fallback.illum),
            diffuse_map: self.diffuse_map.clone().or_else(|| fallback.diffuse_map.clone()),
            specular_map: self.specular_map.clone().or_else(|| fallback.specular_map.clone()),
            normal_map: self.normal_map.clone().or_else(|| fallback.normal_map.clone()),
        }
    }

    /// Texture file names referenced by this material
    pub fn texture_maps(&self) -> impl Iterator<Item = (TextureSlot, &str)> {
        [
            (TextureSlot::Diffuse, &self.diffuse_map),
            (TextureSlot::Specular, &self.specular_map),
            (TextureSlot::Normal, &self.normal_map),
        ]
        .into_iter()
        .filter_map(|(slot, map)| map.as_deref().map(|name| (slot, name)))
    }
}

/// Materials by name
pub type MaterialLibrary = HashMap<String, Material>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Keyword {
    NewMaterial,
    Ambient,
    Diffuse,
    Specular,
    Emissive,
    Shininess,
    OpticalDensity,
    Opacity,
    Illumination,
    DiffuseMap,
    SpecularMap,
    BumpMap,
}

impl Keyword {
    fn from_token(token: &str) -> Option<Self> {
        Some(match token {
            "newmtl" => Keyword::NewMaterial,
            "Ka" => Keyword::Ambient,
            "Kd" => Keyword::Diffuse,
            "Ks" => Keyword::Specular,
            "Ke" => Keyword::Emissive,
            "Ns" => Keyword::Shininess,
            "Ni" => Keyword::OpticalDensity,
            "d" => Keyword::Opacity,
            "illum" => Keyword::Illumination,
            "map_Kd" => Keyword::DiffuseMap,
            "map_Ns" => Keyword::SpecularMap,
            "map_Bump" => Keyword::BumpMap,
            _ => return None,
        })
    }
}

fn color(parts: &[&str]) -> Option<Vector3<f32>> {
    Some(Vector3::from(floats::<3>(parts)))
}

fn scalar(parts: &[&str]) -> Option<f32> {
    Some(parts.first().map_or(f32::NAN, |t| leading_float(t)))
}

fn apply(material: &mut Material, keyword: Keyword, directive: &Directive<'_>) {
    let parts = &directive.parts;
    // Map options such as `-bm 1.0` are kept as part of the file name.
    let map = || Some(directive.unparsed.to_string());

    match keyword {
        Keyword::NewMaterial => {}
        Keyword::Ambient => material.ambient = color(parts),
        Keyword::Diffuse => material.diffuse = color(parts),
        Keyword::Specular => material.specular = color(parts),
        Keyword::Emissive => material.emissive = color(parts),
        Keyword::Shininess => material.shininess = scalar(parts),
        Keyword::OpticalDensity => material.optical_density = scalar(parts),
        Keyword::Opacity => material.opacity = scalar(parts),
        Keyword::Illumination => {
            material.illum = parts
                .first()
                .and_then(|t| leading_int(t))
                .and_then(|v| i32::try_from(v).ok())
        }
        Keyword::DiffuseMap => material.diffuse_map = map(),
        Keyword::SpecularMap => material.specular_map = map(),
        Keyword::BumpMap => material.normal_map = map(),
    }
}

/// Parse an MTL document into a material library.
pub fn parse_mtl(text: &str) -> Result<MaterialLibrary, ParseError> {
    let mut materials = MaterialLibrary::new();
    let mut current: Option<String> = None;

    for directive in directives(text) {
        let Some(keyword) = Keyword::from_token(directive.keyword) else {
            warn!("unhandled MTL keyword `{}` on line {}", directive.keyword, directive.line);
            continue;
        };

        if keyword == Keyword::NewMaterial {
            let name = directive.unparsed.to_string();
            materials.insert(name.clone(), Material::default());
            current = Some(name);
            continue;
        }

        let material = current
            .as_ref()
            .and_then(|name| materials.get_mut(name))
            .ok_or_else(|| ParseError::NoActiveMaterial {
                line: directive.line,
                keyword: directive.keyword.to_string(),
            })?;
        apply(material, keyword, &directive);
    }

    debug!("parsed MTL: {} materials", materials.len());
    Ok(materials)
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIBRARY: &str = "\
# Blender MTL File
newmtl brick
Ns 96.078431
Ka 1.000000 1.000000 1.000000
Kd 0.640000 0.240000 0.100000
Ks 0.500000 0.500000 0.500000
Ke 0.000000 0.000000 0.000000
Ni 1.450000
d 1.000000
illum 2
map_Kd textures/brick diffuse.png
map_Ns textures/brick_spec.png
map_Bump -bm 1.0 textures/brick_normal.png

newmtl glass
Kd 0.1 0.2 0.3
d 0.25
";

    #[test]
    fn test_parse_library() {
        let materials = parse_mtl(LIBRARY).unwrap();
        assert_eq!(materials.len(), 2);

        let brick = &materials["brick"];
        assert!((brick.shininess.unwrap() - 96.078431).abs() < 1e-4);
        assert_eq!(brick.ambient, Some(Vector3::new(1.0, 1.0, 1.0)));
        assert!((brick.diffuse.unwrap().y - 0.24).abs() < 1e-6);
        assert_eq!(brick.optical_density, Some(1.45));
        assert_eq!(brick.opacity, Some(1.0));
        assert_eq!(brick.illum, Some(2));
        assert_eq!(brick.diffuse_map.as_deref(), Some("textures/brick diffuse.png"));
        assert_eq!(brick.specular_map.as_deref(), Some("textures/brick_spec.png"));
        assert_eq!(brick.normal_map.as_deref(), Some("-bm 1.0 textures/brick_normal.png"));

        let glass = &materials["glass"];
        assert_eq!(glass.opacity, Some(0.25));
        assert!(glass.specular.is_none());
        assert!(glass.diffuse_map.is_none());
    }

    #[test]
    fn test_properties_apply_to_latest_material() {
        let materials = parse_mtl("newmtl a\nnewmtl b\nNs 10").unwrap();
        assert!(materials["a"].shininess.is_none());
        assert_eq!(materials["b"].shininess, Some(10.0));
    }

    #[test]
    fn test_property_before_newmtl() {
        let err = parse_mtl("# comment\nKd 1 1 1\nnewmtl a").unwrap_err();
        assert_eq!(
            err,
            ParseError::NoActiveMaterial {
                line: 2,
                keyword: "Kd".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_keywords_are_skipped() {
        let materials = parse_mtl("newmtl a\nTf 1 1 1\nmap_d alpha.png\nKd 1 0 0").unwrap();
        assert_eq!(materials["a"].diffuse, Some(Vector3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn test_merged_over_defaults() {
        let materials = parse_mtl("newmtl a\nKd 1 0 0\nmap_Kd a.png").unwrap();
        let merged = materials["a"].merged_over(&Material::surface_defaults());
        assert_eq!(merged.diffuse, Some(Vector3::new(1.0, 0.0, 0.0)));
        assert_eq!(merged.specular, Some(Vector3::new(1.0, 1.0, 1.0)));
        assert_eq!(merged.shininess, Some(100.0));
        assert_eq!(merged.opacity, Some(1.0));
        assert_eq!(merged.diffuse_map.as_deref(), Some("a.png"));
    }

    #[test]
    fn test_texture_maps() {
        let materials = parse_mtl(LIBRARY).unwrap();
        let maps: Vec<_> = materials["brick"].texture_maps().collect();
        assert_eq!(maps.len(), 3);
        assert_eq!(maps[0], (TextureSlot::Diffuse, "textures/brick diffuse.png"));
        assert_eq!(materials["glass"].texture_maps().count(), 0);
    }
}
