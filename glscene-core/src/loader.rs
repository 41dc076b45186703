/// Model loading: read an OBJ, the material libraries it names and resolve
/// texture references, all relative to the OBJ's own location.
use std::collections::BTreeMap;
use std::path::PathBuf;

use log::info;

use crate::error::{AssetLoadError, LoadError};
use crate::mtl::{parse_mtl, MaterialLibrary};
use crate::obj::{parse_obj, ObjData};
use crate::prepare::{prepare_all, MeshPart, PrepareOptions};
use crate::showcase::Extents;

/// Split `scheme://host` off a location, if it has one.
fn split_origin(location: &str) -> (&str, &str) {
    match location.find("://") {
        Some(scheme_end) => {
            let after = scheme_end + 3;
            match location[after..].find('/') {
                Some(slash) => location.split_at(after + slash),
                None => (location, ""),
            }
        }
        None => ("", location),
    }
}

fn normalize(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = segments.join("/");
    if absolute {
        out.insert(0, '/');
    }
    if path.ends_with('/') && !out.ends_with('/') && !segments.is_empty() {
        out.push('/');
    }
    out
}

/// Resolve `relative` against the location of the file that referenced it.
///
/// Works on URLs and on `/`-separated paths: `scene/model.obj` +
/// `tex/a.png` gives `scene/tex/a.png`.
pub fn resolve_relative(base: &str, relative: &str) -> String {
    if relative.contains("://") {
        return relative.to_string();
    }

    let (origin, base_path) = split_origin(base);
    if relative.starts_with('/') {
        return format!("{origin}{}", normalize(relative));
    }

    let directory = match base_path.rfind('/') {
        Some(slash) => &base_path[..=slash],
        None => "",
    };
    format!("{origin}{}", normalize(&format!("{directory}{relative}")))
}

/// Somewhere assets can be read from
pub trait AssetSource {
    fn read_text(&self, location: &str) -> Result<String, AssetLoadError>;
}

/// Reads assets from the filesystem, relative to a root directory
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl AssetSource for FsAssetSource {
    fn read_text(&self, location: &str) -> Result<String, AssetLoadError> {
        std::fs::read_to_string(self.root.join(location))
            .map_err(|e| AssetLoadError::new(location, e))
    }
}

/// A parsed model together with its materials
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub location: String,
    pub obj: ObjData,
    pub materials: MaterialLibrary,
    /// Texture file name as written in the MTL, to its resolved location
    pub textures: BTreeMap<String, String>,
}

impl LoadedModel {
    /// Locations of the material libraries an OBJ references
    pub fn material_locations(location: &str, obj: &ObjData) -> Vec<String> {
        obj.material_libs
            .iter()
            .map(|name| resolve_relative(location, name))
            .collect()
    }

    /// Finish loading once the material library texts are available, in
    /// `material_libs` order.
    pub fn from_texts(location: &str, obj: ObjData, mtl_texts: &[String]) -> Result<Self, LoadError> {
        let materials = parse_mtl(&mtl_texts.join("\n")).map_err(|source| LoadError::Parse {
            location: Self::material_locations(location, &obj).join(", "),
            source,
        })?;

        let mut textures = BTreeMap::new();
        for material in materials.values() {
            for (_, filename) in material.texture_maps() {
                textures
                    .entry(filename.to_string())
                    .or_insert_with(|| resolve_relative(location, filename));
            }
        }

        info!(
            "loaded {location}: {} geometries, {} materials, {} textures",
            obj.geometries.len(),
            materials.len(),
            textures.len()
        );

        Ok(Self {
            location: location.to_string(),
            obj,
            materials,
            textures,
        })
    }

    pub fn parts(&self, options: &PrepareOptions) -> Vec<MeshPart> {
        prepare_all(&self.obj.geometries, &self.materials, options)
    }

    pub fn extents(&self) -> Extents {
        Extents::of_geometries(&self.obj.geometries)
    }
}

/// Parse OBJ text, reporting errors against `location`
pub fn parse_obj_at(location: &str, text: &str) -> Result<ObjData, LoadError> {
    parse_obj(text).map_err(|source| LoadError::Parse {
        location: location.to_string(),
        source,
    })
}

/// Load a model and its material libraries from `source`.
pub fn load_model(source: &impl AssetSource, location: &str) -> Result<LoadedModel, LoadError> {
    let obj = parse_obj_at(location, &source.read_text(location)?)?;

    let mtl_texts = LoadedModel::material_locations(location, &obj)
        .iter()
        .map(|mtl| source.read_text(mtl))
        .collect::<Result<Vec<_>, _>>()?;

    LoadedModel::from_texts(location, obj, &mtl_texts)
}
