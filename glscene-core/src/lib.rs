/// glscene Core Library - model parsing, scene state and camera math
///
/// This library provides the platform-independent part of the demo scenes:
/// OBJ/MTL parsing, tangent and normal generation, heightmap terrain, the
/// ball-shooting scene state and the camera fly-through used by the model
/// showcase.

pub mod camera_path;
pub mod error;
pub mod geometry;
pub mod loader;
pub mod mtl;
pub mod obj;
pub mod prepare;
pub mod projection;
pub mod shooter;
pub mod showcase;
pub mod tangent;
pub mod terrain;
mod text;
pub mod transform;

// Re-export commonly used types
pub use camera_path::{CameraAnimation, CameraPath};
pub use error::{AssetLoadError, LoadError, ParseError};
pub use geometry::{Mesh, Triangle, Vertex};
pub use loader::{load_model, AssetSource, FsAssetSource, LoadedModel};
pub use mtl::{parse_mtl, Material, MaterialLibrary};
pub use obj::{parse_obj, Geometry, GeometryData, ObjData};
pub use prepare::{Attribute, MeshPart, PrepareOptions};
pub use projection::{Camera, CameraPose};
pub use shooter::{advance, FrameInput, SceneEvent, ShooterConfig, ShooterState};
pub use showcase::{Extents, Framing, ShowcaseConfig};
pub use terrain::{Heightmap, IndexedMesh, TerrainConfig};
pub use transform::Transform;
