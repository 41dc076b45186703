/// Example: Parse an OBJ file and print what it contains
///
/// Usage: cargo run --example inspect_obj -- path/to/model.obj

use std::env;
use std::io;

use glscene_core::{load_model, FsAssetSource, PrepareOptions};

fn main() -> io::Result<()> {
    let args: Vec<String> = env::args().collect();

    let Some(location) = args.get(1) else {
        eprintln!("Usage: {} <obj-file>", args[0]);
        return Ok(());
    };

    let model = load_model(&FsAssetSource::new(""), location)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;

    println!("{}: {} triangles", model.location, model.obj.triangle_count());
    for geometry in &model.obj.geometries {
        println!(
            "  object {:?} groups {:?} material {:?}: {} vertices",
            geometry.object,
            geometry.groups,
            geometry.material,
            geometry.data.vertex_count()
        );
    }
    for (name, resolved) in &model.textures {
        println!("  texture {name} -> {resolved}");
    }

    let extents = model.extents();
    println!("  extents {:?} .. {:?}", extents.min, extents.max);

    let tangents = model
        .parts(&PrepareOptions { generate_tangents: true })
        .iter()
        .filter(|part| !part.tangent.is_constant())
        .count();
    println!("  {tangents} parts with generated tangents");

    Ok(())
}
