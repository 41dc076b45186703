/// glscene Web - WebGL2 runtime for the demo scenes
///
/// Exposes one class per demo (`ShooterApp`, `TerrainApp`, `ShowcaseApp`).
/// The page owns the animation loop and calls `frame(time)` on the app from
/// its `requestAnimationFrame` callback.
use wasm_bindgen::prelude::*;

mod fetch;
mod gl;
mod shooter;
mod showcase;
mod terrain;

pub use shooter::ShooterApp;
pub use showcase::ShowcaseApp;
pub use terrain::TerrainApp;

pub(crate) fn error(message: &str) -> JsValue {
    JsValue::from_str(message)
}

#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    // Forward panics and log records to the browser console
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();

    Ok(())
}
