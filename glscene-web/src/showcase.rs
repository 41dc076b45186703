use std::cell::RefCell;
use std::rc::Rc;

use glscene_core::camera_path::SLIDER_MAX;
use glscene_core::{Camera, CameraAnimation, CameraPath, Extents, Framing, LoadedModel, PrepareOptions, ShowcaseConfig};
use js_sys::Promise;
use log::{info, warn};
use nalgebra::Vector3;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::fetch::Fetcher;
use crate::gl::{GlContext, GpuMesh};

/// Showcase state shared with in-flight loads
struct Showcase {
    context: GlContext,
    config: ShowcaseConfig,
    path: CameraPath,
    animation: CameraAnimation,
    framing: Framing,
    /// Uploaded parts per model: house, statue, figure
    models: Vec<Vec<GpuMesh>>,
}

impl Showcase {
    fn install(&mut self, models: &[LoadedModel]) -> Result<(), JsValue> {
        let extents = models.first().map(LoadedModel::extents).unwrap_or_else(Extents::empty);
        if extents.is_empty() {
            warn!("first model has no positions, framing a unit cube");
        }
        self.framing = Framing::from_extents(&extents);

        let options = PrepareOptions::default();
        let mut uploaded = Vec::with_capacity(models.len());
        for model in models {
            let parts = model
                .parts(&options)
                .iter()
                .map(|part| self.context.upload_part(part))
                .collect::<Result<Vec<_>, _>>()?;
            uploaded.push(parts);
        }
        self.models = uploaded;
        Ok(())
    }

    fn draw(&self, time: f32) {
        let mut camera = Camera::looking(
            self.animation.pose(&self.path),
            self.config.fov,
            self.framing.near,
            self.framing.far,
        );
        self.context
            .begin_frame(&mut camera, self.config.light_direction, Vector3::zeros());

        let placement = self.config.placement(self.framing.offset, time);
        let matrices = [placement.house, placement.statue, placement.figure];
        for (parts, world) in self.models.iter().zip(matrices.iter()) {
            for part in parts {
                self.context.draw(part, world, [1.0; 4]);
            }
        }
    }
}

/// The textured-model demo: up to three OBJ models and a camera flying
/// along a fixed path
#[wasm_bindgen]
pub struct ShowcaseApp {
    inner: Rc<RefCell<Showcase>>,
    /// Fetcher of the load in flight, if any
    fetcher: Rc<RefCell<Option<Rc<Fetcher>>>>,
}

#[wasm_bindgen]
impl ShowcaseApp {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas_id: &str) -> Result<ShowcaseApp, JsValue> {
        let showcase = Showcase {
            context: GlContext::new(canvas_id)?,
            config: ShowcaseConfig::default(),
            path: CameraPath::default(),
            animation: CameraAnimation::default(),
            framing: Framing::from_extents(&Extents::empty()),
            models: Vec::new(),
        };
        Ok(ShowcaseApp {
            inner: Rc::new(RefCell::new(showcase)),
            fetcher: Rc::new(RefCell::new(None)),
        })
    }

    /// Fetch the house, statue and figure OBJ files, in that order.
    ///
    /// Any load still in flight is aborted first. The promise resolves once
    /// every model is on the GPU.
    pub fn load(&self, urls: Vec<String>) -> Result<Promise, JsValue> {
        self.abort();
        let fetcher = Rc::new(Fetcher::new()?);
        *self.fetcher.borrow_mut() = Some(Rc::clone(&fetcher));

        let inner = Rc::clone(&self.inner);
        let current = Rc::clone(&self.fetcher);
        Ok(future_to_promise(async move {
            let mut models = Vec::with_capacity(urls.len());
            for url in &urls {
                models.push(fetcher.model(url).await?);
            }

            // A newer load may have replaced this one while it was fetching.
            let still_current = matches!(&*current.borrow(), Some(active) if Rc::ptr_eq(active, &fetcher));
            if !still_current {
                return Err(JsValue::from_str("load superseded"));
            }
            current.borrow_mut().take();

            inner.borrow_mut().install(&models)?;
            info!("showcase ready with {} models", models.len());
            Ok(JsValue::UNDEFINED)
        }))
    }

    /// Cancel in-flight loads
    pub fn abort(&self) {
        if let Some(fetcher) = self.fetcher.borrow_mut().take() {
            warn!("aborting model load");
            fetcher.abort();
        }
    }

    /// Start the camera fly-through from the beginning
    pub fn play(&self) {
        self.inner.borrow_mut().animation.play();
    }

    pub fn pause(&self) {
        self.inner.borrow_mut().animation.pause();
    }

    /// Move the camera to a slider position in `[0, 360]`
    pub fn scrub(&self, slider: f64) {
        let mut inner = self.inner.borrow_mut();
        inner.animation.pause();
        inner.animation.scrub(slider.clamp(0.0, SLIDER_MAX));
    }

    #[wasm_bindgen(setter)]
    pub fn set_duration(&self, duration_ms: f64) {
        self.inner.borrow_mut().animation.set_duration(duration_ms);
    }

    #[wasm_bindgen(getter)]
    pub fn is_playing(&self) -> bool {
        self.inner.borrow().animation.is_playing()
    }

    /// Advance and draw one frame. Returns the slider position while the
    /// fly-through plays, so the page can move its slider.
    pub fn frame(&self, time_ms: f64) -> Option<f64> {
        let mut inner = self.inner.borrow_mut();
        let slider = inner.animation.tick(time_ms);
        inner.draw((time_ms / 1000.0) as f32);
        slider
    }
}
