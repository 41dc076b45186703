/// Asset fetching for the browser, cancellable through an `AbortController`.
use glscene_core::loader::parse_obj_at;
use glscene_core::LoadedModel;
use log::info;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, Request, RequestInit, Response, Url};

use crate::error;

/// Resolve `href` against the page's own URL
pub fn page_url(href: &str) -> Result<String, JsValue> {
    let window = web_sys::window().ok_or_else(|| error("missing window"))?;
    let base = window.location().href()?;
    Ok(Url::new_with_base(href, &base)?.href())
}

/// Fetches text assets; every in-flight request shares one abort signal
pub struct Fetcher {
    controller: AbortController,
}

impl Fetcher {
    pub fn new() -> Result<Self, JsValue> {
        Ok(Self {
            controller: AbortController::new()?,
        })
    }

    /// Cancel every request made through this fetcher
    pub fn abort(&self) {
        self.controller.abort();
    }

    pub async fn text(&self, url: &str) -> Result<String, JsValue> {
        let window = web_sys::window().ok_or_else(|| error("missing window"))?;

        let init = RequestInit::new();
        init.set_signal(Some(&self.controller.signal()));
        let request = Request::new_with_str_and_init(url, &init)?;

        let response: Response = JsFuture::from(window.fetch_with_request(&request))
            .await?
            .dyn_into()?;
        if !response.ok() {
            return Err(error(&format!("{url}: HTTP {}", response.status())));
        }

        JsFuture::from(response.text()?)
            .await?
            .as_string()
            .ok_or_else(|| error(&format!("{url}: response is not text")))
    }

    /// Fetch an OBJ and every material library it names
    pub async fn model(&self, href: &str) -> Result<LoadedModel, JsValue> {
        let location = page_url(href)?;
        let obj_text = self.text(&location).await?;
        let obj = parse_obj_at(&location, &obj_text).map_err(|e| error(&e.to_string()))?;

        let mut mtl_texts = Vec::new();
        for mtl in LoadedModel::material_locations(&location, &obj) {
            mtl_texts.push(self.text(&mtl).await?);
        }

        let model = LoadedModel::from_texts(&location, obj, &mtl_texts).map_err(|e| error(&e.to_string()))?;
        info!("fetched {location}");
        Ok(model)
    }
}
