//! Browser glue: manifest, canvas and image loading

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlCanvasElement, HtmlImageElement};

use crate::assembly::{CANVAS_ELEMENT_ID, MANIFEST_ELEMENT_ID};
use crate::assets::{AssetKind, AssetTable};
use crate::config::{GameManifest, Template};

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Parse the manifest embedded by the assembly step
pub fn read_manifest(document: &Document) -> Result<GameManifest, JsValue> {
    let element = document
        .get_element_by_id(MANIFEST_ELEMENT_ID)
        .ok_or_else(|| JsValue::from_str("no game manifest in page"))?;
    let json = element.text_content().unwrap_or_default();
    GameManifest::from_json(&json).map_err(js_err)
}

/// The page's game canvas (created if missing), sized for the template
pub fn game_canvas(document: &Document, template: Template) -> Result<HtmlCanvasElement, JsValue> {
    let canvas: HtmlCanvasElement = match document.get_element_by_id(CANVAS_ELEMENT_ID) {
        Some(el) => el.dyn_into()?,
        None => {
            let c: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
            c.set_id(CANVAS_ELEMENT_ID);
            document
                .body()
                .ok_or_else(|| JsValue::from_str("no body"))?
                .append_child(&c)?;
            c
        }
    };
    let (w, h) = template.canvas_size();
    canvas.set_width(w);
    canvas.set_height(h);
    Ok(canvas)
}

/// Start loading every visual asset that has a URI
///
/// Each element settles the shared table exactly once (load or error) and
/// then calls `on_settled`.
pub fn load_images(
    table: Rc<RefCell<AssetTable>>,
    on_settled: Rc<dyn Fn()>,
) -> Result<Vec<(AssetKind, HtmlImageElement)>, JsValue> {
    let mut images = Vec::new();
    let kinds: Vec<(AssetKind, String)> = {
        let t = table.borrow();
        AssetKind::ALL
            .into_iter()
            .filter(|k| k.is_visual())
            .filter_map(|k| t.uri(k).map(|uri| (k, uri.to_string())))
            .collect()
    };

    for (kind, uri) in kinds {
        let image = HtmlImageElement::new()?;

        let onload = {
            let table = table.clone();
            let on_settled = on_settled.clone();
            Closure::<dyn FnMut()>::new(move || {
                table.borrow_mut().mark_loaded(kind);
                on_settled();
            })
        };
        let onerror = {
            let table = table.clone();
            let on_settled = on_settled.clone();
            Closure::<dyn FnMut()>::new(move || {
                table.borrow_mut().mark_failed(kind);
                on_settled();
            })
        };
        image.set_onload(Some(onload.as_ref().unchecked_ref()));
        image.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        onload.forget();
        onerror.forget();

        image.set_src(&uri);
        images.push((kind, image));
    }
    Ok(images)
}
