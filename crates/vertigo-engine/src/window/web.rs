use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;
use winit::platform::web::WindowAttributesExtWebSys;
use winit::window::WindowAttributes;

use crate::device::ContextError;

/// Resolves `selector` with `document.querySelector` to a `<canvas>`.
pub(crate) fn find_canvas(selector: &str) -> Result<HtmlCanvasElement, ContextError> {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.query_selector(selector).ok().flatten())
        .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        .ok_or_else(|| ContextError::SurfaceNotFound(selector.to_string()))
}

pub(crate) fn attach_canvas(
    attrs: WindowAttributes,
    selector: &str,
) -> Result<WindowAttributes, ContextError> {
    let canvas = find_canvas(selector)?;
    Ok(attrs.with_canvas(Some(canvas)))
}
