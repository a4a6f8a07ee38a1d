use wasm_bindgen::JsCast;
use web_sys as web;

#[inline]
pub fn window_document() -> Option<web::Document> {
    web::window().and_then(|w| w.document())
}

pub fn canvas_by_id(id: &str) -> Option<web::HtmlCanvasElement> {
    window_document()?
        .get_element_by_id(id)?
        .dyn_into::<web::HtmlCanvasElement>()
        .ok()
}

/// Viewport size in CSS pixels.
pub fn viewport_size() -> Option<(u32, u32)> {
    let w = web::window()?;
    let width = w.inner_width().ok()?.as_f64()?;
    let height = w.inner_height().ok()?.as_f64()?;
    Some(((width as u32).max(1), (height as u32).max(1)))
}

/// Sizes the canvas backing buffer to the viewport at a pixel ratio of 1 and
/// returns the new size.
pub fn fit_canvas_to_viewport(canvas: &web::HtmlCanvasElement) -> Option<(u32, u32)> {
    let (w, h) = viewport_size()?;
    if canvas.width() != w {
        canvas.set_width(w);
    }
    if canvas.height() != h {
        canvas.set_height(h);
    }
    Some((w, h))
}
