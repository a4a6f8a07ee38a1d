use crate::constants::{
    HYPERDRIVE_ACTIVE_KEY, HYPERDRIVE_EVENT, POINTER_MOVE_EVENT, RESIZE_EVENT,
};
use crate::dom;
use crate::WebRenderer;
use field_core::{subscribe_controls, ControlBus, HyperdriveToggle, Subscription};
use gloo_events::EventListener;
use std::cell::RefCell;
use std::rc::Rc;
use wasm_bindgen::{JsCast, JsValue};
use web_sys as web;

/// Page-level subscriptions feeding one renderer. Dropping the bridge removes
/// every DOM listener and the bus subscription.
pub struct EventBridge {
    _listeners: Vec<EventListener>,
    _controls: Subscription,
}

pub fn wire(
    renderer: &Rc<RefCell<WebRenderer>>,
    canvas: &web::HtmlCanvasElement,
    bus: &ControlBus,
) -> anyhow::Result<EventBridge> {
    let window = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| anyhow::anyhow!("no document"))?;

    let listeners = vec![
        wire_pointermove(&document, renderer),
        wire_resize(&window, canvas, renderer),
        wire_hyperdrive(&window, bus),
    ];
    let controls = subscribe_controls(renderer, bus);

    log::info!("[events] wired {} listeners", listeners.len());
    Ok(EventBridge {
        _listeners: listeners,
        _controls: controls,
    })
}

fn wire_pointermove(document: &web::Document, renderer: &Rc<RefCell<WebRenderer>>) -> EventListener {
    let renderer = Rc::downgrade(renderer);
    EventListener::new(document, POINTER_MOVE_EVENT, move |ev: &web::Event| {
        let Some(ev) = ev.dyn_ref::<web::MouseEvent>() else {
            return;
        };
        if let Some(r) = renderer.upgrade() {
            r.borrow_mut()
                .set_pointer(ev.client_x() as f32, ev.client_y() as f32);
        }
    })
}

fn wire_resize(
    window: &web::Window,
    canvas: &web::HtmlCanvasElement,
    renderer: &Rc<RefCell<WebRenderer>>,
) -> EventListener {
    let renderer = Rc::downgrade(renderer);
    let canvas = canvas.clone();
    EventListener::new(window, RESIZE_EVENT, move |_ev: &web::Event| {
        let Some((w, h)) = dom::fit_canvas_to_viewport(&canvas) else {
            return;
        };
        if let Some(r) = renderer.upgrade() {
            r.borrow_mut().resize(w, h);
        }
    })
}

fn wire_hyperdrive(window: &web::Window, bus: &ControlBus) -> EventListener {
    let bus = bus.clone();
    EventListener::new(window, HYPERDRIVE_EVENT, move |ev: &web::Event| {
        bus.publish(&toggle_from_event(ev));
    })
}

/// Reads `detail.active` from a `toggle-hyperdrive` CustomEvent. A missing
/// detail, missing key or non-boolean value yields an inactive toggle.
fn toggle_from_event(ev: &web::Event) -> HyperdriveToggle {
    let active = ev
        .dyn_ref::<web::CustomEvent>()
        .map(|ce| ce.detail())
        .filter(|detail| detail.is_object())
        .and_then(|detail| js_sys::Reflect::get(&detail, &JsValue::from_str(HYPERDRIVE_ACTIVE_KEY)).ok())
        .and_then(|v| v.as_bool());
    if active.is_none() {
        log::warn!("[events] malformed {} payload, using calm speed", HYPERDRIVE_EVENT);
    }
    HyperdriveToggle::from_payload(active)
}
