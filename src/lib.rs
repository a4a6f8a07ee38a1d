#![cfg(target_arch = "wasm32")]
use field_core::{ControlBus, FieldRenderer, HyperdriveToggle, InstantClock};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys as web;

mod constants;
mod dom;
mod events;
mod frame;
mod render;

pub(crate) type WebRenderer = FieldRenderer<render::GpuField, InstantClock>;

/// Everything one mounted background owns.
struct Mounted {
    renderer: Rc<RefCell<WebRenderer>>,
    frame_loop: frame::FrameLoop,
    bridge: events::EventBridge,
    bus: ControlBus,
}

impl Mounted {
    async fn new(canvas: web::HtmlCanvasElement) -> anyhow::Result<Self> {
        let (width, height) = dom::fit_canvas_to_viewport(&canvas)
            .ok_or_else(|| anyhow::anyhow!("viewport size unavailable"))?;
        let gpu = render::GpuField::new(&canvas).await?;
        let renderer = FieldRenderer::new(gpu, InstantClock::new(), width, height).into_shared();

        let bus = ControlBus::new();
        let bridge = match events::wire(&renderer, &canvas, &bus) {
            Ok(b) => b,
            Err(e) => {
                renderer.borrow_mut().stop();
                return Err(e);
            }
        };
        let frame_loop = match frame::start_loop(renderer.clone()) {
            Ok(l) => l,
            Err(e) => {
                drop(bridge);
                renderer.borrow_mut().stop();
                return Err(e);
            }
        };
        Ok(Self {
            renderer,
            frame_loop,
            bridge,
            bus,
        })
    }

    fn teardown(self) {
        self.frame_loop.cancel();
        drop(self.bridge);
        self.renderer.borrow_mut().stop();
    }
}

/// A mounted (or failed-to-mount) background. An inert mount renders nothing
/// and all of its methods are no-ops.
#[wasm_bindgen]
pub struct FieldMount {
    inner: Option<Mounted>,
}

#[wasm_bindgen]
impl FieldMount {
    #[wasm_bindgen(js_name = isActive)]
    pub fn is_active(&self) -> bool {
        self.inner
            .as_ref()
            .is_some_and(|m| m.renderer.borrow().is_running())
    }

    #[wasm_bindgen(js_name = setHyperdrive)]
    pub fn set_hyperdrive(&self, active: bool) {
        if let Some(m) = &self.inner {
            m.bus.publish(&HyperdriveToggle { active });
        }
    }

    pub fn unmount(&mut self) {
        if let Some(m) = self.inner.take() {
            m.teardown();
        }
    }
}

impl Drop for FieldMount {
    fn drop(&mut self) {
        self.unmount();
    }
}

async fn mount_inner(canvas: web::HtmlCanvasElement) -> FieldMount {
    match Mounted::new(canvas).await {
        Ok(m) => FieldMount { inner: Some(m) },
        Err(e) => {
            log::error!("[field] mount failed, leaving canvas blank: {:?}", e);
            FieldMount { inner: None }
        }
    }
}

/// Mounts the background on `canvas`. Never rejects; on failure the returned
/// mount is inert.
#[wasm_bindgen]
pub async fn mount(canvas: web::HtmlCanvasElement) -> Result<FieldMount, JsValue> {
    Ok(mount_inner(canvas).await)
}

thread_local! {
    static AUTO_MOUNT: RefCell<Option<FieldMount>> = const { RefCell::new(None) };
    static AUTO_CANCELLED: Cell<bool> = const { Cell::new(false) };
}

/// Unmounts the auto-mounted background, including one still starting up.
#[wasm_bindgen]
pub fn unmount() {
    AUTO_CANCELLED.with(|c| c.set(true));
    let taken = AUTO_MOUNT.with(|slot| slot.borrow_mut().take());
    drop(taken);
}

/// Publishes a hyperdrive toggle to the auto-mounted background.
#[wasm_bindgen(js_name = setHyperdrive)]
pub fn set_hyperdrive(active: bool) {
    AUTO_MOUNT.with(|slot| {
        if let Some(m) = slot.borrow().as_ref() {
            m.set_hyperdrive(active);
        }
    });
}

async fn autostart() -> anyhow::Result<()> {
    let canvas = dom::canvas_by_id(constants::FIELD_CANVAS_ID)
        .ok_or_else(|| anyhow::anyhow!("no #{} canvas", constants::FIELD_CANVAS_ID))?;
    let mounted = mount_inner(canvas).await;
    if AUTO_CANCELLED.with(|c| c.get()) {
        log::info!("[field] unmounted before startup finished");
        drop(mounted);
        return Ok(());
    }
    let previous = AUTO_MOUNT.with(|slot| slot.borrow_mut().replace(mounted));
    drop(previous);
    Ok(())
}

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("field-web starting");

    spawn_local(async move {
        if let Err(e) = autostart().await {
            log::info!("[field] autostart skipped: {}", e);
        }
    });
    Ok(())
}
