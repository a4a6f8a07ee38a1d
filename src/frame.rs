use crate::WebRenderer;
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys as web;

type TickSlot = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

/// Handle to a running requestAnimationFrame chain.
pub struct FrameLoop {
    tick: TickSlot,
    pending: Rc<Cell<Option<i32>>>,
}

impl FrameLoop {
    /// Unschedules the pending frame and drops the callback. The renderer's
    /// generation check still guards against a callback the browser already
    /// queued.
    pub fn cancel(&self) {
        if let Some(id) = self.pending.take() {
            if let Some(w) = web::window() {
                _ = w.cancel_animation_frame(id);
            }
        }
        self.tick.borrow_mut().take();
    }
}

fn request_frame(tick: &Closure<dyn FnMut()>) -> anyhow::Result<i32> {
    let w = web::window().ok_or_else(|| anyhow::anyhow!("no window"))?;
    w.request_animation_frame(tick.as_ref().unchecked_ref())
        .map_err(|e| anyhow::anyhow!(format!("requestAnimationFrame: {:?}", e)))
}

/// Starts the self-rescheduling draw loop. Each callback performs one renderer
/// tick for the generation current at start, and schedules the next frame only
/// while the renderer reports it should continue.
pub fn start_loop(renderer: Rc<RefCell<WebRenderer>>) -> anyhow::Result<FrameLoop> {
    let generation = renderer.borrow().generation();
    let tick: TickSlot = Rc::new(RefCell::new(None));
    let pending = Rc::new(Cell::new(None::<i32>));

    let tick_clone = tick.clone();
    let pending_tick = pending.clone();
    *tick.borrow_mut() = Some(Closure::wrap(Box::new(move || {
        pending_tick.set(None);
        let outcome = renderer.borrow_mut().tick(generation);
        if !outcome.reschedule() {
            log::info!("[loop] halted ({:?})", outcome);
            return;
        }
        if let Some(next) = tick_clone.borrow().as_ref() {
            match request_frame(next) {
                Ok(id) => pending_tick.set(Some(id)),
                Err(e) => {
                    log::error!("[loop] reschedule failed, stopping: {:?}", e);
                    renderer.borrow_mut().stop();
                }
            }
        }
    }) as Box<dyn FnMut()>));

    let id = {
        let slot = tick.borrow();
        let first = slot
            .as_ref()
            .ok_or_else(|| anyhow::anyhow!("frame callback missing"))?;
        request_frame(first)?
    };
    pending.set(Some(id));
    log::info!("[loop] started (generation {})", generation);

    Ok(FrameLoop { tick, pending })
}
