//! Renderer lifecycle: uniform updates, one draw per tick, and teardown.
//!
//! `FieldRenderer` knows nothing about the platform. The drawing surface sits
//! behind [`Backend`] and time behind [`Clock`]; the host drives [`FieldRenderer::tick`]
//! from its frame-presentation callback.

use crate::bus::{ControlBus, Subscription};
use crate::constants::MAX_CONSECUTIVE_DRAW_FAILURES;
use crate::state::{FieldState, FieldUniforms, SpeedMode};
use instant::Instant;
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    /// The rendering context is gone; the session cannot continue.
    #[error("rendering context lost: {0}")]
    ContextLost(String),
    /// This frame could not be presented but the context is still usable.
    #[error("frame skipped: {0}")]
    Skipped(String),
}

/// A drawing surface with a compiled field program and a full-screen quad.
pub trait Backend {
    /// Resizes the backing buffer. Called only when the size changes.
    fn resize(&mut self, width: u32, height: u32);
    /// Draws the quad once with `uniforms`.
    fn draw(&mut self, uniforms: &FieldUniforms) -> Result<(), DrawError>;
    /// Releases program, geometry and context.
    fn release(&mut self);
}

/// Monotonic time source, in seconds from an arbitrary origin.
pub trait Clock {
    fn now_secs(&self) -> f64;
}

pub struct InstantClock {
    origin: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for InstantClock {
    fn now_secs(&self) -> f64 {
        self.origin.elapsed().as_secs_f64()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// One draw was issued and succeeded.
    Drawn,
    /// One draw was issued and skipped; the loop continues.
    Failed,
    /// The tick belongs to an earlier generation and did nothing.
    Stale,
    /// The renderer is stopped (possibly by this tick) and did nothing further.
    Stopped,
}

impl TickOutcome {
    #[inline]
    pub fn reschedule(self) -> bool {
        matches!(self, TickOutcome::Drawn | TickOutcome::Failed)
    }
}

pub struct FieldRenderer<B: Backend, C: Clock> {
    backend: Option<B>,
    clock: C,
    started_at: f64,
    state: FieldState,
    generation: u64,
    running: bool,
    draw_count: u64,
    consecutive_failures: u32,
}

pub type SharedRenderer<B, C> = Rc<RefCell<FieldRenderer<B, C>>>;

impl<B: Backend, C: Clock> FieldRenderer<B, C> {
    /// Starts a renderer over a backend that already owns a compiled program
    /// sized to `width` x `height`.
    pub fn new(backend: B, clock: C, width: u32, height: u32) -> Self {
        let started_at = clock.now_secs();
        let state = FieldState::new(width, height);
        log::info!(
            "[field] started {}x{} speed={}",
            width,
            height,
            state.speed()
        );
        Self {
            backend: Some(backend),
            clock,
            started_at,
            state,
            generation: 0,
            running: true,
            draw_count: 0,
            consecutive_failures: 0,
        }
    }

    pub fn into_shared(self) -> SharedRenderer<B, C> {
        Rc::new(RefCell::new(self))
    }

    /// Token a scheduled tick must present; bumped by [`stop`](Self::stop).
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    #[inline]
    pub fn draw_count(&self) -> u64 {
        self.draw_count
    }

    #[inline]
    pub fn state(&self) -> &FieldState {
        &self.state
    }

    #[inline]
    pub fn uniforms(&self) -> FieldUniforms {
        self.state.uniforms()
    }

    /// One loop iteration: refresh the time uniform and draw exactly once.
    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        if !self.running {
            return TickOutcome::Stopped;
        }
        if generation != self.generation {
            return TickOutcome::Stale;
        }

        self.state
            .advance_to(self.clock.now_secs() - self.started_at);
        let uniforms = self.state.uniforms();

        let Some(backend) = self.backend.as_mut() else {
            self.running = false;
            return TickOutcome::Stopped;
        };
        self.draw_count += 1;
        match backend.draw(&uniforms) {
            Ok(()) => {
                self.consecutive_failures = 0;
                TickOutcome::Drawn
            }
            Err(e @ DrawError::ContextLost(_)) => {
                log::error!("[field] {}; stopping", e);
                self.stop();
                TickOutcome::Stopped
            }
            Err(e @ DrawError::Skipped(_)) => {
                self.consecutive_failures += 1;
                if self.consecutive_failures >= MAX_CONSECUTIVE_DRAW_FAILURES {
                    log::error!(
                        "[field] {} ({} in a row); treating context as lost",
                        e,
                        self.consecutive_failures
                    );
                    self.stop();
                    TickOutcome::Stopped
                } else {
                    log::warn!("[field] {}", e);
                    TickOutcome::Failed
                }
            }
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.state.resize(width, height) {
            return;
        }
        log::debug!("[field] resize {}x{}", width, height);
        if let Some(backend) = self.backend.as_mut() {
            backend.resize(width, height);
        }
    }

    /// Pointer in viewport pixels, origin top-left.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        self.state.set_pointer(x, y);
    }

    pub fn set_speed(&mut self, mode: SpeedMode) {
        if self.state.set_speed(mode) {
            log::info!("[field] speed -> {} ({})", mode.name(), mode.multiplier());
        }
    }

    /// Ends the loop and frees the backend. Safe to call repeatedly.
    pub fn stop(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.running = false;
        if let Some(mut backend) = self.backend.take() {
            backend.release();
            log::info!("[field] stopped after {} draws", self.draw_count);
        }
    }
}

/// Routes hyperdrive toggles from `bus` into `renderer` until the returned
/// subscription is dropped. Holds the renderer weakly.
pub fn subscribe_controls<B, C>(renderer: &SharedRenderer<B, C>, bus: &ControlBus) -> Subscription
where
    B: Backend + 'static,
    C: Clock + 'static,
{
    let weak = Rc::downgrade(renderer);
    bus.subscribe(move |toggle| {
        if let Some(renderer) = weak.upgrade() {
            renderer.borrow_mut().set_speed(toggle.mode());
        }
    })
}
