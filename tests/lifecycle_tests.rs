// Host-side tests for the renderer lifecycle.
// The web crate is wasm-only, so these drive `field-core` with a recording
// backend and a hand-advanced clock in place of WebGPU and the browser.

use field_core::*;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Default)]
struct Log {
    draws: Vec<FieldUniforms>,
    resizes: Vec<(u32, u32)>,
    releases: u32,
    size: (u32, u32),
}

/// Scripted failures returned by the next draws, front first.
type Script = Rc<RefCell<Vec<DrawError>>>;

struct RecordingBackend {
    log: Rc<RefCell<Log>>,
    script: Script,
}

impl Backend for RecordingBackend {
    fn resize(&mut self, width: u32, height: u32) {
        let mut log = self.log.borrow_mut();
        log.resizes.push((width, height));
        log.size = (width, height);
    }

    fn draw(&mut self, uniforms: &FieldUniforms) -> Result<(), DrawError> {
        self.log.borrow_mut().draws.push(*uniforms);
        let mut script = self.script.borrow_mut();
        if script.is_empty() {
            Ok(())
        } else {
            Err(script.remove(0))
        }
    }

    fn release(&mut self) {
        self.log.borrow_mut().releases += 1;
    }
}

#[derive(Clone)]
struct ManualClock(Rc<Cell<f64>>);

impl ManualClock {
    fn advance(&self, secs: f64) {
        self.0.set(self.0.get() + secs);
    }
}

impl Clock for ManualClock {
    fn now_secs(&self) -> f64 {
        self.0.get()
    }
}

struct Harness {
    renderer: FieldRenderer<RecordingBackend, ManualClock>,
    log: Rc<RefCell<Log>>,
    script: Script,
    clock: ManualClock,
}

fn start(width: u32, height: u32) -> Harness {
    let log = Rc::new(RefCell::new(Log {
        size: (width, height),
        ..Default::default()
    }));
    let script: Script = Rc::new(RefCell::new(Vec::new()));
    // Non-zero origin: elapsed time must be measured from start, not from the clock's epoch
    let clock = ManualClock(Rc::new(Cell::new(100.0)));
    let renderer = FieldRenderer::new(
        RecordingBackend {
            log: log.clone(),
            script: script.clone(),
        },
        clock.clone(),
        width,
        height,
    );
    Harness {
        renderer,
        log,
        script,
        clock,
    }
}

const FRAME: f64 = 1.0 / 60.0;

impl Harness {
    fn frames(&mut self, n: usize) {
        let generation = self.renderer.generation();
        for _ in 0..n {
            self.clock.advance(FRAME);
            self.renderer.tick(generation);
        }
    }
}

#[test]
fn start_initializes_uniform_block() {
    let h = start(800, 600);
    let u = h.renderer.uniforms();
    assert_eq!(u.time, 0.0);
    assert_eq!(u.resolution, [800.0, 600.0]);
    assert_eq!(u.pointer, [0.5, 0.5]);
    assert_eq!(u.speed, SPEED_CALM);
    assert!(h.renderer.is_running());
    assert_eq!(h.renderer.draw_count(), 0);
}

#[test]
fn each_tick_draws_exactly_once_with_elapsed_time() {
    let mut h = start(800, 600);
    let generation = h.renderer.generation();

    h.clock.advance(0.5);
    assert_eq!(h.renderer.tick(generation), TickOutcome::Drawn);
    h.clock.advance(0.25);
    assert_eq!(h.renderer.tick(generation), TickOutcome::Drawn);

    let log = h.log.borrow();
    assert_eq!(log.draws.len(), 2);
    assert!((log.draws[0].time - 0.5).abs() < 1e-6);
    assert!((log.draws[1].time - 0.75).abs() < 1e-6);
}

#[test]
fn time_uniform_is_monotonic() {
    let mut h = start(640, 480);
    let generation = h.renderer.generation();
    for step in [0.016, 0.0, 0.033, 0.001, 0.0, 0.5] {
        h.clock.advance(step);
        h.renderer.tick(generation);
    }
    // A clock that steps backwards must not rewind the uniform
    h.clock.advance(-0.2);
    h.renderer.tick(generation);

    let log = h.log.borrow();
    for pair in log.draws.windows(2) {
        assert!(pair[1].time >= pair[0].time);
    }
    assert!(log.draws[2].time > log.draws[1].time);
    assert_eq!(log.draws[1].time, log.draws[0].time);
}

#[test]
fn hyperdrive_advances_field_time_twenty_times_faster() {
    let mut h = start(800, 600);
    let generation = h.renderer.generation();

    h.clock.advance(1.0);
    h.renderer.tick(generation);
    h.clock.advance(1.0);
    h.renderer.tick(generation);
    h.renderer.set_speed(SpeedMode::Hyperdrive);
    h.renderer.tick(generation);
    h.clock.advance(1.0);
    h.renderer.tick(generation);

    let log = h.log.borrow();
    let calm_rate = log.draws[1].field_time() - log.draws[0].field_time();
    let hyper_rate = log.draws[3].field_time() - log.draws[2].field_time();
    assert!((calm_rate - 0.2).abs() < 1e-5);
    assert!((hyper_rate - 4.0).abs() < 1e-4);
    assert!((hyper_rate / calm_rate - 20.0).abs() < 1e-3);
}

#[test]
fn speed_is_always_one_of_two_constants() {
    let mut h = start(800, 600);
    let generation = h.renderer.generation();
    let modes = [
        SpeedMode::Hyperdrive,
        SpeedMode::Hyperdrive,
        SpeedMode::Calm,
        SpeedMode::Hyperdrive,
        SpeedMode::Calm,
        SpeedMode::Calm,
    ];
    for mode in modes {
        h.renderer.set_speed(mode);
        h.clock.advance(FRAME);
        h.renderer.tick(generation);
        assert_eq!(h.renderer.state().mode(), mode);
    }
    for u in &h.log.borrow().draws {
        assert!(u.speed == SPEED_CALM || u.speed == SPEED_HYPERDRIVE);
    }
}

#[test]
fn resize_twice_matches_resize_once() {
    let mut h = start(800, 600);
    h.renderer.resize(1600, 1200);
    let once = (h.renderer.uniforms().resolution, h.log.borrow().size);
    h.renderer.resize(1600, 1200);
    let twice = (h.renderer.uniforms().resolution, h.log.borrow().size);

    assert_eq!(once, twice);
    assert_eq!(twice.0, [1600.0, 1200.0]);
    assert_eq!(twice.1, (1600, 1200));
    assert_eq!(h.log.borrow().resizes, vec![(1600, 1200)]);
}

#[test]
fn resize_is_picked_up_by_the_next_frame() {
    let mut h = start(800, 600);
    h.frames(1);
    h.renderer.resize(1024, 768);
    h.frames(1);
    let log = h.log.borrow();
    assert_eq!(log.draws[0].resolution, [800.0, 600.0]);
    assert_eq!(log.draws[1].resolution, [1024.0, 768.0]);
}

#[test]
fn scenario_ten_frames_then_stop() {
    let mut h = start(800, 600);
    let generation = h.renderer.generation();
    h.frames(10);
    h.renderer.stop();

    h.clock.advance(FRAME);
    let late = h.renderer.tick(generation);

    assert_eq!(late, TickOutcome::Stopped);
    assert!(!late.reschedule());
    assert_eq!(h.log.borrow().draws.len(), 10);
    assert_eq!(h.renderer.draw_count(), 10);
    assert_eq!(h.log.borrow().releases, 1);
}

#[test]
fn stop_twice_releases_once() {
    let mut h = start(800, 600);
    h.frames(3);
    h.renderer.stop();
    h.renderer.stop();
    assert_eq!(h.log.borrow().releases, 1);
    assert!(!h.renderer.is_running());
}

#[test]
fn stop_bumps_generation_so_scheduled_ticks_go_stale() {
    let mut h = start(800, 600);
    let before = h.renderer.generation();
    h.renderer.stop();
    assert_ne!(h.renderer.generation(), before);
    assert_eq!(h.renderer.tick(h.renderer.generation()), TickOutcome::Stopped);
}

#[test]
fn tick_with_foreign_generation_is_stale() {
    let mut h = start(800, 600);
    let stale = h.renderer.generation().wrapping_add(7);
    let outcome = h.renderer.tick(stale);
    assert_eq!(outcome, TickOutcome::Stale);
    assert!(!outcome.reschedule());
    assert!(h.log.borrow().draws.is_empty());
}

#[test]
fn elapsed_time_freezes_after_stop() {
    let mut h = start(800, 600);
    h.frames(5);
    let frozen = h.renderer.state().elapsed_sec();
    h.renderer.stop();
    h.clock.advance(10.0);
    h.renderer.tick(h.renderer.generation());
    assert_eq!(h.renderer.state().elapsed_sec(), frozen);
}

#[test]
fn context_loss_stops_the_loop() {
    let mut h = start(800, 600);
    h.frames(2);
    h.script
        .borrow_mut()
        .push(DrawError::ContextLost("device lost".into()));
    let generation = h.renderer.generation();
    h.clock.advance(FRAME);
    let outcome = h.renderer.tick(generation);

    assert_eq!(outcome, TickOutcome::Stopped);
    assert!(!h.renderer.is_running());
    assert_eq!(h.log.borrow().releases, 1);

    h.clock.advance(FRAME);
    h.renderer.tick(generation);
    assert_eq!(h.log.borrow().draws.len(), 3);
}

#[test]
fn skipped_frames_keep_the_loop_alive() {
    let mut h = start(800, 600);
    h.script
        .borrow_mut()
        .push(DrawError::Skipped("surface timeout".into()));
    let generation = h.renderer.generation();
    h.clock.advance(FRAME);
    let outcome = h.renderer.tick(generation);
    assert_eq!(outcome, TickOutcome::Failed);
    assert!(outcome.reschedule());

    h.clock.advance(FRAME);
    assert_eq!(h.renderer.tick(generation), TickOutcome::Drawn);
    assert!(h.renderer.is_running());
}

#[test]
fn persistent_skips_are_treated_as_context_loss() {
    let mut h = start(800, 600);
    {
        let mut script = h.script.borrow_mut();
        for _ in 0..MAX_CONSECUTIVE_DRAW_FAILURES {
            script.push(DrawError::Skipped("surface outdated".into()));
        }
    }
    let generation = h.renderer.generation();
    let mut last = TickOutcome::Drawn;
    for _ in 0..MAX_CONSECUTIVE_DRAW_FAILURES {
        h.clock.advance(FRAME);
        last = h.renderer.tick(generation);
    }
    assert_eq!(last, TickOutcome::Stopped);
    assert!(!h.renderer.is_running());
    assert_eq!(h.log.borrow().releases, 1);
}

#[test]
fn setters_after_stop_do_not_touch_the_backend() {
    let mut h = start(800, 600);
    h.renderer.stop();
    h.renderer.resize(100, 100);
    h.renderer.set_pointer(10.0, 10.0);
    h.renderer.set_speed(SpeedMode::Hyperdrive);
    assert!(h.log.borrow().resizes.is_empty());
}

#[test]
fn scenario_pointer_tracks_viewport_proportionally() {
    let mut h = start(800, 600);
    h.renderer.set_pointer(400.0, 300.0);
    assert_eq!(h.renderer.uniforms().pointer, [0.5, 0.5]);

    h.renderer.resize(1600, 1200);
    assert_eq!(h.renderer.uniforms().resolution, [1600.0, 1200.0]);
    h.renderer.set_pointer(800.0, 600.0);
    assert_eq!(h.renderer.uniforms().pointer, [0.5, 0.5]);
}

#[test]
fn shared_renderer_follows_control_bus() {
    let h = start(800, 600);
    let renderer = h.renderer.into_shared();
    let bus = ControlBus::new();
    let sub = subscribe_controls(&renderer, &bus);

    bus.publish(&HyperdriveToggle { active: true });
    assert_eq!(renderer.borrow().uniforms().speed, SPEED_HYPERDRIVE);

    bus.publish(&HyperdriveToggle { active: false });
    assert_eq!(renderer.borrow().uniforms().speed, SPEED_CALM);

    bus.publish(&HyperdriveToggle { active: true });
    bus.publish(&HyperdriveToggle::from_payload(None));
    assert_eq!(renderer.borrow().uniforms().speed, SPEED_CALM);

    drop(sub);
    bus.publish(&HyperdriveToggle { active: true });
    assert_eq!(renderer.borrow().uniforms().speed, SPEED_CALM);
}

#[test]
fn control_subscription_does_not_keep_renderer_alive() {
    let h = start(800, 600);
    let renderer = h.renderer.into_shared();
    let bus = ControlBus::new();
    let _sub = subscribe_controls(&renderer, &bus);
    let weak = Rc::downgrade(&renderer);
    drop(renderer);
    assert!(weak.upgrade().is_none());
    // Publishing to a dead renderer is a no-op
    assert_eq!(bus.publish(&HyperdriveToggle { active: true }), 1);
}

#[test]
fn host_stop_after_a_drawn_frame_ends_the_session() {
    // The frame loop stops the renderer itself when it cannot schedule the
    // next frame; the renderer must then read as inactive.
    let mut h = start(800, 600);
    let generation = h.renderer.generation();
    h.clock.advance(FRAME);
    let outcome = h.renderer.tick(generation);
    assert_eq!(outcome, TickOutcome::Drawn);
    assert!(outcome.reschedule());

    h.renderer.stop();
    assert!(!h.renderer.is_running());
    assert_eq!(h.log.borrow().releases, 1);

    // A frame the browser had already queued does nothing
    h.clock.advance(FRAME);
    assert!(!h.renderer.tick(generation).reschedule());
    assert_eq!(h.log.borrow().draws.len(), 1);
}
