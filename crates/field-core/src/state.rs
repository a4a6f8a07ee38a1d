//! Uniform state block for the field renderer.
//!
//! `FieldState` is the single mutable record the renderer owns. Event handlers
//! write to it between frames and the frame loop snapshots it into
//! [`FieldUniforms`] once per draw.

use crate::constants::{POINTER_CENTER, SPEED_CALM, SPEED_HYPERDRIVE};
use glam::Vec2;

/// Time-advance mode toggled from outside the renderer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SpeedMode {
    #[default]
    Calm,
    Hyperdrive,
}

impl SpeedMode {
    #[inline]
    pub fn from_active(active: bool) -> Self {
        if active {
            SpeedMode::Hyperdrive
        } else {
            SpeedMode::Calm
        }
    }

    #[inline]
    pub fn multiplier(self) -> f32 {
        match self {
            SpeedMode::Calm => SPEED_CALM,
            SpeedMode::Hyperdrive => SPEED_HYPERDRIVE,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SpeedMode::Calm => "calm",
            SpeedMode::Hyperdrive => "hyperdrive",
        }
    }
}

/// GPU-facing snapshot of [`FieldState`].
///
/// Field order matches the `FieldUniforms` struct in `field.wgsl`; the trailing
/// padding rounds the block up to a 16-byte multiple.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct FieldUniforms {
    pub resolution: [f32; 2],
    pub pointer: [f32; 2],
    pub time: f32,
    pub speed: f32,
    pub _pad: [f32; 2],
}

impl FieldUniforms {
    /// Time as seen by the noise field: the only place `speed` enters the shader.
    #[inline]
    pub fn field_time(&self) -> f32 {
        self.time * self.speed
    }
}

#[derive(Clone, Debug)]
pub struct FieldState {
    elapsed_sec: f64,
    resolution: (u32, u32),
    pointer: Vec2,
    mode: SpeedMode,
}

impl FieldState {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            elapsed_sec: 0.0,
            resolution: (width, height),
            pointer: Vec2::from(POINTER_CENTER),
            mode: SpeedMode::Calm,
        }
    }

    /// Moves the clock forward. Earlier readings are ignored so the time
    /// uniform never runs backwards.
    pub fn advance_to(&mut self, elapsed_sec: f64) {
        if elapsed_sec > self.elapsed_sec {
            self.elapsed_sec = elapsed_sec;
        }
    }

    /// Returns true when the stored size actually changed.
    pub fn resize(&mut self, width: u32, height: u32) -> bool {
        if self.resolution == (width, height) {
            return false;
        }
        self.resolution = (width, height);
        true
    }

    /// Maps viewport pixel coordinates into shader space: x/W, 1 - y/H.
    ///
    /// Values outside the viewport pass through unclamped. Ignored while the
    /// viewport has a zero dimension, since there is no meaningful mapping.
    pub fn set_pointer(&mut self, x: f32, y: f32) {
        let (w, h) = self.resolution;
        if w == 0 || h == 0 {
            return;
        }
        self.pointer = Vec2::new(x / w as f32, 1.0 - y / h as f32);
    }

    /// Returns true when the mode changed.
    pub fn set_speed(&mut self, mode: SpeedMode) -> bool {
        let changed = self.mode != mode;
        self.mode = mode;
        changed
    }

    #[inline]
    pub fn elapsed_sec(&self) -> f64 {
        self.elapsed_sec
    }

    #[inline]
    pub fn resolution(&self) -> (u32, u32) {
        self.resolution
    }

    #[inline]
    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    #[inline]
    pub fn mode(&self) -> SpeedMode {
        self.mode
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.mode.multiplier()
    }

    pub fn uniforms(&self) -> FieldUniforms {
        FieldUniforms {
            resolution: [self.resolution.0 as f32, self.resolution.1 as f32],
            pointer: self.pointer.to_array(),
            time: self.elapsed_sec as f32,
            speed: self.speed(),
            _pad: [0.0; 2],
        }
    }
}
