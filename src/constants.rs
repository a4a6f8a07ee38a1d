//! Page wiring and GPU setup constants for the web frontend.

// Canvas the background auto-mounts onto, if the page provides one
pub const FIELD_CANVAS_ID: &str = "webgl-canvas";

// DOM events the bridge listens for
pub const POINTER_MOVE_EVENT: &str = "pointermove";
pub const RESIZE_EVENT: &str = "resize";
pub const HYPERDRIVE_EVENT: &str = "toggle-hyperdrive";
pub const HYPERDRIVE_ACTIVE_KEY: &str = "active";

// Background layer: the canvas composites over the page's own backdrop
pub const CLEAR_COLOR: wgpu::Color = wgpu::Color::TRANSPARENT;

// Integrated adapter is enough for the background
pub const POWER_PREFERENCE: wgpu::PowerPreference = wgpu::PowerPreference::LowPower;

// Full-screen quad as a triangle strip, clip space
pub const QUAD_VERTICES: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [-1.0, 1.0], [1.0, 1.0]];
