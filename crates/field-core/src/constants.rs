// Shared tuning constants for the field renderer.

// Speed multipliers applied to elapsed time before it drives the noise field
pub const SPEED_CALM: f32 = 0.2;
pub const SPEED_HYPERDRIVE: f32 = 4.0;

// Pointer position before the first pointer event (viewport center, shader space)
pub const POINTER_CENTER: [f32; 2] = [0.5, 0.5];

// Pointer perturbation: smooth falloff to zero at this distance, scaled by strength
pub const POINTER_FALLOFF_RADIUS: f32 = 0.5;
pub const POINTER_EFFECT_STRENGTH: f32 = 0.5;

// Domain warp: first layer drift rate and the second layer's phase offsets/drift rates
pub const WARP_Q_TIME_RATE: f32 = 0.1;
pub const WARP_Q_OFFSET: f32 = 1.0;
pub const WARP_R_PHASE_X: [f32; 2] = [1.7, 9.2];
pub const WARP_R_PHASE_Y: [f32; 2] = [8.3, 2.8];
pub const WARP_R_TIME_RATE_X: f32 = 0.15;
pub const WARP_R_TIME_RATE_Y: f32 = 0.126;

// Base palette, blended in this order
pub const PALETTE: [[f32; 3]; 4] = [
    [0.1, 0.0, 0.3], // deep violet
    [0.8, 1.0, 0.0], // acid lime
    [1.0, 0.0, 0.6], // magenta
    [0.0, 0.8, 1.0], // cyan
];

// Blend factor gain applied to f² for the first palette step
pub const FIELD_SQUARED_GAIN: f32 = 4.0;

// Film grain peak-to-peak amplitude (mean centered)
pub const GRAIN_AMPLITUDE: f32 = 0.05;

// Transient draw failures tolerated in a row before the session is treated as lost
pub const MAX_CONSECUTIVE_DRAW_FAILURES: u32 = 60;
