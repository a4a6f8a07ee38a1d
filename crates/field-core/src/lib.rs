pub mod bus;
pub mod constants;
pub mod field;
pub mod lifecycle;
pub mod noise;
pub mod state;

pub use bus::*;
pub use constants::*;
pub use lifecycle::*;
pub use state::*;

// Shader bundled as a string constant
pub static FIELD_WGSL: &str = include_str!("../shaders/field.wgsl");
