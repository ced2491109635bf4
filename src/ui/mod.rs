pub mod backdrop;
pub mod effects;
pub mod gamepad;
pub mod input;
pub mod renderer;
#[cfg_attr(not(feature = "sound"), allow(dead_code))]
pub mod sound;
