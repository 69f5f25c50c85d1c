pub mod gamepad;
pub mod hud;
pub mod input;
pub mod renderer;
