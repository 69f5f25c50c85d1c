pub mod boss;
pub mod framebuffer;
pub mod key;
pub mod physics;
pub mod platform;
pub mod player;
pub mod sprite;
