//! Platfall: a tick-driven terminal platformer.
//!
//! `domain` holds the entities and their physics, `sim` the game state and
//! step function, `ui` the terminal and gamepad front end.

pub mod config;
pub mod domain;
pub mod sim;
pub mod ui;
