pub mod event;
pub mod step;
pub mod timer;
pub mod transcript;
pub mod world;
