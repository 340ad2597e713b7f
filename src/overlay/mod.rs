// Overlay domain — presentation targets, label font, and compositing.

pub mod font;
pub mod renderer;
pub mod target;
