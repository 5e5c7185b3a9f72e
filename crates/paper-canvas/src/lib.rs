//! Scene root lifecycle: one [`Canvas`] owns one scope per surface mount.

mod canvas;
mod error;
mod surface;

pub use canvas::{Canvas, CanvasProps, CanvasState, ScopeReady};
pub use error::CanvasError;
pub use surface::{HeadlessSurface, Surface};

#[cfg(test)]
#[path = "tests/canvas_tests.rs"]
mod tests;
