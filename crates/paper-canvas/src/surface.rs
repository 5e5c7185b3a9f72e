use paper_scene::kurbo::Size;

/// Something a scope can be bound to and drawn on.
pub trait Surface {
    /// Current drawable size in view units.
    fn size(&self) -> Size;
}

/// Surface without a backing window, for tests and offscreen use.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HeadlessSurface {
    size: Size,
}

impl HeadlessSurface {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
        }
    }

    pub fn set_size(&mut self, width: f64, height: f64) {
        self.size = Size::new(width, height);
    }
}

impl Default for HeadlessSurface {
    fn default() -> Self {
        Self::new(800.0, 600.0)
    }
}

impl Surface for HeadlessSurface {
    fn size(&self) -> Size {
        self.size
    }
}
