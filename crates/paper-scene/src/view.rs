use kurbo::{Affine, Point, Rect, Size, Vec2};

use crate::Props;

/// The scope's window onto its project.
#[derive(Clone, Debug)]
pub struct View {
    pub(crate) size: Size,
    /// Maps project coordinates to view coordinates.
    pub(crate) transform: Affine,
    pub(crate) zoom: f64,
    pub(crate) fields: Props,
}

impl Default for View {
    fn default() -> Self {
        Self {
            size: Size::ZERO,
            transform: Affine::IDENTITY,
            zoom: 1.0,
            fields: Props::new(),
        }
    }
}

impl View {
    pub fn view_size(&self) -> Size {
        self.size
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn fields(&self) -> &Props {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&crate::Value> {
        self.fields.get(key)
    }

    /// Visible area in project coordinates.
    pub fn bounds(&self) -> Rect {
        self.transform
            .inverse()
            .transform_rect_bbox(Rect::from_origin_size(Point::ZERO, self.size))
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn project_to_view(&self, point: Point) -> Point {
        self.transform * point
    }

    pub fn view_to_project(&self, point: Point) -> Point {
        self.transform.inverse() * point
    }

    pub(crate) fn translate(&mut self, delta: Vec2) {
        self.transform *= Affine::translate(delta);
    }

    pub(crate) fn scale_about_center(&mut self, sx: f64, sy: f64) {
        let center = self.center().to_vec2();
        self.transform *= Affine::translate(center)
            * Affine::scale_non_uniform(sx, sy)
            * Affine::translate(-center);
    }
}
