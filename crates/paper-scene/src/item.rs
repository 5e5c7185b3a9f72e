use indexmap::IndexMap;
use kurbo::{Affine, BezPath, Rect, Shape as _, Vec2};

use crate::{ItemId, Props, SymbolId, Value};

/// Which primitive a path item was built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Line,
    Circle,
    Ellipse,
    Arc,
    Rectangle,
    RegularPolygon,
}

impl ShapeKind {
    pub fn name(self) -> &'static str {
        match self {
            ShapeKind::Line => "Line",
            ShapeKind::Circle => "Circle",
            ShapeKind::Ellipse => "Ellipse",
            ShapeKind::Arc => "Arc",
            ShapeKind::Rectangle => "Rectangle",
            ShapeKind::RegularPolygon => "RegularPolygon",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RasterState {
    pub(crate) source: Option<String>,
    pub(crate) token: u64,
    pub(crate) loaded: bool,
}

impl RasterState {
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ItemKind {
    Layer,
    Group,
    Path(Option<ShapeKind>),
    PointText,
    Raster(RasterState),
    SymbolItem(SymbolId),
}

impl ItemKind {
    /// Engine class name, as reported in dumps and the `className` field.
    pub fn class_name(&self) -> &'static str {
        match self {
            ItemKind::Layer => "Layer",
            ItemKind::Group => "Group",
            ItemKind::Path(_) => "Path",
            ItemKind::PointText => "PointText",
            ItemKind::Raster(_) => "Raster",
            ItemKind::SymbolItem(_) => "SymbolItem",
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ItemKind::Layer | ItemKind::Group)
    }
}

/// Geometry carried by an item.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Body {
    /// Bounds are the union of the children's bounds.
    Container,
    Path(BezPath),
    /// A box in local space placed by an affine transform.
    Placed { local: Rect, transform: Affine },
}

#[derive(Clone, Debug)]
pub struct Item {
    pub(crate) kind: ItemKind,
    pub(crate) parent: Option<ItemId>,
    pub(crate) children: Vec<ItemId>,
    pub(crate) body: Body,
    pub(crate) rotation: f64,
    pub(crate) scaling: Vec2,
    pub(crate) name: Option<String>,
    pub(crate) data: IndexMap<String, Value>,
    pub(crate) fields: Props,
}

impl Item {
    pub(crate) fn new(kind: ItemKind, body: Body) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
            body,
            rotation: 0.0,
            scaling: Vec2::new(1.0, 1.0),
            name: None,
            data: IndexMap::new(),
            fields: Props::new(),
        }
    }

    pub fn kind(&self) -> &ItemKind {
        &self.kind
    }

    pub fn parent(&self) -> Option<ItemId> {
        self.parent
    }

    pub fn children(&self) -> &[ItemId] {
        &self.children
    }

    /// Accumulated rotation in degrees.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    /// Scale factors last set as a whole; relative scales leave it alone.
    pub fn scaling(&self) -> Vec2 {
        self.scaling
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn data(&self) -> &IndexMap<String, Value> {
        &self.data
    }

    /// Plain fields (style, handlers, flags) assigned on the item.
    pub fn fields(&self) -> &Props {
        &self.fields
    }

    pub fn field(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// Path geometry, for path-based items.
    pub fn path(&self) -> Option<&BezPath> {
        match &self.body {
            Body::Path(path) => Some(path),
            _ => None,
        }
    }

    /// Bounds of this item alone; containers report `None`.
    pub(crate) fn own_bounds(&self) -> Option<Rect> {
        match &self.body {
            Body::Container => None,
            Body::Path(path) => Some(path.bounding_box()),
            Body::Placed { local, transform } => Some(transform.transform_rect_bbox(*local)),
        }
    }

    pub(crate) fn apply_affine(&mut self, affine: Affine) {
        match &mut self.body {
            Body::Container => {}
            Body::Path(path) => path.apply_affine(affine),
            Body::Placed { transform, .. } => *transform = affine * *transform,
        }
    }
}
