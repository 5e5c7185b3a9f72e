use std::fmt;
use std::str::FromStr;

use paper_scene::ShapeKind;

use crate::RendererError;

pub const VIEW: &str = "View";
pub const TOOL: &str = "Tool";
pub const LAYER: &str = "Layer";
pub const GROUP: &str = "Group";
pub const PATH: &str = "Path";
pub const LINE: &str = "Line";
pub const CIRCLE: &str = "Circle";
pub const ELLIPSE: &str = "Ellipse";
pub const ARC: &str = "Arc";
pub const RECTANGLE: &str = "Rectangle";
pub const REGULAR_POLYGON: &str = "RegularPolygon";
pub const POINT_TEXT: &str = "PointText";
pub const RASTER: &str = "Raster";
pub const SYMBOL_ITEM: &str = "SymbolItem";

/// Built-in element tags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ItemType {
    View,
    Tool,
    Layer,
    Group,
    Path,
    Line,
    Circle,
    Ellipse,
    Arc,
    Rectangle,
    RegularPolygon,
    PointText,
    Raster,
    SymbolItem,
}

impl ItemType {
    pub const ALL: [ItemType; 14] = [
        ItemType::View,
        ItemType::Tool,
        ItemType::Layer,
        ItemType::Group,
        ItemType::Path,
        ItemType::Line,
        ItemType::Circle,
        ItemType::Ellipse,
        ItemType::Arc,
        ItemType::Rectangle,
        ItemType::RegularPolygon,
        ItemType::PointText,
        ItemType::Raster,
        ItemType::SymbolItem,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ItemType::View => VIEW,
            ItemType::Tool => TOOL,
            ItemType::Layer => LAYER,
            ItemType::Group => GROUP,
            ItemType::Path => PATH,
            ItemType::Line => LINE,
            ItemType::Circle => CIRCLE,
            ItemType::Ellipse => ELLIPSE,
            ItemType::Arc => ARC,
            ItemType::Rectangle => RECTANGLE,
            ItemType::RegularPolygon => REGULAR_POLYGON,
            ItemType::PointText => POINT_TEXT,
            ItemType::Raster => RASTER,
            ItemType::SymbolItem => SYMBOL_ITEM,
        }
    }

    /// Primitive constructor for path-backed kinds; `Some(None)` is a free-form path.
    pub fn path_shape(self) -> Option<Option<ShapeKind>> {
        match self {
            ItemType::Path => Some(None),
            ItemType::Line => Some(Some(ShapeKind::Line)),
            ItemType::Circle => Some(Some(ShapeKind::Circle)),
            ItemType::Ellipse => Some(Some(ShapeKind::Ellipse)),
            ItemType::Arc => Some(Some(ShapeKind::Arc)),
            ItemType::Rectangle => Some(Some(ShapeKind::Rectangle)),
            ItemType::RegularPolygon => Some(Some(ShapeKind::RegularPolygon)),
            _ => None,
        }
    }

    /// Kinds whose full props are applied right after their children are attached.
    pub fn is_container_like(self) -> bool {
        matches!(
            self,
            ItemType::View | ItemType::Layer | ItemType::Group | ItemType::Tool
        )
    }
}

impl fmt::Display for ItemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ItemType {
    type Err = RendererError;

    fn from_str(tag: &str) -> Result<Self, Self::Err> {
        ItemType::ALL
            .into_iter()
            .find(|ty| ty.as_str() == tag)
            .ok_or_else(|| RendererError::UnsupportedType(tag.to_owned()))
    }
}

impl From<ItemType> for String {
    fn from(ty: ItemType) -> Self {
        ty.as_str().to_owned()
    }
}
