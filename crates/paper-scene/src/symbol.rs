use kurbo::Size;

use crate::geometry::svg_dimension;

/// Compiled asset shared by every symbol item placed from it.
#[derive(Clone, Debug, PartialEq)]
pub struct SymbolDefinition {
    source: String,
    size: Size,
}

impl SymbolDefinition {
    pub(crate) fn from_svg(svg: &str) -> Self {
        let width = svg_dimension(svg, "width").unwrap_or(0.0);
        let height = svg_dimension(svg, "height").unwrap_or(0.0);
        Self {
            source: svg.to_owned(),
            size: Size::new(width, height),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn size(&self) -> Size {
        self.size
    }
}
