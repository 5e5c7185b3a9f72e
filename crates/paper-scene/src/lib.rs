//! In-memory vector-graphics scene graph.
//!
//! A [`Scope`] owns one [`Project`] (an ordered list of layers), one [`View`]
//! and any number of [`Tool`]s. Items live in a generational arena, so a
//! handle to a removed item simply stops resolving instead of aliasing a new
//! one. Geometry uses `kurbo`; transforms are baked into path geometry.

mod error;
mod geometry;
mod item;
mod scope;
mod settings;
mod symbol;
mod tool;
mod value;
mod view;

pub use error::SceneError;
pub use item::{Item, ItemKind, RasterState, ShapeKind};
pub use scope::{LoadRequest, Project, Scope, ScopeId};
pub use settings::{Settings, SettingsPatch};
pub use symbol::SymbolDefinition;
pub use tool::{Tool, ToolEvent, ToolEventKind};
pub use value::{Event, Handler, Props, Value};
pub use view::View;

pub use kurbo;

slotmap::new_key_type! {
    /// Handle to an item (layer, group, path, text, raster, symbol item).
    pub struct ItemId;
    pub struct ToolId;
    pub struct SymbolId;
}

#[cfg(test)]
#[path = "tests/scope_tests.rs"]
mod tests;
