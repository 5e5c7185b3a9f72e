//! Reconciles declarative element trees into a [`paper_scene::Scope`].
//!
//! [`PaperRenderer`] implements [`paper_reconciler::HostConfig`] for the
//! scene: element tags resolve through a [`KindRegistry`], props become engine
//! mutations through [`apply_props`], and symbol definitions are shared
//! through a per-renderer [`SymbolCache`].

mod error;
mod instance;
mod kinds;
mod props;
mod renderer;
mod symbols;
mod types;

pub use error::RendererError;
pub use instance::Instance;
pub use kinds::{BuildContext, KindRegistry, NodeKind};
pub use props::{apply_props, Target};
pub use renderer::{is_layer, PaperRenderer};
pub use symbols::SymbolCache;
pub use types::*;

/// Element tree consumed by [`PaperRenderer`].
pub type PaperElement = paper_reconciler::Element<String, paper_scene::Props>;

#[cfg(test)]
#[path = "tests/renderer_tests.rs"]
mod tests;
