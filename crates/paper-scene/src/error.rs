use thiserror::Error;

use crate::{ItemId, SymbolId, ToolId};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SceneError {
    #[error("item {0:?} is not part of this scope")]
    MissingItem(ItemId),
    #[error("tool {0:?} is not part of this scope")]
    MissingTool(ToolId),
    #[error("symbol definition {0:?} is not part of this scope")]
    MissingSymbol(SymbolId),
    #[error("item {0:?} cannot hold children")]
    NotContainer(ItemId),
    #[error("item {0:?} is not a layer")]
    NotLayer(ItemId),
    #[error("item {0:?} has no parent to insert relative to")]
    Detached(ItemId),
    #[error("moving {child:?} under {parent:?} would create a cycle")]
    Cycle { child: ItemId, parent: ItemId },
    #[error("invalid `{key}` for {kind}: {reason}")]
    InvalidConfig {
        kind: &'static str,
        key: String,
        reason: String,
    },
}

impl SceneError {
    pub(crate) fn invalid(kind: &'static str, key: &str, reason: impl Into<String>) -> Self {
        SceneError::InvalidConfig {
            kind,
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}
