use paper_scene::SceneError;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum RendererError {
    #[error("PaperRenderer does not support the type `{0}`")]
    UnsupportedType(String),
    #[error("SymbolItem needs an `id` or `name` prop")]
    MissingSymbolKey,
    #[error("SymbolItem `{0}` needs an `svg` prop")]
    MissingSymbolSource(String),
    #[error("cannot insert a node before itself")]
    SelfInsertion,
    #[error("`{0}` cannot be attached to the scope; only View and Tool can")]
    IllegalContainerChild(String),
    #[error("text children are not supported, got {0:?}")]
    TextNotSupported(String),
    #[error("`{key}` changed but {reason}")]
    MissingBaseline { key: String, reason: &'static str },
    #[error("invalid `{key}`: {reason}")]
    InvalidProp { key: String, reason: String },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

impl RendererError {
    pub(crate) fn invalid(key: &str, reason: impl Into<String>) -> Self {
        RendererError::InvalidProp {
            key: key.to_owned(),
            reason: reason.into(),
        }
    }
}
