use paper_reconciler::ReconcileError;
use paper_renderer::RendererError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("canvas is already mounted")]
    AlreadyMounted,
    #[error("canvas was never mounted")]
    NotMounted,
    #[error("canvas has been torn down; mount a new one instead")]
    TornDown,
    #[error("render failed: {0}")]
    Render(#[from] ReconcileError<RendererError>),
}

impl CanvasError {
    /// Renderer error behind a failed render, if that is what this is.
    pub fn renderer_error(&self) -> Option<&RendererError> {
        match self {
            CanvasError::Render(err) => err.host_error(),
            _ => None,
        }
    }
}
