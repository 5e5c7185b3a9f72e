use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReconcileError<E: std::error::Error + 'static> {
    #[error(transparent)]
    Host(#[from] E),
    #[error("two siblings share the key `{0}`")]
    DuplicateKey(String),
}

impl<E: std::error::Error + 'static> ReconcileError<E> {
    pub fn host_error(&self) -> Option<&E> {
        match self {
            ReconcileError::Host(err) => Some(err),
            ReconcileError::DuplicateKey(_) => None,
        }
    }

    pub fn into_host_error(self) -> Option<E> {
        match self {
            ReconcileError::Host(err) => Some(err),
            ReconcileError::DuplicateKey(_) => None,
        }
    }
}
