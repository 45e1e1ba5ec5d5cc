use thiserror::Error;

/// A failure of the infrastructure behind a collaborator.
///
/// "Object or key does not exist" is never a `StoreError`; stores report it as `Ok(None)`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("kubernetes api error: {0}")]
    Kube(#[from] kube::Error),

    #[error("backing store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }
}
