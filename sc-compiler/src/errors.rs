use sc_core::StoreError;
use thiserror::Error;

/// Failures that abort a whole compilation pass. Nothing is persisted when one occurs.
#[derive(Debug, Error)]
pub enum CompileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("could not serialize scrape configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),
}
