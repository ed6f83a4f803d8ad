use thiserror::Error;

/// Per-item failure during a batch run. Never propagates out of the batch;
/// each item is counted and the run continues.
#[derive(Debug, Clone, Error)]
pub enum ItemError {
    #[error("Retrieval failed: {0}")]
    Retrieval(String),

    #[error("Save failed: {0}")]
    Save(String),
}
