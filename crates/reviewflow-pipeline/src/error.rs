use reviewflow_core::ValidationError;
use reviewflow_db::DbError;
use reviewflow_sentiment::ClassificationError;
use thiserror::Error;

/// Failure of a single pipeline call. Nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("storage failure: {0}")]
    Storage(#[source] DbError),

    #[error("review {id} not found")]
    NotFound { id: i64 },
}

impl PipelineError {
    /// Which step of the pipeline produced this error.
    #[must_use]
    pub fn step(&self) -> &'static str {
        match self {
            PipelineError::Validation(_) => "validate",
            PipelineError::Classification(_) => "classify",
            PipelineError::Storage(_) => "persist",
            PipelineError::NotFound { .. } => "lookup",
        }
    }

    /// Map a store error for an operation on review `id`.
    pub(crate) fn from_store(err: DbError, id: i64) -> Self {
        match err {
            DbError::NotFound => PipelineError::NotFound { id },
            other => PipelineError::Storage(other),
        }
    }
}
