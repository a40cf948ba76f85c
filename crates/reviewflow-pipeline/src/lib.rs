//! Review ingestion pipeline: validate, classify, then persist.
//!
//! [`ReviewPipeline`] owns no mutable state of its own. The validator is a
//! plain value and the classifier and store are shared handles, so one
//! pipeline can serve any number of concurrent callers.

pub mod error;
pub mod pipeline;

pub use error::PipelineError;
pub use pipeline::{ReviewPipeline, SubmissionState};
