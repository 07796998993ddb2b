//! Error types for the spatial layout analysis pipeline.

use spatial_types::ValidationError;
use thiserror::Error;

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// A boundary invariant was violated by the caller's input: bbox with
    /// non-positive area, `page_number < 1`, or a zero page dimension.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] ValidationError),

    /// Internal-assertion-violation: a stage's own invariant failed to
    /// hold, e.g. cycle-breaking made no progress. Not expected in
    /// production; indicates a programmer error in the pipeline itself.
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
}
