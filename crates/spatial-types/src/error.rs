//! Error types for spatial layout validation

use thiserror::Error;

/// Validation errors raised when constructing geometry or document elements.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("bbox has non-positive area: ({x1}, {y1})-({x2}, {y2})")]
    DegenerateBbox { x1: i32, y1: i32, x2: i32, y2: i32 },
    #[error("page dimensions must be positive, got {width}x{height}")]
    InvalidPageDimensions { width: i32, height: i32 },
    #[error("page_number must be >= 1, got {0}")]
    InvalidPageNumber(i32),
    #[error("label must not be empty")]
    EmptyLabel,
}
