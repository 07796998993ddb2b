//! Shared geometry, element, and document-tree types for the spatial
//! layout analyzer.
//!
//! This crate defines the data model passed between the pipeline stages
//! implemented in `spatial-engine`. Centralizing these types here keeps
//! the stage crate free of anything but pipeline logic.
//!
//! # Dimensional Units
//!
//! Bbox coordinates are `i32` pixel values in a top-left-origin coordinate
//! system local to each page. The wire format's `0..999` normalised grid
//! is converted to and from pixel space via [`normalise`] and
//! [`denormalise`].
//!
//! # Module Organization
//! - `error` - validation errors raised at construction boundaries
//! - `bbox` - `Bbox` geometry primitives and grid normalisation
//! - `element` - `LayoutElement`, `Zone`, `LevelSource`
//! - `tree` - `DocumentTree`, `DocumentNode`, `PipelineInfo`, `FilterCounts`

mod bbox;
mod element;
mod error;
mod tree;

pub use bbox::{denormalise, normalise, Bbox};
pub use element::{LayoutElement, LevelSource, Zone};
pub use error::ValidationError;
pub use tree::{DocumentNode, DocumentTree, FilterCounts, PipelineInfo};
