//! Spatial layout analysis engine
//!
//! Transforms a flat stream of OCR-produced layout elements into a
//! hierarchical [`DocumentTree`](spatial_types::DocumentTree): filtering
//! repeated/noise elements, classifying functional zones, computing
//! reading order, grouping into columns/lines/blocks, scoring hierarchy
//! depth, thinning consecutive text into paragraphs, and finally building
//! the nested tree.
//!
//! # Module Organization
//! - `error`: Pipeline error types
//! - `config`: Tunables ([`AnalyzerConfig`])
//! - `patterns`: Precompiled regexes shared by extraction and classification
//! - `extractor`: Grounded wire format parsing (C2)
//! - `filters`: Cross-page repetition, noise, and margin filtering (C3)
//! - `zone`: Functional zone classification (C4)
//! - `reading_order`: Pairwise ordering, cycle breaking, topological sort (C5)
//! - `grouping`: Column detection, line/block grouping, caption linking (C6)
//! - `hierarchy`: Weighted feature score and markdown cross-check (C7)
//! - `thinning`: Paragraph merge (C8)
//! - `tree_builder`: Stack-based nested tree construction (C9)
//! - `pipeline`: End-to-end orchestration

mod config;
mod error;
mod extractor;
mod filters;
mod grouping;
mod hierarchy;
mod patterns;
mod pipeline;
mod reading_order;
mod thinning;
mod tree_builder;
mod zone;

pub use config::{AnalyzerConfig, SpatialThresholds, SpatialWeights};
pub use error::AnalyzerError;
pub use extractor::extract_elements;
pub use pipeline::{analyze_grounded_text, analyze_layout};

// Re-export the shared data model so downstream crates need only depend
// on this one.
pub use spatial_types::{
    Bbox, DocumentNode, DocumentTree, FilterCounts, LayoutElement, LevelSource, PipelineInfo,
    Zone,
};
